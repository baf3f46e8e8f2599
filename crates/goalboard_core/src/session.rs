//! Board session controller.
//!
//! # Responsibility
//! - Own every piece of mutable board state in one place.
//! - Expose the card edit, expansion, drag and measurement boundaries.
//! - Produce render-ready view models for the presentation layer.
//!
//! # Invariants
//! - Every state mutation marks the layout dirty.
//! - Unknown ids are no-ops at every entry point.
//! - At most one drag gesture is active.

use crate::config::BoardConfig;
use crate::drag::{DragOutcome, DragReconciler, DragSnapshot, DropTarget};
use crate::expansion::ExpansionSet;
use crate::geometry::{Connector, Measurements};
use crate::layout::{LayoutTicket, LayoutTracker};
use crate::model::card::{CardEdit, CardId, CardNode};
use crate::ordering::OrderingIndex;
use crate::projection::{build_columns, Projection};
use crate::tree::{CardTree, ParentRef};
use log::{debug, info};
use serde::Serialize;

const SAMPLE_CARD_ID: &str = "1";

/// Card as seen by the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardView {
    pub id: CardId,
    pub title: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub assignee: Option<String>,
    /// `None` for root cards.
    pub parent_id: Option<CardId>,
    pub child_count: usize,
    pub expanded: bool,
}

/// One rendered column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnView {
    pub index: usize,
    pub cards: Vec<CardView>,
}

/// Everything the rendering layer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardView {
    pub columns: Vec<ColumnView>,
    pub connectors: Vec<Connector>,
}

/// Single owner of board state.
#[derive(Debug, Clone)]
pub struct BoardSession {
    config: BoardConfig,
    tree: CardTree,
    expansion: ExpansionSet,
    ordering: OrderingIndex,
    layout: LayoutTracker,
    drag: DragReconciler,
}

impl BoardSession {
    /// Creates an empty board.
    pub fn new(config: BoardConfig) -> Self {
        Self::from_tree(config, CardTree::new())
    }

    /// Creates a board around an existing tree.
    pub fn from_tree(config: BoardConfig, tree: CardTree) -> Self {
        let mut session = Self {
            config,
            tree,
            expansion: ExpansionSet::new(),
            ordering: OrderingIndex::new(),
            layout: LayoutTracker::new(),
            drag: DragReconciler::new(),
        };
        session.layout.mark_dirty();
        session
    }

    /// Creates a board holding the single sample goal card `"1"`.
    pub fn with_sample_card(config: BoardConfig) -> Self {
        let sample = CardNode::new(CardId::new(SAMPLE_CARD_ID), "Sample Goal")
            .with_description("This is a sample goal card. You can expand to see more details.")
            .with_tags(["Personal", "2024"])
            .with_assignee("Jamie");
        Self::from_tree(config, CardTree::from_roots(vec![sample]))
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn tree(&self) -> &CardTree {
        &self.tree
    }

    pub fn expansion(&self) -> &ExpansionSet {
        &self.expansion
    }

    pub fn ordering(&self) -> &OrderingIndex {
        &self.ordering
    }

    /// Appends a new root card built from the configured template.
    pub fn add_card(&mut self) -> CardId {
        let card = self.template_card(false);
        let id = card.id.clone();
        self.tree.insert_root(card);
        info!("event=card_add module=session status=ok card={id} parent=root");
        self.layout.mark_dirty();
        id
    }

    /// Appends a sub-card under `parent_id` and expands the parent.
    ///
    /// Returns `None` when the parent does not exist.
    pub fn add_sub_card(&mut self, parent_id: &CardId) -> Option<CardId> {
        let card = self.template_card(true);
        let id = card.id.clone();
        if !self.tree.insert_child(parent_id, card) {
            debug!("event=card_add module=session status=noop parent={parent_id}");
            return None;
        }
        self.expansion.set_expanded(parent_id.clone(), true);
        info!("event=card_add module=session status=ok card={id} parent={parent_id}");
        self.layout.mark_dirty();
        Some(id)
    }

    /// Card edit boundary: merges `edit` into card `id`.
    pub fn edit_card(&mut self, id: &CardId, edit: &CardEdit) -> bool {
        if !self.tree.update(id, edit) {
            debug!("event=card_edit module=session status=noop card={id}");
            return false;
        }
        info!("event=card_edit module=session status=ok card={id}");
        self.layout.mark_dirty();
        true
    }

    /// Card edit boundary: deletes card `id` and its subtree.
    pub fn delete_card(&mut self, id: &CardId) -> bool {
        let parent = self.tree.find_parent(id);
        let Some(removed) = self.tree.remove(id) else {
            debug!("event=card_delete module=session status=noop card={id}");
            return false;
        };
        if let Some(ParentRef::Card(parent_id)) = parent {
            self.ordering.remove_from_order(&parent_id, id);
        }
        info!(
            "event=card_delete module=session status=ok card={id} subtree_len={}",
            removed.subtree_len()
        );
        self.layout.mark_dirty();
        true
    }

    /// Flips whether `id` shows its children. Returns the new state.
    pub fn toggle_expansion(&mut self, id: &CardId) -> bool {
        let expanded = self.expansion.toggle(id);
        debug!("event=expansion_toggle module=session status=ok card={id} expanded={expanded}");
        self.layout.mark_dirty();
        expanded
    }

    /// Current column projection.
    pub fn projection(&self) -> Projection<'_> {
        build_columns(&self.tree, &self.expansion, &self.ordering)
    }

    /// Render-ready columns.
    pub fn columns(&self) -> Vec<ColumnView> {
        self.projection()
            .columns()
            .iter()
            .enumerate()
            .map(|(index, slots)| ColumnView {
                index,
                cards: slots
                    .iter()
                    .map(|slot| CardView {
                        id: slot.card.id.clone(),
                        title: slot.card.title.clone(),
                        description: slot.card.description.clone(),
                        tags: slot.card.tags.clone(),
                        assignee: slot.card.assignee.clone(),
                        parent_id: slot.parent.card_id().cloned(),
                        child_count: slot.card.children.len(),
                        expanded: self.expansion.is_expanded(&slot.card.id),
                    })
                    .collect(),
            })
            .collect()
    }

    /// Drag framework boundary: gesture started at `(column, index)`.
    pub fn drag_start(&mut self, column: usize, index: usize) -> bool {
        let projection = build_columns(&self.tree, &self.expansion, &self.ordering);
        self.drag.start(&projection, column, index)
    }

    /// Drag framework boundary: gesture ended. `None` means cancelled.
    pub fn drag_end(&mut self, destination: Option<DropTarget>) -> DragOutcome {
        let outcome = self.drag.finish(
            &mut self.tree,
            &self.expansion,
            &mut self.ordering,
            destination,
        );
        if outcome.is_move() {
            self.layout.mark_dirty();
        }
        outcome
    }

    pub fn drag_in_progress(&self) -> Option<&DragSnapshot> {
        self.drag.active()
    }

    /// Marks measured positions stale and returns the remeasurement ticket.
    pub fn mark_dirty(&mut self) -> LayoutTicket {
        self.layout.mark_dirty()
    }

    /// Ticket of the remeasurement the host still owes, if any.
    pub fn pending_remeasure(&self) -> Option<LayoutTicket> {
        self.layout.pending()
    }

    /// Measurement boundary: applies fresh positions for `ticket`.
    ///
    /// Returns `false` when `ticket` was superseded by a later change.
    pub fn recompute_geometry(&mut self, ticket: LayoutTicket, measurements: &Measurements) -> bool {
        self.layout.recompute_geometry(
            ticket,
            &self.tree,
            measurements,
            self.config.anchor_inset,
        )
    }

    pub fn connectors(&self) -> &[Connector] {
        self.layout.connectors()
    }

    /// Rendering boundary: columns plus last computed connectors.
    pub fn render(&self) -> BoardView {
        BoardView {
            columns: self.columns(),
            connectors: self.connectors().to_vec(),
        }
    }

    fn template_card(&self, sub_card: bool) -> CardNode {
        let template = if sub_card {
            &self.config.new_sub_card
        } else {
            &self.config.new_card
        };
        let mut card = CardNode::new(CardId::generate(), template.title.clone())
            .with_description(template.description.clone());
        card.assignee = Some(String::new());
        card
    }
}

impl Default for BoardSession {
    fn default() -> Self {
        Self::new(BoardConfig::default())
    }
}
