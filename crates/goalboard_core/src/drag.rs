//! Drag-and-drop reconciliation.
//!
//! # Responsibility
//! - Snapshot the dragged card when a gesture starts.
//! - Turn the drop coordinates into one `DragOutcome`, then apply it to the
//!   tree and the ordering index.
//!
//! # Invariants
//! - The source card and its parent are captured at drag start, never
//!   recomputed at drop time.
//! - A rejected or cancelled drop leaves tree and index unchanged.
//! - Moves never place a card under itself or one of its descendants.
//! - Cards cannot be promoted to roots by dragging into column 0.
//!
//! # Destination mapping
//! The destination column is read from a fresh projection with the dragged
//! card left out. A drop right after a slot of the source parent's group
//! stays in that group, so a card can always reach the end of its own
//! siblings. Otherwise an index that points at a slot drops the card just
//! before that slot, inside the slot's parent, and an index past the end
//! appends to the parent of the last slot. A column that only held the
//! dragged card keeps the card under its source parent.

use crate::expansion::ExpansionSet;
use crate::model::card::CardId;
use crate::ordering::OrderingIndex;
use crate::projection::{build_columns, Projection};
use crate::tree::{CardTree, ParentRef};
use log::{debug, error, info, warn};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Drop coordinates reported by the drag framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DropTarget {
    pub column: usize,
    pub index: usize,
}

impl DropTarget {
    pub fn new(column: usize, index: usize) -> Self {
        Self { column, index }
    }
}

/// State captured when a drag gesture starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DragSnapshot {
    pub card_id: CardId,
    pub source_column: usize,
    pub source_index: usize,
    pub source_parent: ParentRef,
}

/// Why a drop was refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DragRejection {
    /// The dragged card is no longer in the tree.
    CardNotFound { card: CardId },
    /// A nested card was dropped into the root column.
    RootPromotion { card: CardId },
    /// The target parent is the card itself or one of its descendants.
    CycleDetected { card: CardId, parent: CardId },
}

impl Display for DragRejection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CardNotFound { card } => write!(f, "dragged card not found: {card}"),
            Self::RootPromotion { card } => {
                write!(f, "card cannot be promoted to root by drag: {card}")
            }
            Self::CycleDetected { card, parent } => write!(
                f,
                "move would create cycle: card {card} under parent {parent}"
            ),
        }
    }
}

impl Error for DragRejection {}

/// Decision for one drop, taken before any mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DragOutcome {
    /// No destination, or a destination outside any column.
    Cancelled,
    /// Root moved within the root sequence.
    RootReorder { card: CardId, from: usize, to: usize },
    /// Card moved within its parent's display order.
    SiblingReorder {
        parent: CardId,
        card: CardId,
        to: usize,
    },
    /// Card moved under another parent.
    CrossParentMove {
        card: CardId,
        old_parent: ParentRef,
        new_parent: CardId,
        index: usize,
    },
    Rejected(DragRejection),
}

impl DragOutcome {
    fn label(&self) -> &'static str {
        match self {
            Self::Cancelled => "cancelled",
            Self::RootReorder { .. } => "root_reorder",
            Self::SiblingReorder { .. } => "sibling_reorder",
            Self::CrossParentMove { .. } => "cross_parent_move",
            Self::Rejected(_) => "rejected",
        }
    }

    /// Whether applying this outcome mutates board state.
    pub fn is_move(&self) -> bool {
        matches!(
            self,
            Self::RootReorder { .. } | Self::SiblingReorder { .. } | Self::CrossParentMove { .. }
        )
    }
}

/// Single-gesture drag state machine.
#[derive(Debug, Clone, Default)]
pub struct DragReconciler {
    active: Option<DragSnapshot>,
}

impl DragReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<&DragSnapshot> {
        self.active.as_ref()
    }

    /// Captures the card at `(column, index)` of `projection`.
    ///
    /// Returns `false` and clears any snapshot when the slot is empty.
    pub fn start(&mut self, projection: &Projection<'_>, column: usize, index: usize) -> bool {
        self.active = projection.slot_at(column, index).map(|slot| DragSnapshot {
            card_id: slot.card.id.clone(),
            source_column: column,
            source_index: index,
            source_parent: slot.parent.clone(),
        });
        match &self.active {
            Some(snapshot) => {
                debug!(
                    "event=drag_start module=drag status=ok card={} column={} index={}",
                    snapshot.card_id, column, index
                );
                true
            }
            None => {
                debug!(
                    "event=drag_start module=drag status=noop column={} index={}",
                    column, index
                );
                false
            }
        }
    }

    /// Ends the active gesture: decides the outcome and applies it.
    ///
    /// Without an active gesture the drop is `Cancelled`.
    pub fn finish(
        &mut self,
        tree: &mut CardTree,
        expansion: &ExpansionSet,
        ordering: &mut OrderingIndex,
        target: Option<DropTarget>,
    ) -> DragOutcome {
        let Some(snapshot) = self.active.take() else {
            return DragOutcome::Cancelled;
        };
        let outcome = plan_drop(tree, expansion, ordering, &snapshot, target);
        apply_outcome(tree, ordering, &outcome);
        outcome
    }
}

/// Decides what a drop means without mutating anything.
pub fn plan_drop(
    tree: &CardTree,
    expansion: &ExpansionSet,
    ordering: &OrderingIndex,
    snapshot: &DragSnapshot,
    target: Option<DropTarget>,
) -> DragOutcome {
    let Some(target) = target else {
        return DragOutcome::Cancelled;
    };
    let card = &snapshot.card_id;
    if !tree.contains(card) {
        warn!(
            "event=drag_end module=drag status=desync card={} source_column={} source_index={}",
            card, snapshot.source_column, snapshot.source_index
        );
        return DragOutcome::Rejected(DragRejection::CardNotFound { card: card.clone() });
    }

    let projection = build_columns(tree, expansion, ordering);
    if target.column >= projection.column_count() {
        debug!(
            "event=drag_end module=drag status=noop reason=column_out_of_range column={}",
            target.column
        );
        return DragOutcome::Cancelled;
    }

    if target.column == 0 {
        if snapshot.source_column != 0 {
            return DragOutcome::Rejected(DragRejection::RootPromotion { card: card.clone() });
        }
        let Some(from) = tree.root_index(card) else {
            warn!(
                "event=drag_end module=drag status=desync card={} reason=not_a_root",
                card
            );
            return DragOutcome::Rejected(DragRejection::CardNotFound { card: card.clone() });
        };
        let last = tree.roots().len().saturating_sub(1);
        return DragOutcome::RootReorder {
            card: card.clone(),
            from,
            to: target.index.min(last),
        };
    }

    let Some((owner, index)) = resolve_destination(&projection, snapshot, target) else {
        return DragOutcome::Cancelled;
    };
    if tree.is_in_subtree(card, &owner) {
        return DragOutcome::Rejected(DragRejection::CycleDetected {
            card: card.clone(),
            parent: owner,
        });
    }

    match &snapshot.source_parent {
        ParentRef::Card(parent) if *parent == owner => DragOutcome::SiblingReorder {
            parent: owner,
            card: card.clone(),
            to: index,
        },
        old_parent => DragOutcome::CrossParentMove {
            card: card.clone(),
            old_parent: old_parent.clone(),
            new_parent: owner,
            index,
        },
    }
}

/// Maps a drop in a non-root column to `(owning parent, index in its group)`.
fn resolve_destination(
    projection: &Projection<'_>,
    snapshot: &DragSnapshot,
    target: DropTarget,
) -> Option<(CardId, usize)> {
    let remaining: Vec<&ParentRef> = projection
        .column(target.column)?
        .iter()
        .filter(|slot| slot.card.id != snapshot.card_id)
        .map(|slot| &slot.parent)
        .collect();
    let position = target.index.min(remaining.len());

    let follows_source_group = position
        .checked_sub(1)
        .map(|previous| *remaining[previous] == snapshot.source_parent)
        .unwrap_or(false);
    let owner = if follows_source_group {
        snapshot.source_parent.clone()
    } else {
        match remaining.get(position).or_else(|| remaining.last()) {
            Some(parent) => (*parent).clone(),
            None => snapshot.source_parent.clone(),
        }
    };
    let ParentRef::Card(owner) = owner else {
        return None;
    };

    let index = remaining[..position]
        .iter()
        .filter(|parent| parent.card_id() == Some(&owner))
        .count();
    Some((owner, index))
}

/// Applies a planned outcome. Returns whether board state changed.
pub fn apply_outcome(
    tree: &mut CardTree,
    ordering: &mut OrderingIndex,
    outcome: &DragOutcome,
) -> bool {
    let applied = match outcome {
        DragOutcome::Cancelled | DragOutcome::Rejected(_) => false,
        DragOutcome::RootReorder { from, to, .. } => tree.move_root(*from, *to),
        DragOutcome::SiblingReorder { parent, card, to } => {
            place_in_order(tree, ordering, parent, card, *to);
            true
        }
        DragOutcome::CrossParentMove {
            card,
            old_parent,
            new_parent,
            index,
        } => move_across_parents(tree, ordering, card, old_parent, new_parent, *index),
    };

    match outcome {
        DragOutcome::Rejected(reason) => info!(
            "event=drag_end module=drag status=rejected outcome={} detail=\"{}\"",
            outcome.label(),
            reason
        ),
        _ => info!(
            "event=drag_end module=drag status={} outcome={}",
            if applied { "ok" } else { "noop" },
            outcome.label()
        ),
    }
    applied
}

fn move_across_parents(
    tree: &mut CardTree,
    ordering: &mut OrderingIndex,
    card: &CardId,
    old_parent: &ParentRef,
    new_parent: &CardId,
    index: usize,
) -> bool {
    if !tree.contains(new_parent) {
        return false;
    }
    let Some(node) = tree.remove(card) else {
        warn!(
            "event=drag_end module=drag status=desync card={} reason=remove_failed",
            card
        );
        return false;
    };
    if let Err(node) = tree.insert_at(node, &ParentRef::Card(new_parent.clone()), index) {
        error!(
            "event=drag_end module=drag status=error card={} reason=insert_failed",
            card
        );
        let restored = tree.insert_at(node, old_parent, usize::MAX);
        if restored.is_err() {
            error!(
                "event=drag_end module=drag status=error card={} reason=restore_failed",
                card
            );
        }
        return false;
    }

    if let ParentRef::Card(old_parent) = old_parent {
        ordering.remove_from_order(old_parent, card);
    }
    place_in_order(tree, ordering, new_parent, card, index);
    true
}

/// Records the displayed order of `parent` with `card` placed at `index`.
fn place_in_order(
    tree: &CardTree,
    ordering: &mut OrderingIndex,
    parent: &CardId,
    card: &CardId,
    index: usize,
) {
    let mut ids: Vec<CardId> = ordering
        .project(parent, tree.children_of(&ParentRef::Card(parent.clone())))
        .into_iter()
        .filter(|child| &child.id != card)
        .map(|child| child.id.clone())
        .collect();
    let index = index.min(ids.len());
    ids.insert(index, card.clone());
    ordering.record_order(parent.clone(), ids);
}

#[cfg(test)]
mod tests {
    use super::{plan_drop, DragOutcome, DragRejection, DragSnapshot, DropTarget};
    use crate::expansion::ExpansionSet;
    use crate::model::card::{CardId, CardNode};
    use crate::ordering::OrderingIndex;
    use crate::tree::{CardTree, ParentRef};

    fn id(value: &str) -> CardId {
        CardId::new(value)
    }

    fn fixture() -> (CardTree, ExpansionSet) {
        let tree = CardTree::from_roots(vec![
            CardNode::new(id("a"), "A").with_children(vec![
                CardNode::new(id("a1"), "A1")
                    .with_children(vec![CardNode::new(id("a1x"), "A1x")]),
                CardNode::new(id("a2"), "A2"),
            ]),
            CardNode::new(id("b"), "B").with_children(vec![CardNode::new(id("b1"), "B1")]),
        ]);
        let mut expansion = ExpansionSet::new();
        expansion.set_expanded(id("a"), true);
        expansion.set_expanded(id("b"), true);
        expansion.set_expanded(id("a1"), true);
        (tree, expansion)
    }

    fn snapshot(card: &str, column: usize, index: usize, parent: ParentRef) -> DragSnapshot {
        DragSnapshot {
            card_id: id(card),
            source_column: column,
            source_index: index,
            source_parent: parent,
        }
    }

    #[test]
    fn index_before_a_slot_selects_that_slots_parent() {
        let (tree, expansion) = fixture();
        // column 1 without b1 = [a1, a2]; index 1 lands between them.
        let drag = snapshot("b1", 1, 2, ParentRef::Card(id("b")));

        let outcome = plan_drop(
            &tree,
            &expansion,
            &OrderingIndex::new(),
            &drag,
            Some(DropTarget::new(1, 1)),
        );

        assert_eq!(
            outcome,
            DragOutcome::CrossParentMove {
                card: id("b1"),
                old_parent: ParentRef::Card(id("b")),
                new_parent: id("a"),
                index: 1,
            }
        );
    }

    #[test]
    fn drop_after_last_own_sibling_stays_in_source_group() {
        let (tree, expansion) = fixture();
        // column 1 without a1 = [a2, b1]; index 1 sits on the a/b boundary.
        let drag = snapshot("a1", 1, 0, ParentRef::Card(id("a")));

        let outcome = plan_drop(
            &tree,
            &expansion,
            &OrderingIndex::new(),
            &drag,
            Some(DropTarget::new(1, 1)),
        );

        assert_eq!(
            outcome,
            DragOutcome::SiblingReorder {
                parent: id("a"),
                card: id("a1"),
                to: 1,
            }
        );
    }

    #[test]
    fn index_past_end_appends_to_last_parent_group() {
        let (tree, expansion) = fixture();
        let drag = snapshot("a2", 1, 1, ParentRef::Card(id("a")));

        let outcome = plan_drop(
            &tree,
            &expansion,
            &OrderingIndex::new(),
            &drag,
            Some(DropTarget::new(1, 42)),
        );

        assert_eq!(
            outcome,
            DragOutcome::CrossParentMove {
                card: id("a2"),
                old_parent: ParentRef::Card(id("a")),
                new_parent: id("b"),
                index: 1,
            }
        );
    }

    #[test]
    fn drop_inside_own_group_is_sibling_reorder() {
        let (tree, expansion) = fixture();
        let drag = snapshot("a2", 1, 1, ParentRef::Card(id("a")));

        let outcome = plan_drop(
            &tree,
            &expansion,
            &OrderingIndex::new(),
            &drag,
            Some(DropTarget::new(1, 0)),
        );

        assert_eq!(
            outcome,
            DragOutcome::SiblingReorder {
                parent: id("a"),
                card: id("a2"),
                to: 0,
            }
        );
    }

    #[test]
    fn dropping_under_own_descendant_is_rejected() {
        let (tree, expansion) = fixture();
        // column 2 = [a1x], owned by a1.
        let drag = snapshot("a1", 1, 0, ParentRef::Card(id("a")));

        let outcome = plan_drop(
            &tree,
            &expansion,
            &OrderingIndex::new(),
            &drag,
            Some(DropTarget::new(2, 0)),
        );

        assert_eq!(
            outcome,
            DragOutcome::Rejected(DragRejection::CycleDetected {
                card: id("a1"),
                parent: id("a1"),
            })
        );
    }

    #[test]
    fn root_dropped_into_deeper_column_becomes_child() {
        let (tree, expansion) = fixture();
        let drag = snapshot("b", 0, 1, ParentRef::Root);

        let outcome = plan_drop(
            &tree,
            &expansion,
            &OrderingIndex::new(),
            &drag,
            Some(DropTarget::new(2, 1)),
        );

        assert_eq!(
            outcome,
            DragOutcome::CrossParentMove {
                card: id("b"),
                old_parent: ParentRef::Root,
                new_parent: id("a1"),
                index: 1,
            }
        );
    }

    #[test]
    fn out_of_range_column_cancels() {
        let (tree, expansion) = fixture();
        let drag = snapshot("a2", 1, 1, ParentRef::Card(id("a")));

        let outcome = plan_drop(
            &tree,
            &expansion,
            &OrderingIndex::new(),
            &drag,
            Some(DropTarget::new(7, 0)),
        );
        assert_eq!(outcome, DragOutcome::Cancelled);
    }
}
