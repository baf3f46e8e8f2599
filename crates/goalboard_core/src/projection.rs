//! Column projection of the card tree.
//!
//! # Responsibility
//! - Derive the ordered column layout from tree + expansion + ordering.
//! - Record which parent contributed every slot, for drag reconciliation.
//!
//! # Invariants
//! - Column 0 is always present and lists the roots in tree order.
//! - Children of earlier parents precede children of later parents.
//! - No empty trailing columns; projection holds no state of its own.

use crate::expansion::ExpansionSet;
use crate::model::card::{CardId, CardNode};
use crate::ordering::OrderingIndex;
use crate::tree::{CardTree, ParentRef};

/// One rendered position in a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSlot<'a> {
    pub card: &'a CardNode,
    /// Parent that contributed this slot.
    pub parent: ParentRef,
}

/// Columns derived for one render cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection<'a> {
    columns: Vec<Vec<ColumnSlot<'a>>>,
}

impl<'a> Projection<'a> {
    pub fn columns(&self) -> &[Vec<ColumnSlot<'a>>] {
        &self.columns
    }

    pub fn column(&self, column: usize) -> Option<&[ColumnSlot<'a>]> {
        self.columns.get(column).map(Vec::as_slice)
    }

    /// Number of columns, including column 0. Never zero.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Whether no column holds a card. Column 0 exists even then.
    pub fn has_no_cards(&self) -> bool {
        self.columns.iter().all(Vec::is_empty)
    }

    pub fn column_len(&self, column: usize) -> usize {
        self.columns.get(column).map_or(0, Vec::len)
    }

    pub fn slot_at(&self, column: usize, index: usize) -> Option<&ColumnSlot<'a>> {
        self.columns.get(column)?.get(index)
    }

    pub fn card_at(&self, column: usize, index: usize) -> Option<&'a CardNode> {
        self.slot_at(column, index).map(|slot| slot.card)
    }

    /// Ids of one column in display order; empty for a missing column.
    pub fn column_ids(&self, column: usize) -> Vec<&'a CardId> {
        self.columns
            .get(column)
            .map(|slots| slots.iter().map(|slot| &slot.card.id).collect())
            .unwrap_or_default()
    }
}

/// Projects the tree into columns.
pub fn build_columns<'a>(
    tree: &'a CardTree,
    expansion: &ExpansionSet,
    ordering: &OrderingIndex,
) -> Projection<'a> {
    let roots: Vec<ColumnSlot<'a>> = tree
        .roots()
        .iter()
        .map(|card| ColumnSlot {
            card,
            parent: ParentRef::Root,
        })
        .collect();
    let mut columns = vec![roots];

    loop {
        let next: Vec<ColumnSlot<'a>> = columns[columns.len() - 1]
            .iter()
            .filter(|slot| expansion.is_expanded(&slot.card.id))
            .flat_map(|slot| {
                let parent = slot.card;
                ordering
                    .project(&parent.id, &parent.children)
                    .into_iter()
                    .map(move |card| ColumnSlot {
                        card,
                        parent: ParentRef::Card(parent.id.clone()),
                    })
            })
            .collect();
        if next.is_empty() {
            break;
        }
        columns.push(next);
    }

    Projection { columns }
}
