//! Per-parent display order overrides.
//!
//! # Responsibility
//! - Remember user-imposed child order per parent card.
//! - Project native children into display order.
//!
//! # Invariants
//! - The index is advisory: tree membership is the source of truth.
//! - `project` is total and always returns a permutation of its input.
//! - Root order is not stored here; it lives in the tree's root sequence.

use crate::model::card::{CardId, CardNode};
use std::collections::{HashMap, HashSet};

/// Stored child sequences keyed by parent card id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderingIndex {
    orders: HashMap<CardId, Vec<CardId>>,
}

impl OrderingIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reorders `native_children` by the stored sequence for `parent_id`.
    ///
    /// Stored ids that are not native children are dropped. Native children
    /// missing from the stored sequence follow in native order.
    pub fn project<'a>(
        &self,
        parent_id: &CardId,
        native_children: &'a [CardNode],
    ) -> Vec<&'a CardNode> {
        let Some(order) = self.orders.get(parent_id) else {
            return native_children.iter().collect();
        };

        let mut placed: HashSet<&CardId> = HashSet::with_capacity(native_children.len());
        let mut projected = Vec::with_capacity(native_children.len());
        for id in order {
            if placed.contains(id) {
                continue;
            }
            if let Some(child) = native_children.iter().find(|child| &child.id == id) {
                placed.insert(&child.id);
                projected.push(child);
            }
        }
        projected.extend(
            native_children
                .iter()
                .filter(|child| !placed.contains(&child.id)),
        );
        projected
    }

    /// Replaces the stored sequence for `parent_id` wholesale.
    pub fn record_order(&mut self, parent_id: CardId, ordered_ids: Vec<CardId>) {
        self.orders.insert(parent_id, ordered_ids);
    }

    /// Drops `child_id` from the stored sequence of `parent_id`, if present.
    pub fn remove_from_order(&mut self, parent_id: &CardId, child_id: &CardId) {
        if let Some(order) = self.orders.get_mut(parent_id) {
            order.retain(|id| id != child_id);
        }
    }

    /// Places `child_id` at `index` in the sequence of `parent_id`.
    ///
    /// Any earlier occurrence is removed first; `index` is clamped to the
    /// sequence length. Creates the entry when missing.
    pub fn insert_into_order(&mut self, parent_id: &CardId, child_id: CardId, index: usize) {
        let order = self.orders.entry(parent_id.clone()).or_default();
        order.retain(|id| id != &child_id);
        let index = index.min(order.len());
        order.insert(index, child_id);
    }

    /// Stored sequence for `parent_id`, if any.
    pub fn order_of(&self, parent_id: &CardId) -> Option<&[CardId]> {
        self.orders.get(parent_id).map(Vec::as_slice)
    }

    /// Drops the stored sequence for `parent_id`.
    pub fn forget(&mut self, parent_id: &CardId) {
        self.orders.remove(parent_id);
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}
