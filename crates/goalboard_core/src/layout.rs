//! Deferred remeasurement protocol.
//!
//! # Responsibility
//! - Track whether measured card positions are stale.
//! - Accept measurements only for the latest scheduled remeasurement.
//!
//! # Invariants
//! - Every `mark_dirty` supersedes all previously issued tickets.
//! - Stale results are discarded, never merged with newer ones.

use crate::geometry::{compute_connectors, Connector, Measurements};
use crate::tree::CardTree;
use log::debug;

/// Handle for one scheduled remeasurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayoutTicket(u64);

impl LayoutTicket {
    pub fn generation(self) -> u64 {
        self.0
    }
}

/// Latest connectors plus the dirty/generation bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct LayoutTracker {
    generation: u64,
    dirty: bool,
    connectors: Vec<Connector>,
}

impl LayoutTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks measurements stale and issues the ticket the host must hand
    /// back once rendering has settled.
    pub fn mark_dirty(&mut self) -> LayoutTicket {
        self.generation += 1;
        self.dirty = true;
        LayoutTicket(self.generation)
    }

    /// Ticket for the pending remeasurement, if any.
    pub fn pending(&self) -> Option<LayoutTicket> {
        self.dirty.then_some(LayoutTicket(self.generation))
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Recomputes connectors from fresh measurements.
    ///
    /// Returns `false` without touching state when `ticket` was superseded
    /// or nothing is pending.
    pub fn recompute_geometry(
        &mut self,
        ticket: LayoutTicket,
        tree: &CardTree,
        measurements: &Measurements,
        anchor_inset: f64,
    ) -> bool {
        if !self.dirty || ticket.0 != self.generation {
            debug!(
                "event=remeasure module=layout status=stale ticket={} latest={}",
                ticket.0, self.generation
            );
            return false;
        }
        self.connectors = compute_connectors(tree, measurements, anchor_inset);
        self.dirty = false;
        debug!(
            "event=remeasure module=layout status=ok ticket={} connectors={}",
            ticket.0,
            self.connectors.len()
        );
        true
    }

    /// Connectors from the last applied remeasurement.
    pub fn connectors(&self) -> &[Connector] {
        &self.connectors
    }
}
