//! Board domain model.
//!
//! # Responsibility
//! - Define canonical card structures used by the board engine.
//! - Keep the edit payload shape shared by every caller of the edit boundary.
//!
//! # Invariants
//! - Every card is identified by a stable `CardId`, unique in the tree.
//! - Deletion removes a card and its whole subtree; there are no tombstones.

pub mod card;
