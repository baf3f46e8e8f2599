//! Core engine for the goal board.
//! This crate is the single source of truth for card tree, column layout,
//! drag reconciliation and connector geometry.

pub mod config;
pub mod drag;
pub mod expansion;
pub mod geometry;
pub mod layout;
pub mod logging;
pub mod model;
pub mod ordering;
pub mod projection;
pub mod session;
pub mod tree;

pub use config::{BoardConfig, CardTemplate, ConfigError};
pub use drag::{DragOutcome, DragRejection, DragSnapshot, DropTarget};
pub use expansion::ExpansionSet;
pub use geometry::{Anchor, AnchorRole, Connector, Measurements, Point, Rect};
pub use layout::LayoutTicket;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::card::{parse_tag_input, CardEdit, CardId, CardNode};
pub use ordering::OrderingIndex;
pub use projection::{build_columns, ColumnSlot, Projection};
pub use session::{BoardSession, BoardView, CardView, ColumnView};
pub use tree::{CardTree, ParentRef};

/// Minimal health-check API for host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
