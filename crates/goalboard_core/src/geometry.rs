//! Connector geometry between parent and child cards.
//!
//! # Responsibility
//! - Convert measured card rectangles into board-relative anchor points.
//! - Emit one cubic-Bezier SVG path per measurable parent -> child edge.
//!
//! # Invariants
//! - Edges come from tree structure, not from the current projection.
//! - An edge whose cards are unmeasured or zero-sized is skipped.
//! - Computation is stateless; every call starts from its inputs.

use crate::model::card::CardId;
use crate::tree::CardTree;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Measured rectangle in the host's coordinate space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A rect is degenerate until the card is mounted and measured.
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Card rectangles plus the board container rectangle, measured together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Measurements {
    pub board: Rect,
    #[serde(default)]
    pub cards: HashMap<CardId, Rect>,
}

impl Measurements {
    pub fn new(board: Rect) -> Self {
        Self {
            board,
            cards: HashMap::new(),
        }
    }

    pub fn with_card(mut self, id: CardId, rect: Rect) -> Self {
        self.cards.insert(id, rect);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorRole {
    /// Outgoing end, on the parent card.
    Source,
    /// Incoming end, on the child card.
    Target,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub card_id: CardId,
    pub role: AnchorRole,
    pub point: Point,
}

/// Drawable edge between a parent and one of its children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connector {
    pub id: String,
    pub source: Anchor,
    pub target: Anchor,
    /// SVG path data.
    pub path: String,
}

/// Anchor of `card_id` for `role`, or `None` when the card is not measured.
///
/// `inset` is applied horizontally only: the source sits `inset` inside the
/// right edge, the target `inset` inside the left edge. Both roles use the
/// card's vertical center, so the target carries no vertical offset.
pub fn anchor(
    measurements: &Measurements,
    card_id: &CardId,
    role: AnchorRole,
    inset: f64,
) -> Option<Anchor> {
    let rect = measurements.cards.get(card_id)?;
    if rect.is_degenerate() {
        return None;
    }
    let left = rect.x - measurements.board.x;
    let top = rect.y - measurements.board.y;
    let x = match role {
        AnchorRole::Source => left + rect.width - inset,
        AnchorRole::Target => left + inset,
    };
    Some(Anchor {
        card_id: card_id.clone(),
        role,
        point: Point {
            x,
            y: top + rect.height / 2.0,
        },
    })
}

/// Horizontal S-curve from `source` to `target`.
pub fn bezier_path(source: Point, target: Point) -> String {
    let half = (target.x - source.x) / 2.0;
    format!(
        "M {} {} C {} {}, {} {}, {} {}",
        source.x,
        source.y,
        source.x + half,
        source.y,
        target.x - half,
        target.y,
        target.x,
        target.y
    )
}

/// Connectors for every measurable parent -> child edge of `tree`.
pub fn compute_connectors(
    tree: &CardTree,
    measurements: &Measurements,
    inset: f64,
) -> Vec<Connector> {
    tree.edges()
        .into_iter()
        .filter_map(|edge| {
            let source = anchor(measurements, edge.parent, AnchorRole::Source, inset)?;
            let target = anchor(measurements, edge.child, AnchorRole::Target, inset)?;
            Some(Connector {
                id: format!("{}-{}", edge.parent, edge.child),
                path: bezier_path(source.point, target.point),
                source,
                target,
            })
        })
        .collect()
}
