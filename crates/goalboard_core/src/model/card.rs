//! Card domain model.
//!
//! # Responsibility
//! - Define the canonical card record stored in the board tree.
//! - Define the partial-edit shape accepted from the card edit boundary.
//!
//! # Invariants
//! - `CardId` is stable and never reused for another card.
//! - A card exclusively owns its `children`; no sharing, no cycles.
//! - `tags` order is display-only.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

static TAG_SEPARATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*,\s*").expect("valid tag separator regex"));

/// Stable identifier for one card, unique across the whole board tree.
///
/// Opaque string: generated ids are UUID v4 text, but callers may supply
/// any unique value (the sample card uses `"1"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(String);

impl CardId {
    /// Wraps a caller-provided id.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Generates a fresh random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CardId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CardId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// One goal card and its owned subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardNode {
    pub id: CardId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub assignee: Option<String>,
    /// Native child order; display order may be overridden per parent.
    #[serde(default)]
    pub children: Vec<CardNode>,
}

impl CardNode {
    /// Creates a leaf card with only a title set.
    pub fn new(id: CardId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: None,
            tags: Vec::new(),
            assignee: None,
            children: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    pub fn with_children(mut self, children: Vec<CardNode>) -> Self {
        self.children = children;
        self
    }

    /// Merges the set fields of `edit` into this card. Children are untouched.
    pub fn apply_edit(&mut self, edit: &CardEdit) {
        if let Some(title) = &edit.title {
            self.title.clone_from(title);
        }
        if let Some(description) = &edit.description {
            self.description = Some(description.clone());
        }
        if let Some(tags) = &edit.tags {
            self.tags.clone_from(tags);
        }
        if let Some(assignee) = &edit.assignee {
            self.assignee = Some(assignee.clone());
        }
    }

    /// Number of cards in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(CardNode::subtree_len)
            .sum::<usize>()
    }
}

/// Partial card update coming from the card edit boundary.
///
/// `None` fields are left unchanged on the target card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardEdit {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub assignee: Option<String>,
}

impl CardEdit {
    /// Edit that only replaces the title.
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Builds a full edit from raw editor form fields.
    ///
    /// `tags_input` is the comma-separated tag field; see [`parse_tag_input`].
    pub fn from_form(
        title: impl Into<String>,
        description: impl Into<String>,
        tags_input: &str,
        assignee: impl Into<String>,
    ) -> Self {
        Self {
            title: Some(title.into()),
            description: Some(description.into()),
            tags: Some(parse_tag_input(tags_input)),
            assignee: Some(assignee.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.tags.is_none()
            && self.assignee.is_none()
    }
}

/// Splits comma-separated tag input, trimming whitespace and dropping blanks.
///
/// Order and duplicates are preserved as typed.
pub fn parse_tag_input(raw: &str) -> Vec<String> {
    TAG_SEPARATOR_RE
        .split(raw.trim())
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{parse_tag_input, CardEdit, CardId, CardNode};

    #[test]
    fn parse_tag_input_trims_and_drops_blanks() {
        assert_eq!(
            parse_tag_input(" Personal , 2024,, ,work "),
            vec!["Personal", "2024", "work"]
        );
        assert!(parse_tag_input("   ").is_empty());
    }

    #[test]
    fn apply_edit_only_touches_set_fields() {
        let mut card = CardNode::new(CardId::new("1"), "Old")
            .with_description("keep me")
            .with_tags(["a"]);

        card.apply_edit(&CardEdit::title("New"));

        assert_eq!(card.title, "New");
        assert_eq!(card.description.as_deref(), Some("keep me"));
        assert_eq!(card.tags, vec!["a"]);
    }

    #[test]
    fn generated_ids_are_distinct() {
        assert_ne!(CardId::generate(), CardId::generate());
    }

    #[test]
    fn subtree_len_counts_all_descendants() {
        let card = CardNode::new(CardId::new("r"), "root").with_children(vec![
            CardNode::new(CardId::new("a"), "a")
                .with_children(vec![CardNode::new(CardId::new("b"), "b")]),
            CardNode::new(CardId::new("c"), "c"),
        ]);
        assert_eq!(card.subtree_len(), 4);
    }
}
