//! Card tree store.
//!
//! # Responsibility
//! - Own the canonical card hierarchy.
//! - Provide insert/remove/update/lookup primitives used by the session and
//!   the drag reconciler.
//!
//! # Invariants
//! - A card id appears at most once in the tree.
//! - Lookup misses are no-ops, never errors.
//! - `remove` hands back the detached subtree so a move can never lose cards.

use crate::model::card::{CardEdit, CardId, CardNode};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Parent slot of a card: the root sequence or another card.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ParentRef {
    Root,
    Card(CardId),
}

impl ParentRef {
    pub fn card_id(&self) -> Option<&CardId> {
        match self {
            Self::Root => None,
            Self::Card(id) => Some(id),
        }
    }
}

impl Display for ParentRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Root => write!(f, "root"),
            Self::Card(id) => write!(f, "{id}"),
        }
    }
}

/// One structural parent -> child edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardEdge<'a> {
    pub parent: &'a CardId,
    pub child: &'a CardId,
}

/// Owned card forest. Root order is the tree's own root sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardTree {
    roots: Vec<CardNode>,
}

impl CardTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_roots(roots: Vec<CardNode>) -> Self {
        Self { roots }
    }

    pub fn roots(&self) -> &[CardNode] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Total number of cards at all depths.
    pub fn len(&self) -> usize {
        self.roots.iter().map(CardNode::subtree_len).sum()
    }

    /// Appends a new root-level card.
    pub fn insert_root(&mut self, node: CardNode) {
        self.roots.push(node);
    }

    /// Appends `node` as last child of `parent_id`.
    ///
    /// Returns `false` and drops `node` when the parent does not exist.
    pub fn insert_child(&mut self, parent_id: &CardId, node: CardNode) -> bool {
        match self.find_mut(parent_id) {
            Some(parent) => {
                parent.children.push(node);
                true
            }
            None => false,
        }
    }

    /// Merges `edit` into the matching card at any depth.
    ///
    /// Returns `false` when no card matches.
    pub fn update(&mut self, id: &CardId, edit: &CardEdit) -> bool {
        match self.find_mut(id) {
            Some(card) => {
                card.apply_edit(edit);
                true
            }
            None => false,
        }
    }

    /// Detaches the card with `id` and its whole subtree.
    pub fn remove(&mut self, id: &CardId) -> Option<CardNode> {
        remove_from(&mut self.roots, id)
    }

    /// Inserts `node` under `parent` at `index`, clamped to the child count.
    ///
    /// # Errors
    /// Hands `node` back when a card parent does not exist, so callers can
    /// restore it instead of losing the subtree.
    pub fn insert_at(
        &mut self,
        node: CardNode,
        parent: &ParentRef,
        index: usize,
    ) -> Result<(), CardNode> {
        let siblings = match parent {
            ParentRef::Root => &mut self.roots,
            ParentRef::Card(parent_id) => match self.find_mut(parent_id) {
                Some(card) => &mut card.children,
                None => return Err(node),
            },
        };
        let index = index.min(siblings.len());
        siblings.insert(index, node);
        Ok(())
    }

    /// Returns the parent of `id`, or `None` when `id` is not in the tree.
    pub fn find_parent(&self, id: &CardId) -> Option<ParentRef> {
        if self.roots.iter().any(|root| &root.id == id) {
            return Some(ParentRef::Root);
        }
        find_parent_in(&self.roots, id).map(|parent| ParentRef::Card(parent.clone()))
    }

    pub fn find(&self, id: &CardId) -> Option<&CardNode> {
        find_in(&self.roots, id)
    }

    pub fn find_mut(&mut self, id: &CardId) -> Option<&mut CardNode> {
        find_in_mut(&mut self.roots, id)
    }

    pub fn contains(&self, id: &CardId) -> bool {
        self.find(id).is_some()
    }

    /// Native children of `parent`; empty when the parent is missing.
    pub fn children_of(&self, parent: &ParentRef) -> &[CardNode] {
        match parent {
            ParentRef::Root => self.roots.as_slice(),
            ParentRef::Card(id) => self
                .find(id)
                .map(|card| card.children.as_slice())
                .unwrap_or(&[]),
        }
    }

    /// Returns whether `id` sits anywhere inside the subtree rooted at
    /// `ancestor` (a card counts as inside its own subtree).
    pub fn is_in_subtree(&self, ancestor: &CardId, id: &CardId) -> bool {
        self.find(ancestor)
            .map(|card| find_in(std::slice::from_ref(card), id).is_some())
            .unwrap_or(false)
    }

    /// Moves the root at `from` to `to`; both are clamped to valid indexes.
    pub fn move_root(&mut self, from: usize, to: usize) -> bool {
        if from >= self.roots.len() {
            return false;
        }
        let card = self.roots.remove(from);
        let to = to.min(self.roots.len());
        self.roots.insert(to, card);
        true
    }

    /// Returns the root index of `id`, if it is a root.
    pub fn root_index(&self, id: &CardId) -> Option<usize> {
        self.roots.iter().position(|root| &root.id == id)
    }

    /// Every parent -> child edge, depth-first, regardless of expansion.
    pub fn edges(&self) -> Vec<CardEdge<'_>> {
        let mut edges = Vec::new();
        for root in &self.roots {
            collect_edges(root, &mut edges);
        }
        edges
    }
}

fn remove_from(nodes: &mut Vec<CardNode>, id: &CardId) -> Option<CardNode> {
    if let Some(index) = nodes.iter().position(|node| &node.id == id) {
        return Some(nodes.remove(index));
    }
    nodes
        .iter_mut()
        .find_map(|node| remove_from(&mut node.children, id))
}

fn find_in<'a>(nodes: &'a [CardNode], id: &CardId) -> Option<&'a CardNode> {
    for node in nodes {
        if &node.id == id {
            return Some(node);
        }
        if let Some(found) = find_in(&node.children, id) {
            return Some(found);
        }
    }
    None
}

fn find_in_mut<'a>(nodes: &'a mut [CardNode], id: &CardId) -> Option<&'a mut CardNode> {
    for node in nodes {
        if &node.id == id {
            return Some(node);
        }
        if let Some(found) = find_in_mut(&mut node.children, id) {
            return Some(found);
        }
    }
    None
}

fn find_parent_in<'a>(nodes: &'a [CardNode], id: &CardId) -> Option<&'a CardId> {
    for node in nodes {
        if node.children.iter().any(|child| &child.id == id) {
            return Some(&node.id);
        }
        if let Some(found) = find_parent_in(&node.children, id) {
            return Some(found);
        }
    }
    None
}

fn collect_edges<'a>(node: &'a CardNode, edges: &mut Vec<CardEdge<'a>>) {
    for child in &node.children {
        edges.push(CardEdge {
            parent: &node.id,
            child: &child.id,
        });
        collect_edges(child, edges);
    }
}

#[cfg(test)]
mod tests {
    use super::{CardTree, ParentRef};
    use crate::model::card::{CardEdit, CardId, CardNode};

    fn id(value: &str) -> CardId {
        CardId::new(value)
    }

    fn sample_tree() -> CardTree {
        CardTree::from_roots(vec![
            CardNode::new(id("a"), "A").with_children(vec![
                CardNode::new(id("a1"), "A1")
                    .with_children(vec![CardNode::new(id("a1x"), "A1x")]),
                CardNode::new(id("a2"), "A2"),
            ]),
            CardNode::new(id("b"), "B"),
        ])
    }

    #[test]
    fn insert_child_ignores_missing_parent() {
        let mut tree = sample_tree();
        let before = tree.clone();

        assert!(!tree.insert_child(&id("missing"), CardNode::new(id("n"), "N")));
        assert_eq!(tree, before);
    }

    #[test]
    fn update_changes_only_matched_node() {
        let mut tree = sample_tree();

        assert!(tree.update(&id("a1x"), &CardEdit::title("Deep")));

        assert_eq!(tree.find(&id("a1x")).unwrap().title, "Deep");
        assert_eq!(tree.find(&id("a1")).unwrap().title, "A1");
        assert_eq!(tree.find(&id("a")).unwrap().title, "A");
        assert!(!tree.update(&id("nope"), &CardEdit::title("X")));
    }

    #[test]
    fn remove_detaches_whole_subtree() {
        let mut tree = sample_tree();

        let removed = tree.remove(&id("a1")).expect("a1 should be removed");

        assert_eq!(removed.children.len(), 1);
        assert!(!tree.contains(&id("a1")));
        assert!(!tree.contains(&id("a1x")));
        assert_eq!(tree.len(), 3);
        assert!(tree.remove(&id("a1")).is_none());
    }

    #[test]
    fn insert_at_clamps_index_and_returns_node_for_missing_parent() {
        let mut tree = sample_tree();

        tree.insert_at(CardNode::new(id("n"), "N"), &ParentRef::Card(id("a")), 99)
            .unwrap();
        let children: Vec<_> = tree
            .children_of(&ParentRef::Card(id("a")))
            .iter()
            .map(|card| card.id.as_str())
            .collect();
        assert_eq!(children, vec!["a1", "a2", "n"]);

        let rejected = tree
            .insert_at(CardNode::new(id("m"), "M"), &ParentRef::Card(id("zz")), 0)
            .unwrap_err();
        assert_eq!(rejected.id, id("m"));
    }

    #[test]
    fn find_parent_distinguishes_root_nested_and_missing() {
        let tree = sample_tree();

        assert_eq!(tree.find_parent(&id("b")), Some(ParentRef::Root));
        assert_eq!(tree.find_parent(&id("a1x")), Some(ParentRef::Card(id("a1"))));
        assert_eq!(tree.find_parent(&id("nope")), None);
    }

    #[test]
    fn is_in_subtree_covers_self_and_descendants() {
        let tree = sample_tree();

        assert!(tree.is_in_subtree(&id("a"), &id("a")));
        assert!(tree.is_in_subtree(&id("a"), &id("a1x")));
        assert!(!tree.is_in_subtree(&id("a1"), &id("a2")));
        assert!(!tree.is_in_subtree(&id("missing"), &id("a")));
    }

    #[test]
    fn edges_are_depth_first() {
        let tree = sample_tree();
        let edges: Vec<_> = tree
            .edges()
            .into_iter()
            .map(|edge| (edge.parent.as_str(), edge.child.as_str()))
            .collect();

        assert_eq!(edges, vec![("a", "a1"), ("a1", "a1x"), ("a", "a2")]);
    }

    #[test]
    fn move_root_clamps_target() {
        let mut tree = sample_tree();

        assert!(tree.move_root(0, 10));
        assert_eq!(tree.root_index(&id("a")), Some(1));
        assert!(!tree.move_root(5, 0));
    }
}
