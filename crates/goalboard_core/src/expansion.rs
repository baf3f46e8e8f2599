//! Which cards currently show their children as a column.

use crate::model::card::CardId;
use std::collections::HashMap;

/// Expansion flags keyed by card id.
///
/// Missing entries read as collapsed. Entries of deleted cards are left in
/// place and simply never match a projected card again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionSet {
    flags: HashMap<CardId, bool>,
}

impl ExpansionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_expanded(&self, id: &CardId) -> bool {
        self.flags.get(id).copied().unwrap_or(false)
    }

    pub fn set_expanded(&mut self, id: CardId, expanded: bool) {
        self.flags.insert(id, expanded);
    }

    /// Flips the flag for `id` and returns the new state.
    pub fn toggle(&mut self, id: &CardId) -> bool {
        let flag = self.flags.entry(id.clone()).or_insert(false);
        *flag = !*flag;
        *flag
    }
}

#[cfg(test)]
mod tests {
    use super::ExpansionSet;
    use crate::model::card::CardId;

    #[test]
    fn missing_entries_read_as_collapsed_and_toggle_flips() {
        let mut set = ExpansionSet::new();
        let id = CardId::new("a");

        assert!(!set.is_expanded(&id));
        assert!(set.toggle(&id));
        assert!(set.is_expanded(&id));
        assert!(!set.toggle(&id));

        set.set_expanded(id.clone(), true);
        assert!(set.is_expanded(&id));
    }
}
