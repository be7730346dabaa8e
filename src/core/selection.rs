//! The user's chosen study pool.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Set of card ids the user wants to study, independent of mastery.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection {
    ids: BTreeSet<u32>,
}

impl Selection {
    /// Create an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the card is selected.
    pub fn contains(&self, card_id: u32) -> bool {
        self.ids.contains(&card_id)
    }

    /// Add a card if absent, remove it if present. Returns whether the card
    /// is selected afterwards.
    pub fn toggle(&mut self, card_id: u32) -> bool {
        if self.ids.remove(&card_id) {
            false
        } else {
            self.ids.insert(card_id);
            true
        }
    }

    /// Number of selected cards.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Selected ids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.ids.iter().copied()
    }

    /// Keep only ids accepted by the predicate. Returns how many were removed.
    pub fn retain(&mut self, mut keep: impl FnMut(u32) -> bool) -> usize {
        let before = self.ids.len();
        self.ids.retain(|id| keep(*id));
        before - self.ids.len()
    }
}

impl FromIterator<u32> for Selection {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}
