//! Card store: the authoritative card list and review bookkeeping.
//!
//! Every operation is total. An unknown card id is a caller bug (ids are
//! generated internally), so it is logged and the store is left unchanged
//! rather than surfaced as an error.

use serde::{Deserialize, Serialize};

use crate::core::card::{Card, CardStatus, MasteryPolicy};
use crate::deck::SourceDeck;

/// Counts of cards per mastery status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardStats {
    pub total: usize,
    pub learned: usize,
    pub learning: usize,
    pub new: usize,
}

/// What a review did to a card, as seen by the queue scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReviewRecord {
    /// The reviewed card.
    pub card_id: u32,
    /// `know_count` before the review.
    pub previous_know_count: u32,
    /// Status before the review.
    pub previous_status: CardStatus,
    /// `know_count` after the review.
    pub know_count: u32,
    /// Status after the review.
    pub status: CardStatus,
    /// Learned threshold of the policy the review was scored under.
    pub learned_threshold: u32,
}

/// Owns the canonical cards and applies review outcomes.
#[derive(Debug, Clone, PartialEq)]
pub struct CardStore {
    cards: Vec<Card>,
    policy: MasteryPolicy,
}

impl CardStore {
    /// Build fresh cards from the source deck. Ids are deck indices.
    pub fn initialize(deck: &SourceDeck, policy: MasteryPolicy) -> Self {
        let cards = deck
            .entries()
            .iter()
            .enumerate()
            .map(|(index, entry)| Card::new(index as u32, &entry.question, &entry.answer))
            .collect();
        Self { cards, policy }
    }

    /// Rebuild a store from persisted cards.
    ///
    /// Statuses are re-derived under the current policy, flip state is
    /// cleared, and later duplicates of an id are discarded.
    pub fn from_cards(cards: Vec<Card>, policy: MasteryPolicy) -> Self {
        let mut seen = std::collections::HashSet::new();
        let mut kept = Vec::with_capacity(cards.len());
        for mut card in cards {
            if !seen.insert(card.id) {
                tracing::warn!(card_id = card.id, "dropping duplicate card id from snapshot");
                continue;
            }
            let status = policy.reclassify(&card);
            if status != card.status {
                tracing::debug!(
                    card_id = card.id,
                    from = card.status.label(),
                    to = status.label(),
                    "reclassified persisted card"
                );
            }
            card.status = status;
            card.is_flipped = false;
            kept.push(card);
        }
        Self {
            cards: kept,
            policy,
        }
    }

    /// All cards in deck order.
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Consume the store, returning its cards.
    pub fn into_cards(self) -> Vec<Card> {
        self.cards
    }

    /// The mastery policy in force.
    pub fn policy(&self) -> &MasteryPolicy {
        &self.policy
    }

    /// Number of cards.
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Whether the store has no cards.
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Look up a card by id.
    pub fn get(&self, card_id: u32) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == card_id)
    }

    /// Whether a card with this id exists.
    pub fn contains(&self, card_id: u32) -> bool {
        self.get(card_id).is_some()
    }

    fn get_mut(&mut self, card_id: u32) -> Option<&mut Card> {
        self.cards.iter_mut().find(|c| c.id == card_id)
    }

    /// Record a successful review.
    pub fn record_known(&mut self, card_id: u32) -> Option<ReviewRecord> {
        let policy = self.policy;
        let threshold = policy.learned_threshold;
        let Some(card) = self.get_mut(card_id) else {
            tracing::warn!(card_id, "record_known: card not found");
            return None;
        };

        let previous_know_count = card.know_count;
        let previous_status = card.status;

        card.know_count = card.know_count.saturating_add(1);
        card.streak = card.streak.saturating_add(1);
        card.status = policy.status_after_success(card);
        card.is_flipped = false;

        Some(ReviewRecord {
            card_id,
            previous_know_count,
            previous_status,
            know_count: card.know_count,
            status: card.status,
            learned_threshold: threshold,
        })
    }

    /// Record a failed review.
    ///
    /// The card always ends up `Learning`, even at zero: a failure never
    /// demotes a card back to `New`.
    pub fn record_unknown(&mut self, card_id: u32) -> Option<ReviewRecord> {
        let decrement = self.policy.failure_decrement;
        let threshold = self.policy.learned_threshold;
        let Some(card) = self.get_mut(card_id) else {
            tracing::warn!(card_id, "record_unknown: card not found");
            return None;
        };

        let previous_know_count = card.know_count;
        let previous_status = card.status;

        card.know_count = card.know_count.saturating_sub(decrement);
        card.streak = 0;
        card.status = CardStatus::Learning;
        card.is_flipped = false;

        Some(ReviewRecord {
            card_id,
            previous_know_count,
            previous_status,
            know_count: card.know_count,
            status: card.status,
            learned_threshold: threshold,
        })
    }

    /// Flip the display side of a card. Returns the new flip state.
    pub fn toggle_flip(&mut self, card_id: u32) -> Option<bool> {
        match self.get_mut(card_id) {
            Some(card) => {
                card.is_flipped = !card.is_flipped;
                Some(card.is_flipped)
            }
            None => {
                tracing::warn!(card_id, "toggle_flip: card not found");
                None
            }
        }
    }

    /// Count cards per status.
    pub fn compute_stats(&self) -> CardStats {
        let mut stats = CardStats {
            total: self.cards.len(),
            ..Default::default()
        };
        for card in &self.cards {
            match card.status {
                CardStatus::Learned => stats.learned += 1,
                CardStatus::Learning => stats.learning += 1,
                CardStatus::New => stats.new += 1,
            }
        }
        stats
    }

    /// Ids of every card, in deck order.
    pub fn all_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.cards.iter().map(|c| c.id)
    }

    /// Ids of learned cards.
    pub fn learned_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.cards
            .iter()
            .filter(|c| c.status == CardStatus::Learned)
            .map(|c| c.id)
    }

    /// Ids of new or learning cards.
    pub fn unlearned_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.cards
            .iter()
            .filter(|c| c.status.is_unlearned())
            .map(|c| c.id)
    }
}
