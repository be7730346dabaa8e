//! Card entity and mastery classification.
//!
//! A card pairs immutable question/answer text with a small progress
//! counter. The mastery status is always derived from that counter by a
//! [`MasteryPolicy`]; nothing outside the card store sets it directly.

use serde::{Deserialize, Serialize};

/// Default number of successful reviews before a card counts as learned.
pub const LEARNED_THRESHOLD: u32 = 5;

/// Mastery status of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CardStatus {
    /// Never reviewed.
    #[default]
    New,
    /// Reviewed at least once, not yet mastered.
    Learning,
    /// Mastered.
    Learned,
}

impl CardStatus {
    /// Whether the card still needs study (new or learning).
    pub fn is_unlearned(&self) -> bool {
        !matches!(self, CardStatus::Learned)
    }

    /// Short label used in listings.
    pub fn label(&self) -> &'static str {
        match self {
            CardStatus::New => "new",
            CardStatus::Learning => "learning",
            CardStatus::Learned => "learned",
        }
    }
}

/// One question/answer unit with its review progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    /// Stable identity, the card's index in the source deck.
    pub id: u32,
    /// Question text.
    pub question: String,
    /// Answer text.
    pub answer: String,
    /// Net successful reviews, floored at zero.
    #[serde(default)]
    pub know_count: u32,
    /// Derived mastery status.
    #[serde(default)]
    pub status: CardStatus,
    /// Consecutive successes since the last failure.
    #[serde(default)]
    pub streak: u32,
    /// Whether the answer side is showing. Display state only.
    #[serde(default, skip_serializing)]
    pub is_flipped: bool,
}

impl Card {
    /// Create a fresh, never-reviewed card.
    pub fn new(id: u32, question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            id,
            question: question.into(),
            answer: answer.into(),
            know_count: 0,
            status: CardStatus::New,
            streak: 0,
            is_flipped: false,
        }
    }

    /// Progress label such as `3/5`, or a check mark once learned.
    pub fn progress_label(&self, threshold: u32) -> String {
        match self.status {
            CardStatus::Learned => "✓".to_string(),
            _ => format!("{}/{}", self.know_count.min(threshold), threshold),
        }
    }
}

/// Rules that turn a card's counters into a [`CardStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MasteryPolicy {
    /// `know_count` at which a card is learned.
    pub learned_threshold: u32,
    /// Consecutive successes also required for learned. Zero disables the
    /// streak requirement.
    pub streak_length: u32,
    /// How much `know_count` drops on a failed review.
    pub failure_decrement: u32,
}

impl Default for MasteryPolicy {
    fn default() -> Self {
        Self {
            learned_threshold: LEARNED_THRESHOLD,
            streak_length: 0,
            failure_decrement: 1,
        }
    }
}

impl MasteryPolicy {
    /// Whether the card's counters meet the learned bar.
    pub fn is_learned(&self, card: &Card) -> bool {
        card.know_count >= self.learned_threshold && card.streak >= self.streak_length
    }

    /// Status after a successful review.
    pub fn status_after_success(&self, card: &Card) -> CardStatus {
        if self.is_learned(card) {
            CardStatus::Learned
        } else {
            CardStatus::Learning
        }
    }

    /// Re-derive the status of a persisted card.
    ///
    /// `Learning` is always kept: a failure forces it even when the counter
    /// is still at or above the threshold, and never demotes to `New`.
    /// `Learned` and `New` are kept only while the counters back them.
    pub fn reclassify(&self, card: &Card) -> CardStatus {
        match card.status {
            CardStatus::Learning => CardStatus::Learning,
            CardStatus::New if card.know_count == 0 => CardStatus::New,
            _ if self.is_learned(card) => CardStatus::Learned,
            _ => CardStatus::Learning,
        }
    }
}
