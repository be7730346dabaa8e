//! Study queue scheduling.
//!
//! The queue is an ordered list of card ids drawn from the selection. It is
//! maintained incrementally: selection changes filter and append instead of
//! reshuffling, and each review pops the head and reinserts it at an
//! outcome-dependent offset. Better-known cards are pushed further back,
//! failed cards come around again almost immediately. This gives Leitner
//! style spacing without any wall-clock scheduling.

use std::cmp::Reverse;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::card::{Card, CardStatus};
use crate::core::selection::Selection;
use crate::core::store::{CardStore, ReviewRecord};

/// When a successfully reviewed card leaves the queue for good.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Graduation {
    /// As soon as the review leaves the card learned.
    #[default]
    OnLearned,
    /// Only when the card's `know_count` was already at the learned
    /// threshold before this review, so a card that just crossed it gets one
    /// more pass.
    AfterLearnedReview,
}

impl Graduation {
    /// Whether this review graduates the card out of the queue.
    pub fn graduates(&self, record: &ReviewRecord) -> bool {
        match self {
            Graduation::OnLearned => record.status == CardStatus::Learned,
            Graduation::AfterLearnedReview => {
                record.previous_know_count >= record.learned_threshold
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Graduation::OnLearned => "on_learned",
            Graduation::AfterLearnedReview => "after_learned_review",
        }
    }
}

impl fmt::Display for Graduation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Graduation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "on_learned" => Ok(Graduation::OnLearned),
            "after_learned_review" => Ok(Graduation::AfterLearnedReview),
            other => Err(format!(
                "unknown graduation rule '{}' (expected on_learned or after_learned_review)",
                other
            )),
        }
    }
}

/// Sort direction for a full rebuild, by `know_count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RebuildOrder {
    /// Weakest cards first.
    Ascending,
    /// Most familiar cards first.
    #[default]
    Descending,
}

impl RebuildOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            RebuildOrder::Ascending => "ascending",
            RebuildOrder::Descending => "descending",
        }
    }
}

impl fmt::Display for RebuildOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RebuildOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ascending" | "asc" => Ok(RebuildOrder::Ascending),
            "descending" | "desc" => Ok(RebuildOrder::Descending),
            other => Err(format!(
                "unknown rebuild order '{}' (expected ascending or descending)",
                other
            )),
        }
    }
}

/// Offsets used to put a reviewed card back into the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReinsertPolicy {
    /// Position a failed card returns to, capped by the queue length.
    pub failure_offset: usize,
    /// Base position for a successful card.
    pub success_base: usize,
    /// Extra positions per point of `know_count` (before the review).
    pub success_step: usize,
    /// Upper bound (inclusive) of the random extra offset.
    pub success_jitter: usize,
    /// Graduation rule for successful reviews.
    pub graduation: Graduation,
}

impl Default for ReinsertPolicy {
    fn default() -> Self {
        Self {
            failure_offset: 2,
            success_base: 2,
            success_step: 2,
            success_jitter: 2,
            graduation: Graduation::OnLearned,
        }
    }
}

impl ReinsertPolicy {
    /// Target index for a successful card before capping to the queue length.
    fn success_offset<R: Rng>(&self, previous_know_count: u32, rng: &mut R) -> usize {
        let spacing = (previous_know_count as usize).saturating_mul(self.success_step);
        let jitter = rng.gen_range(0..=self.success_jitter);
        self.success_base
            .saturating_add(spacing)
            .saturating_add(jitter)
    }
}

/// Where a reviewed card ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "index")]
pub enum Placement {
    /// Removed from the queue.
    Graduated,
    /// Put back at this index.
    Reinserted(usize),
    /// The reviewed card was not the queue head; nothing moved.
    Unchanged,
}

/// What a selection-change rebuild did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RebuildSummary {
    /// Ids dropped because they were deselected, unknown or duplicated.
    pub removed: usize,
    /// Selected ids that were missing from the queue and got appended.
    pub added: usize,
}

/// Ordered working queue of card ids. The head is the current card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudyQueue {
    ids: Vec<u32>,
}

impl StudyQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a queue with the given order, as restored from a snapshot.
    pub fn from_ids(ids: Vec<u32>) -> Self {
        Self { ids }
    }

    /// Queue contents, head first.
    pub fn ids(&self) -> &[u32] {
        &self.ids
    }

    /// Number of queued ids.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// The current card id.
    pub fn current(&self) -> Option<u32> {
        self.ids.first().copied()
    }

    /// Position of an id in the queue.
    pub fn position(&self, card_id: u32) -> Option<usize> {
        self.ids.iter().position(|id| *id == card_id)
    }

    /// Drop ids that are unselected, unknown to the store, or repeated.
    /// Order of the survivors is kept. Returns how many were dropped.
    pub fn retain_valid(&mut self, selection: &Selection, store: &CardStore) -> usize {
        let before = self.ids.len();
        let mut seen = HashSet::with_capacity(before);
        self.ids
            .retain(|id| selection.contains(*id) && store.contains(*id) && seen.insert(*id));
        before - self.ids.len()
    }

    /// Reconcile the queue with a changed selection.
    ///
    /// Cards still in play keep their positions. Every selected card missing
    /// from the queue is appended, most familiar first (descending
    /// `know_count`, deck order among equals), so a returning card surfaces
    /// before brand-new ones. This includes graduated cards that are still
    /// selected.
    pub fn rebuild_on_selection_change(
        &mut self,
        current: &Selection,
        store: &CardStore,
    ) -> RebuildSummary {
        let removed = self.retain_valid(current, store);

        let queued: HashSet<u32> = self.ids.iter().copied().collect();
        let mut added: Vec<&Card> = store
            .cards()
            .iter()
            .filter(|c| current.contains(c.id) && !queued.contains(&c.id))
            .collect();
        added.sort_by_key(|c| Reverse(c.know_count));

        let summary = RebuildSummary {
            removed,
            added: added.len(),
        };
        self.ids.extend(added.into_iter().map(|c| c.id));

        tracing::debug!(
            removed = summary.removed,
            added = summary.added,
            len = self.ids.len(),
            "queue reconciled with selection"
        );
        summary
    }

    /// Discard the queue and rebuild it from every selected card.
    pub fn full_rebuild<R: Rng>(
        &mut self,
        selection: &Selection,
        store: &CardStore,
        order: RebuildOrder,
        shuffle: bool,
        rng: &mut R,
    ) {
        let mut selected: Vec<&Card> = store
            .cards()
            .iter()
            .filter(|c| selection.contains(c.id))
            .collect();
        match order {
            RebuildOrder::Ascending => selected.sort_by_key(|c| c.know_count),
            RebuildOrder::Descending => selected.sort_by_key(|c| Reverse(c.know_count)),
        }

        self.ids = selected.into_iter().map(|c| c.id).collect();
        if shuffle {
            self.ids.shuffle(rng);
        }
        tracing::debug!(len = self.ids.len(), ?order, shuffle, "queue rebuilt");
    }

    /// Pop the head if it is the reviewed card.
    fn pop_reviewed(&mut self, card_id: u32) -> bool {
        if self.current() != Some(card_id) {
            tracing::warn!(
                card_id,
                head = ?self.current(),
                "reviewed card is not the queue head, leaving queue untouched"
            );
            return false;
        }
        self.ids.remove(0);
        true
    }

    /// Apply a successful review of the head card.
    pub fn on_success<R: Rng>(
        &mut self,
        record: &ReviewRecord,
        policy: &ReinsertPolicy,
        rng: &mut R,
    ) -> Placement {
        if !self.pop_reviewed(record.card_id) {
            return Placement::Unchanged;
        }

        if policy.graduation.graduates(record) {
            tracing::debug!(card_id = record.card_id, "card graduated out of the queue");
            return Placement::Graduated;
        }

        let index = policy
            .success_offset(record.previous_know_count, rng)
            .min(self.ids.len());
        self.ids.insert(index, record.card_id);
        Placement::Reinserted(index)
    }

    /// Apply a failed review of the head card.
    pub fn on_failure(&mut self, record: &ReviewRecord, policy: &ReinsertPolicy) -> Placement {
        if !self.pop_reviewed(record.card_id) {
            return Placement::Unchanged;
        }

        let index = policy.failure_offset.min(self.ids.len());
        self.ids.insert(index, record.card_id);
        Placement::Reinserted(index)
    }

    /// Uniformly permute the queue.
    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) {
        self.ids.shuffle(rng);
    }
}
