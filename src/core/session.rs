//! Study session: the owner of one snapshot and the action surface.
//!
//! A session is created in [`SessionPhase::Loading`], restores or builds its
//! snapshot in [`StudySession::load`], and only then accepts actions. Every
//! action runs to completion on the in-memory state and then hands a fresh
//! snapshot to the store. Save failures are logged and never undo the action.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::config::Config;
use crate::core::card::{Card, MasteryPolicy};
use crate::core::queue::{Placement, RebuildOrder, RebuildSummary, ReinsertPolicy, StudyQueue};
use crate::core::selection::Selection;
use crate::core::snapshot::Snapshot;
use crate::core::store::{CardStats, CardStore, ReviewRecord};
use crate::deck::DeckSource;
use crate::error::{FailOpen, FlipdeckError, Result};
use crate::identity::{Identity, SnapshotKey};
use crate::storage::SnapshotStore;

/// Lifecycle phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Snapshot not loaded yet. Actions are rejected.
    Loading,
    /// Accepting actions.
    Ready,
}

/// Explicit consent for destructive actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Unconfirmed,
}

impl From<bool> for Confirmation {
    fn from(confirmed: bool) -> Self {
        if confirmed {
            Confirmation::Confirmed
        } else {
            Confirmation::Unconfirmed
        }
    }
}

/// What the study screen shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrentView<'a> {
    /// The queue head.
    Card(&'a Card),
    /// Cards are selected but none is left in the queue.
    AllMastered,
    /// Nothing is selected.
    NothingSelected,
}

/// Result of marking the current card known or unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReviewOutcome {
    pub record: ReviewRecord,
    pub placement: Placement,
}

/// One user's study state bound to a store and a deck.
pub struct StudySession<S: SnapshotStore, D: DeckSource> {
    store: S,
    deck: D,
    key: SnapshotKey,
    phase: SessionPhase,
    cards: CardStore,
    selection: Selection,
    queue: StudyQueue,
    reinsert: ReinsertPolicy,
    rebuild_order: RebuildOrder,
    shuffle_on_rebuild: bool,
    rng: StdRng,
}

impl<S: SnapshotStore, D: DeckSource> StudySession<S, D> {
    /// Create a session in the `Loading` phase. Call [`load`](Self::load)
    /// before any action.
    pub fn new(store: S, deck: D, identity: &Identity, config: &Config) -> Self {
        let mastery = config.mastery_policy();
        Self {
            store,
            deck,
            key: identity.snapshot_key(),
            phase: SessionPhase::Loading,
            cards: CardStore::from_cards(Vec::new(), mastery),
            selection: Selection::new(),
            queue: StudyQueue::new(),
            reinsert: config.reinsert_policy(),
            rebuild_order: config.queue.rebuild_order,
            shuffle_on_rebuild: config.queue.shuffle_on_rebuild,
            rng: StdRng::from_entropy(),
        }
    }

    /// Replace the random source (tests seed it).
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Create and load a session.
    pub fn open(store: S, deck: D, identity: &Identity, config: &Config) -> Result<Self> {
        let mut session = Self::new(store, deck, identity, config);
        session.load()?;
        Ok(session)
    }

    /// Restore the snapshot for this identity, or start fresh from the deck.
    ///
    /// A missing, unreadable or empty snapshot means a fresh start. Only a
    /// deck that cannot be loaded for a fresh start is an error.
    pub fn load(&mut self) -> Result<()> {
        if self.phase == SessionPhase::Ready {
            return Err(FlipdeckError::invalid_state("session is already loaded"));
        }

        let snapshot = self
            .store
            .load(&self.key)
            .fail_open_default("loading snapshot")
            .filter(|s| !s.cards.is_empty());

        match snapshot {
            Some(snapshot) => {
                if self.restore(snapshot) {
                    self.persist();
                }
            }
            None => {
                tracing::debug!(key = %self.key, "no snapshot, starting from the deck");
                self.initialize_from_deck()?;
                self.persist();
            }
        }

        self.phase = SessionPhase::Ready;
        Ok(())
    }

    /// Adopt a snapshot, repairing dangling ids. Returns whether anything
    /// had to be repaired.
    fn restore(&mut self, snapshot: Snapshot) -> bool {
        let mastery = *self.cards.policy();
        self.cards = CardStore::from_cards(snapshot.cards, mastery);
        self.selection = snapshot.selected_card_ids;
        self.queue = snapshot.study_queue;

        let cards = &self.cards;
        let dropped_selected = self.selection.retain(|id| cards.contains(id));
        let dropped_queued = self.queue.retain_valid(&self.selection, &self.cards);

        if dropped_selected > 0 || dropped_queued > 0 {
            tracing::warn!(
                key = %self.key,
                dropped_selected,
                dropped_queued,
                "repaired inconsistent snapshot"
            );
            return true;
        }
        false
    }

    fn initialize_from_deck(&mut self) -> Result<()> {
        let deck = self.deck.load_deck()?;
        let mastery = *self.cards.policy();
        self.cards = CardStore::initialize(&deck, mastery);
        self.selection = self.cards.all_ids().collect();
        self.queue = StudyQueue::new();
        self.queue.full_rebuild(
            &self.selection,
            &self.cards,
            self.rebuild_order,
            self.shuffle_on_rebuild,
            &mut self.rng,
        );
        Ok(())
    }

    fn ensure_ready(&self) -> Result<()> {
        match self.phase {
            SessionPhase::Ready => Ok(()),
            SessionPhase::Loading => Err(FlipdeckError::invalid_state(
                "session is still loading",
            )),
        }
    }

    /// Hand the current state to the store.
    fn persist(&self) {
        let mut snapshot = self.snapshot();
        snapshot.saved_at = Some(Utc::now());
        self.store
            .save(&self.key, &snapshot)
            .fail_open_default("saving snapshot");
    }

    /// Turn the current card over. Display state only, so nothing is saved.
    pub fn flip(&mut self) -> Result<Option<bool>> {
        self.ensure_ready()?;
        Ok(self
            .queue
            .current()
            .and_then(|id| self.cards.toggle_flip(id)))
    }

    /// The user knew the current card.
    pub fn mark_known(&mut self) -> Result<Option<ReviewOutcome>> {
        self.ensure_ready()?;
        let Some(card_id) = self.queue.current() else {
            return Ok(None);
        };
        let Some(record) = self.cards.record_known(card_id) else {
            return Ok(None);
        };

        let placement = self.queue.on_success(&record, &self.reinsert, &mut self.rng);
        self.persist();
        Ok(Some(ReviewOutcome { record, placement }))
    }

    /// The user did not know the current card.
    pub fn mark_unknown(&mut self) -> Result<Option<ReviewOutcome>> {
        self.ensure_ready()?;
        let Some(card_id) = self.queue.current() else {
            return Ok(None);
        };
        let Some(record) = self.cards.record_unknown(card_id) else {
            return Ok(None);
        };

        let placement = self.queue.on_failure(&record, &self.reinsert);
        self.persist();
        Ok(Some(ReviewOutcome { record, placement }))
    }

    /// Replace the selection through `change`, then reconcile the queue.
    fn change_selection(
        &mut self,
        change: impl FnOnce(&mut Selection, &CardStore),
    ) -> RebuildSummary {
        change(&mut self.selection, &self.cards);
        let summary = self
            .queue
            .rebuild_on_selection_change(&self.selection, &self.cards);
        self.persist();
        summary
    }

    /// Toggle one card in or out of the selection. Returns whether it is
    /// selected afterwards, or `None` for an unknown id.
    pub fn toggle_select(&mut self, card_id: u32) -> Result<Option<bool>> {
        self.ensure_ready()?;
        if !self.cards.contains(card_id) {
            tracing::warn!(card_id, "toggle_select: card not found");
            return Ok(None);
        }

        let mut selected = false;
        self.change_selection(|selection, _| selected = selection.toggle(card_id));
        Ok(Some(selected))
    }

    pub fn select_all(&mut self) -> Result<RebuildSummary> {
        self.ensure_ready()?;
        Ok(self.change_selection(|selection, cards| *selection = cards.all_ids().collect()))
    }

    pub fn deselect_all(&mut self) -> Result<RebuildSummary> {
        self.ensure_ready()?;
        Ok(self.change_selection(|selection, _| *selection = Selection::new()))
    }

    /// Select exactly the learned cards.
    pub fn filter_learned(&mut self) -> Result<RebuildSummary> {
        self.ensure_ready()?;
        Ok(self.change_selection(|selection, cards| *selection = cards.learned_ids().collect()))
    }

    /// Select exactly the new and learning cards.
    pub fn filter_unlearned(&mut self) -> Result<RebuildSummary> {
        self.ensure_ready()?;
        Ok(self
            .change_selection(|selection, cards| *selection = cards.unlearned_ids().collect()))
    }

    pub fn shuffle_queue(&mut self) -> Result<()> {
        self.ensure_ready()?;
        self.queue.shuffle(&mut self.rng);
        self.persist();
        Ok(())
    }

    /// Rebuild the queue from every selected card. `shuffle` overrides the
    /// configured `shuffle_on_rebuild`.
    pub fn rebuild_queue(&mut self, shuffle: Option<bool>) -> Result<()> {
        self.ensure_ready()?;
        let shuffle = shuffle.unwrap_or(self.shuffle_on_rebuild);
        self.queue.full_rebuild(
            &self.selection,
            &self.cards,
            self.rebuild_order,
            shuffle,
            &mut self.rng,
        );
        self.persist();
        Ok(())
    }

    /// Throw away all progress and start over from the deck.
    ///
    /// Nothing changes unless `confirmation` is [`Confirmation::Confirmed`].
    pub fn reset_progress(&mut self, confirmation: Confirmation) -> Result<()> {
        self.ensure_ready()?;
        if confirmation != Confirmation::Confirmed {
            return Err(FlipdeckError::confirmation_required("reset progress"));
        }

        // Load the deck first so a broken deck leaves the session intact
        let deck = self.deck.load_deck()?;
        self.store
            .clear(&self.key)
            .fail_open_default("clearing snapshot");

        let mastery = *self.cards.policy();
        self.cards = CardStore::initialize(&deck, mastery);
        self.selection = self.cards.all_ids().collect();
        self.queue.full_rebuild(
            &self.selection,
            &self.cards,
            self.rebuild_order,
            self.shuffle_on_rebuild,
            &mut self.rng,
        );
        tracing::info!(key = %self.key, cards = self.cards.len(), "progress reset");
        self.persist();
        Ok(())
    }

    /// Write out anything the store buffers.
    pub fn flush(&self) -> Result<()> {
        self.store.flush()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn key(&self) -> &SnapshotKey {
        &self.key
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The card at the head of the queue.
    pub fn current_card(&self) -> Option<&Card> {
        self.queue.current().and_then(|id| self.cards.get(id))
    }

    pub fn current_view(&self) -> CurrentView<'_> {
        match self.current_card() {
            Some(card) => CurrentView::Card(card),
            None if self.selection.is_empty() => CurrentView::NothingSelected,
            None => CurrentView::AllMastered,
        }
    }

    pub fn stats(&self) -> CardStats {
        self.cards.compute_stats()
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn queue(&self) -> &StudyQueue {
        &self.queue
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn cards(&self) -> &CardStore {
        &self.cards
    }

    pub fn mastery_policy(&self) -> &MasteryPolicy {
        self.cards.policy()
    }

    /// The current state as a snapshot (without a save timestamp).
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(
            self.cards.cards().to_vec(),
            self.selection.clone(),
            self.queue.clone(),
        )
    }
}
