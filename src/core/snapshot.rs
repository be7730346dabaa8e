//! The persisted unit: cards, selection and queue.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::card::Card;
use crate::core::queue::StudyQueue;
use crate::core::selection::Selection;

/// Current snapshot schema version.
pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

fn default_version() -> u32 {
    SNAPSHOT_SCHEMA_VERSION
}

/// Everything needed to reconstruct a study session.
///
/// Field names are camelCase so state exported by the browser tool
/// (`cards`, `selectedCardIds`, `studyQueue`) loads as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default = "default_version")]
    pub version: u32,
    /// When the session last handed this snapshot to a store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
    pub cards: Vec<Card>,
    #[serde(default)]
    pub selected_card_ids: Selection,
    #[serde(default)]
    pub study_queue: StudyQueue,
}

impl Snapshot {
    /// Create a snapshot of the given state.
    pub fn new(cards: Vec<Card>, selected_card_ids: Selection, study_queue: StudyQueue) -> Self {
        Self {
            version: SNAPSHOT_SCHEMA_VERSION,
            saved_at: None,
            cards,
            selected_card_ids,
            study_queue,
        }
    }

    /// Parse a snapshot from JSON.
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::card::CardStatus;

    fn sample() -> Snapshot {
        let mut learning = Card::new(1, "Q1", "A1");
        learning.know_count = 2;
        learning.status = CardStatus::Learning;
        Snapshot::new(
            vec![Card::new(0, "Q0", "A0"), learning],
            [0, 1].into_iter().collect(),
            StudyQueue::from_ids(vec![1, 0]),
        )
    }

    #[test]
    fn test_round_trip_ignores_flip() {
        let mut snapshot = sample();
        snapshot.cards[0].is_flipped = true;

        let restored = Snapshot::from_json(&snapshot.to_json().unwrap()).unwrap();

        assert!(!restored.cards[0].is_flipped);
        snapshot.cards[0].is_flipped = false;
        assert_eq!(restored, snapshot);
    }

    #[test]
    fn test_reads_browser_state() {
        let json = r#"{
            "cards": [
                {"id": 0, "question": "Q0", "answer": "A0", "knowCount": 0, "status": "new", "isFlipped": false},
                {"id": 1, "question": "Q1", "answer": "A1", "knowCount": 5, "status": "learned", "isFlipped": true}
            ],
            "selectedCardIds": [1, 0],
            "studyQueue": [0]
        }"#;
        let snapshot = Snapshot::from_json(json).unwrap();
        assert_eq!(snapshot.version, SNAPSHOT_SCHEMA_VERSION);
        assert_eq!(snapshot.cards[1].status, CardStatus::Learned);
        assert_eq!(snapshot.selected_card_ids.len(), 2);
        assert_eq!(snapshot.study_queue.ids(), &[0]);
    }

    #[test]
    fn test_missing_selection_and_queue_default_empty() {
        let snapshot = Snapshot::from_json(r#"{"cards": []}"#).unwrap();
        assert!(snapshot.selected_card_ids.is_empty());
        assert!(snapshot.study_queue.is_empty());
        assert!(snapshot.saved_at.is_none());
    }

    #[test]
    fn test_malformed_is_error() {
        assert!(Snapshot::from_json("{\"cards\": 3}").is_err());
        assert!(Snapshot::from_json("not json").is_err());
    }
}
