//! Source deck: the fixed, ordered question/answer list a fresh session is
//! built from.
//!
//! Decks are JSON arrays of `{"question": ..., "answer": ...}` objects. The
//! order is significant: a card's id is its index in the deck.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{FlipdeckError, Result};
use crate::util::read_to_string_limited;

/// One question/answer pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckEntry {
    pub question: String,
    pub answer: String,
}

impl DeckEntry {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// An ordered list of deck entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceDeck {
    entries: Vec<DeckEntry>,
}

impl SourceDeck {
    pub fn new(entries: Vec<DeckEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[DeckEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse a deck from JSON, rejecting blank questions.
    pub fn from_json(json: &str) -> Result<Self> {
        let deck: SourceDeck = serde_json::from_str(json)
            .map_err(|e| FlipdeckError::deck(format!("invalid deck JSON: {}", e)))?;
        if let Some(index) = deck
            .entries
            .iter()
            .position(|e| e.question.trim().is_empty())
        {
            return Err(FlipdeckError::deck(format!(
                "entry {} has an empty question",
                index
            )));
        }
        Ok(deck)
    }
}

/// Provider of the source deck, read once when a session starts fresh or is
/// reset.
pub trait DeckSource {
    fn load_deck(&self) -> Result<SourceDeck>;
}

impl DeckSource for SourceDeck {
    fn load_deck(&self) -> Result<SourceDeck> {
        Ok(self.clone())
    }
}

/// Deck stored in a JSON file.
#[derive(Debug, Clone)]
pub struct DeckFile {
    path: PathBuf,
}

impl DeckFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DeckSource for DeckFile {
    fn load_deck(&self) -> Result<SourceDeck> {
        let content = read_to_string_limited(&self.path)?;
        SourceDeck::from_json(&content)
    }
}

/// Used when no deck is configured: loading fails with a hint, so a session
/// can still open from an existing snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDeck;

impl DeckSource for NoDeck {
    fn load_deck(&self) -> Result<SourceDeck> {
        Err(FlipdeckError::deck(
            "no deck configured (pass --deck, set FLIPDECK_DECK, or [deck] path in config.toml)",
        ))
    }
}
