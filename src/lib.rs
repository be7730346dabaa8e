//! flipdeck - flashcard study queue
//!
//! flipdeck keeps a deck of question/answer cards, tracks how well each one
//! is known, and schedules a study queue that brings failed cards back soon
//! and pushes familiar ones further away. Progress is stored per identity as
//! a JSON snapshot.

pub mod cli;
pub mod config;
pub mod core;
pub mod deck;
pub mod error;
pub mod identity;
pub mod storage;
pub mod util;

pub use config::Config;
pub use core::{
    Card, CardStats, CardStatus, Confirmation, CurrentView, Graduation, MasteryPolicy,
    Placement, RebuildOrder, ReinsertPolicy, Selection, SessionPhase, Snapshot, StudyQueue,
    StudySession,
};
pub use deck::{DeckFile, DeckSource, NoDeck, SourceDeck};
pub use error::{FlipdeckError, Result};
pub use identity::{Identity, SnapshotKey};
pub use storage::{DebouncedStore, FileSnapshotStore, MemorySnapshotStore, SnapshotStore};

// CLI commands
pub use cli::{
    ConfigCommand, ListCommand, QueueCommand, ResetCommand, SelectCommand, StatsCommand,
    StudyCommand,
};
