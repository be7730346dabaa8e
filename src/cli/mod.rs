//! CLI commands for flipdeck.
//!
//! This module provides CLI commands for flipdeck, organized into:
//! - **Study commands**: show, flip, known, unknown
//! - **Pool commands**: select, select-all, deselect-all, filter, shuffle, rebuild
//! - **User commands**: stats, list, reset, config

// Study commands
pub mod study;

// Pool commands
pub mod queue_cmd;
pub mod select;

// User commands
pub mod config_cmd;
pub mod list;
pub mod reset;
pub mod stats;

pub use config_cmd::ConfigCommand;
pub use list::ListCommand;
pub use queue_cmd::QueueCommand;
pub use reset::ResetCommand;
pub use select::SelectCommand;
pub use stats::StatsCommand;
pub use study::StudyCommand;

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::config::Config;
    use crate::core::StudySession;
    use crate::deck::{DeckEntry, SourceDeck};
    use crate::identity::Identity;
    use crate::storage::MemorySnapshotStore;

    pub type TestSession = StudySession<Arc<MemorySnapshotStore>, SourceDeck>;

    /// A loaded session over a fresh `n`-card deck with a seeded rng.
    pub fn open_session(n: usize) -> (Arc<MemorySnapshotStore>, TestSession) {
        let store = Arc::new(MemorySnapshotStore::new());
        let deck = SourceDeck::new(
            (0..n)
                .map(|i| DeckEntry::new(format!("Q{}", i), format!("A{}", i)))
                .collect(),
        );
        let mut session =
            StudySession::new(Arc::clone(&store), deck, &Identity::Anonymous, &Config::default())
                .with_rng(StdRng::seed_from_u64(3));
        session.load().unwrap();
        (store, session)
    }
}
