//! Stats command for flipdeck.
//!
//! Displays mastery progress for the deck and the current study pool.

use serde::Serialize;

use crate::core::{CardStats, StudySession};
use crate::deck::DeckSource;
use crate::storage::SnapshotStore;

/// Options for the stats command.
#[derive(Debug, Clone, Default)]
pub struct StatsOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Output format for the stats command.
#[derive(Debug, Clone, Serialize)]
pub struct StatsOutput {
    pub success: bool,
    pub total: usize,
    pub learned: usize,
    pub learning: usize,
    pub new: usize,
    /// Learned share of the deck, 0.0 to 1.0.
    pub learned_ratio: f64,
    pub selected: usize,
    pub queued: usize,
    pub learned_threshold: u32,
    /// Snapshot key the progress is stored under.
    pub key: String,
}

impl StatsOutput {
    fn new(stats: CardStats, selected: usize, queued: usize, threshold: u32, key: String) -> Self {
        let learned_ratio = if stats.total > 0 {
            stats.learned as f64 / stats.total as f64
        } else {
            0.0
        };
        Self {
            success: true,
            total: stats.total,
            learned: stats.learned,
            learning: stats.learning,
            new: stats.new,
            learned_ratio,
            selected,
            queued,
            learned_threshold: threshold,
            key,
        }
    }
}

/// The stats command implementation.
pub struct StatsCommand<'a, S: SnapshotStore, D: DeckSource> {
    session: &'a StudySession<S, D>,
}

impl<'a, S: SnapshotStore, D: DeckSource> StatsCommand<'a, S, D> {
    /// Create a new stats command.
    pub fn new(session: &'a StudySession<S, D>) -> Self {
        Self { session }
    }

    /// Run the stats command.
    pub fn run(&self) -> StatsOutput {
        StatsOutput::new(
            self.session.stats(),
            self.session.selection().len(),
            self.session.queue_len(),
            self.session.mastery_policy().learned_threshold,
            self.session.key().to_string(),
        )
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &StatsOutput, options: &StatsOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            self.format_human_readable(output)
        }
    }

    /// Format output as human-readable text.
    fn format_human_readable(&self, output: &StatsOutput) -> String {
        let mut lines = Vec::new();
        lines.push(format!("=== flipdeck progress ({}) ===\n", output.key));

        lines.push(format!(
            "Cards: {} | Learned: {} | Learning: {} | New: {}",
            output.total, output.learned, output.learning, output.new
        ));
        lines.push(format!(
            "Mastered: {:.1}% (learned after {} net correct answers)",
            output.learned_ratio * 100.0,
            output.learned_threshold
        ));
        lines.push(format!(
            "Selected: {} | In queue: {}",
            output.selected, output.queued
        ));
        lines.push(String::new());

        lines.join("\n")
    }
}
