//! Queue commands: shuffle and rebuild.

use serde::Serialize;

use crate::core::StudySession;
use crate::deck::DeckSource;
use crate::storage::SnapshotStore;

/// What to do with the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueAction {
    /// Randomly permute the current queue.
    Shuffle,
    /// Rebuild from every selected card. `Some(true)` forces a shuffle,
    /// `None` follows the configuration.
    Rebuild { shuffle: Option<bool> },
}

/// Options for the queue commands.
#[derive(Debug, Clone, Default)]
pub struct QueueOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Output format for the queue commands.
#[derive(Debug, Clone, Serialize)]
pub struct QueueOutput {
    pub success: bool,
    pub action: String,
    /// Queue ids, head first.
    pub queue: Vec<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueueOutput {
    /// Create a failed output.
    pub fn failure(action: &str, error: impl Into<String>) -> Self {
        Self {
            success: false,
            action: action.to_string(),
            queue: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// The queue command implementation.
pub struct QueueCommand<'a, S: SnapshotStore, D: DeckSource> {
    session: &'a mut StudySession<S, D>,
}

impl<'a, S: SnapshotStore, D: DeckSource> QueueCommand<'a, S, D> {
    pub fn new(session: &'a mut StudySession<S, D>) -> Self {
        Self { session }
    }

    pub fn run(&mut self, action: QueueAction) -> QueueOutput {
        let (name, result) = match action {
            QueueAction::Shuffle => ("shuffle", self.session.shuffle_queue()),
            QueueAction::Rebuild { shuffle } => ("rebuild", self.session.rebuild_queue(shuffle)),
        };

        match result {
            Ok(()) => QueueOutput {
                success: true,
                action: name.to_string(),
                queue: self.session.queue().ids().to_vec(),
                error: None,
            },
            Err(e) => QueueOutput::failure(name, e.to_string()),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &QueueOutput, options: &QueueOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else if output.success {
            let ids: Vec<String> = output.queue.iter().map(|id| id.to_string()).collect();
            format!(
                "Queue {} ({} card(s)): [{}]\n",
                if output.action == "shuffle" {
                    "shuffled"
                } else {
                    "rebuilt"
                },
                output.queue.len(),
                ids.join(", ")
            )
        } else {
            format!(
                "{} failed: {}\n",
                output.action,
                output.error.as_deref().unwrap_or("unknown error")
            )
        }
    }
}
