//! List command for flipdeck.
//!
//! Lists cards with their status, selection and queue position.

use serde::Serialize;

use crate::core::{Card, CardStatus, StudySession};
use crate::deck::DeckSource;
use crate::storage::SnapshotStore;

/// Options for the list command.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Only cards with this status.
    pub status: Option<CardStatus>,
    /// Only selected cards.
    pub selected_only: bool,
    /// Maximum number of results.
    pub limit: Option<usize>,
}

/// Output format for the list command.
#[derive(Debug, Clone, Serialize)]
pub struct ListOutput {
    pub success: bool,
    /// Number of cards listed.
    pub count: usize,
    pub cards: Vec<CardRow>,
}

/// One listed card.
#[derive(Debug, Clone, Serialize)]
pub struct CardRow {
    pub id: u32,
    pub question: String,
    pub status: String,
    pub know_count: u32,
    pub progress: String,
    pub selected: bool,
    /// 1-based queue position, absent when not queued.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_position: Option<usize>,
}

/// The list command implementation.
pub struct ListCommand<'a, S: SnapshotStore, D: DeckSource> {
    session: &'a StudySession<S, D>,
}

impl<'a, S: SnapshotStore, D: DeckSource> ListCommand<'a, S, D> {
    /// Create a new list command.
    pub fn new(session: &'a StudySession<S, D>) -> Self {
        Self { session }
    }

    /// Run the list command.
    pub fn run(&self, options: &ListOptions) -> ListOutput {
        let selection = self.session.selection();
        let threshold = self.session.mastery_policy().learned_threshold;

        let mut cards: Vec<CardRow> = self
            .session
            .cards()
            .cards()
            .iter()
            .filter(|c| options.status.is_none_or(|s| c.status == s))
            .filter(|c| !options.selected_only || selection.contains(c.id))
            .map(|c| self.row(c, threshold))
            .collect();

        if let Some(limit) = options.limit {
            cards.truncate(limit);
        }

        ListOutput {
            success: true,
            count: cards.len(),
            cards,
        }
    }

    fn row(&self, card: &Card, threshold: u32) -> CardRow {
        CardRow {
            id: card.id,
            question: card.question.clone(),
            status: card.status.label().to_string(),
            know_count: card.know_count,
            progress: card.progress_label(threshold),
            selected: self.session.selection().contains(card.id),
            queue_position: self.session.queue().position(card.id).map(|p| p + 1),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &ListOutput, options: &ListOptions) -> String {
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
    fn format_human_readable(&self, output: &ListOutput) -> String {
        if output.cards.is_empty() {
            return "No cards found.\n".to_string();
        }

        let mut lines = Vec::new();
        lines.push(format!("Found {} card(s):\n", output.count));

        for card in &output.cards {
            let mark = if card.selected { "[x]" } else { "[ ]" };
            let queued = card
                .queue_position
                .map(|p| format!(" #{}", p))
                .unwrap_or_default();
            lines.push(format!(
                "{} {:>3}  {:<8} {:>4}{}  {}",
                mark, card.id, card.status, card.progress, queued, card.question
            ));
        }
        lines.push(String::new());

        lines.join("\n")
    }
}
