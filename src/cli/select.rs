//! Selection commands: select, select-all, deselect-all, filter.

use serde::Serialize;

use crate::core::{RebuildSummary, StudySession};
use crate::deck::DeckSource;
use crate::error::Result;
use crate::storage::SnapshotStore;

/// How to change the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectAction {
    /// Toggle one card.
    Toggle(u32),
    All,
    None,
    /// Keep exactly the learned cards.
    Learned,
    /// Keep exactly the new and learning cards.
    Unlearned,
}

/// Options for the selection commands.
#[derive(Debug, Clone, Default)]
pub struct SelectOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Output format for the selection commands.
#[derive(Debug, Clone, Serialize)]
pub struct SelectOutput {
    pub success: bool,
    /// For a toggle: whether the card is selected afterwards. Absent for an
    /// unknown card id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toggled: Option<ToggleInfo>,
    pub selected: usize,
    /// Ids dropped from the queue.
    pub removed: usize,
    /// Ids appended to the queue.
    pub added: usize,
    pub queue_len: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ToggleInfo {
    pub card_id: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<bool>,
}

impl SelectOutput {
    /// Create a failed output.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            toggled: None,
            selected: 0,
            removed: 0,
            added: 0,
            queue_len: 0,
            error: Some(error.into()),
        }
    }
}

/// The selection command implementation.
pub struct SelectCommand<'a, S: SnapshotStore, D: DeckSource> {
    session: &'a mut StudySession<S, D>,
}

impl<'a, S: SnapshotStore, D: DeckSource> SelectCommand<'a, S, D> {
    /// Create a new selection command.
    pub fn new(session: &'a mut StudySession<S, D>) -> Self {
        Self { session }
    }

    /// Run the selection change.
    pub fn run(&mut self, action: SelectAction) -> SelectOutput {
        match self.apply(action) {
            Ok((toggled, summary)) => SelectOutput {
                success: true,
                toggled,
                selected: self.session.selection().len(),
                removed: summary.removed,
                added: summary.added,
                queue_len: self.session.queue_len(),
                error: None,
            },
            Err(e) => SelectOutput::failure(e.to_string()),
        }
    }

    fn apply(&mut self, action: SelectAction) -> Result<(Option<ToggleInfo>, RebuildSummary)> {
        let session = &mut *self.session;
        match action {
            SelectAction::Toggle(card_id) => {
                let queue_before = session.queue_len();
                let selected = session.toggle_select(card_id)?;
                let queue_after = session.queue_len();
                let summary = RebuildSummary {
                    removed: queue_before.saturating_sub(queue_after),
                    added: queue_after.saturating_sub(queue_before),
                };
                Ok((Some(ToggleInfo { card_id, selected }), summary))
            }
            SelectAction::All => Ok((None, session.select_all()?)),
            SelectAction::None => Ok((None, session.deselect_all()?)),
            SelectAction::Learned => Ok((None, session.filter_learned()?)),
            SelectAction::Unlearned => Ok((None, session.filter_unlearned()?)),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &SelectOutput, options: &SelectOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            self.format_human_readable(output)
        }
    }

    fn format_human_readable(&self, output: &SelectOutput) -> String {
        if !output.success {
            return format!(
                "Select failed: {}\n",
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        let mut lines = Vec::new();
        if let Some(toggled) = output.toggled {
            lines.push(match toggled.selected {
                Some(true) => format!("Card {} selected.", toggled.card_id),
                Some(false) => format!("Card {} deselected.", toggled.card_id),
                None => format!("No card with id {}.", toggled.card_id),
            });
        }
        lines.push(format!(
            "{} card(s) selected, {} in queue (+{} / -{}).",
            output.selected, output.queue_len, output.added, output.removed
        ));
        lines.push(String::new());
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::test_support::open_session;

    #[test]
    fn test_toggle_off_and_on() {
        let (_store, mut session) = open_session(3);
        let mut cmd = SelectCommand::new(&mut session);

        let off = cmd.run(SelectAction::Toggle(1));
        assert!(off.success);
        assert_eq!(off.toggled.unwrap().selected, Some(false));
        assert_eq!(off.selected, 2);
        assert_eq!(off.removed, 1);

        let on = cmd.run(SelectAction::Toggle(1));
        assert_eq!(on.toggled.unwrap().selected, Some(true));
        assert_eq!(on.added, 1);
        assert_eq!(on.queue_len, 3);
    }

    #[test]
    fn test_toggle_unknown_card() {
        let (_store, mut session) = open_session(2);
        let mut cmd = SelectCommand::new(&mut session);

        let output = cmd.run(SelectAction::Toggle(99));

        assert!(output.success);
        assert_eq!(output.toggled.unwrap().selected, None);
        let formatted = cmd.format_output(&output, &SelectOptions::default());
        assert!(formatted.contains("No card with id 99."));
    }

    #[test]
    fn test_deselect_and_select_all() {
        let (_store, mut session) = open_session(3);
        let mut cmd = SelectCommand::new(&mut session);

        let none = cmd.run(SelectAction::None);
        assert_eq!(none.selected, 0);
        assert_eq!(none.removed, 3);
        assert_eq!(none.queue_len, 0);

        let all = cmd.run(SelectAction::All);
        assert_eq!(all.selected, 3);
        assert_eq!(all.added, 3);
    }

    #[test]
    fn test_filter_learned_on_fresh_deck_is_empty() {
        let (_store, mut session) = open_session(3);
        let mut cmd = SelectCommand::new(&mut session);

        let output = cmd.run(SelectAction::Learned);
        assert_eq!(output.selected, 0);

        let output = cmd.run(SelectAction::Unlearned);
        assert_eq!(output.selected, 3);
        assert_eq!(output.queue_len, 3);
    }

    #[test]
    fn test_format_output_human_readable() {
        let (_store, mut session) = open_session(3);
        let mut cmd = SelectCommand::new(&mut session);

        let output = cmd.run(SelectAction::Toggle(0));
        let formatted = cmd.format_output(&output, &SelectOptions::default());

        assert!(formatted.contains("Card 0 deselected."));
        assert!(formatted.contains("2 card(s) selected, 2 in queue (+0 / -1)."));
    }

    #[test]
    fn test_format_output_json() {
        let (_store, mut session) = open_session(2);
        let mut cmd = SelectCommand::new(&mut session);

        let output = cmd.run(SelectAction::None);
        let formatted = cmd.format_output(
            &output,
            &SelectOptions {
                json: true,
                ..Default::default()
            },
        );
        assert!(formatted.contains("\"selected\": 0"));
        assert!(!formatted.contains("toggled"));
    }
}
