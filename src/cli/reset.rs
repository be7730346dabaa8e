//! Reset command: wipe progress and start over from the deck.

use serde::Serialize;

use crate::core::{Confirmation, StudySession};
use crate::deck::DeckSource;
use crate::error::FlipdeckError;
use crate::storage::SnapshotStore;

/// Options for the reset command.
#[derive(Debug, Clone, Default)]
pub struct ResetOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// The user confirmed with `--yes`.
    pub yes: bool,
}

/// Output format for the reset command.
#[derive(Debug, Clone, Serialize)]
pub struct ResetOutput {
    pub success: bool,
    /// Cards after the reset.
    pub cards: usize,
    /// The reset was refused for lack of confirmation.
    pub needs_confirmation: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The reset command implementation.
pub struct ResetCommand<'a, S: SnapshotStore, D: DeckSource> {
    session: &'a mut StudySession<S, D>,
}

impl<'a, S: SnapshotStore, D: DeckSource> ResetCommand<'a, S, D> {
    pub fn new(session: &'a mut StudySession<S, D>) -> Self {
        Self { session }
    }

    pub fn run(&mut self, options: &ResetOptions) -> ResetOutput {
        match self.session.reset_progress(Confirmation::from(options.yes)) {
            Ok(()) => ResetOutput {
                success: true,
                cards: self.session.cards().len(),
                needs_confirmation: false,
                error: None,
            },
            Err(e) => ResetOutput {
                success: false,
                cards: self.session.cards().len(),
                needs_confirmation: matches!(e, FlipdeckError::ConfirmationRequired { .. }),
                error: Some(e.to_string()),
            },
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &ResetOutput, options: &ResetOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            return serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string());
        }

        if output.success {
            format!(
                "Progress reset. {} card(s) back to new, all selected.\n",
                output.cards
            )
        } else if output.needs_confirmation {
            "This erases all progress. Re-run with --yes to confirm.\n".to_string()
        } else {
            format!(
                "Reset failed: {}\n",
                output.error.as_deref().unwrap_or("unknown error")
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::test_support::open_session;

    #[test]
    fn test_reset_without_yes_is_refused() {
        let (_store, mut session) = open_session(3);
        session.mark_known().unwrap();
        let mut cmd = ResetCommand::new(&mut session);

        let options = ResetOptions::default();
        let output = cmd.run(&options);

        assert!(!output.success);
        assert!(output.needs_confirmation);
        assert!(cmd.format_output(&output, &options).contains("--yes"));
        assert_eq!(session.cards().get(0).unwrap().know_count, 1);
    }

    #[test]
    fn test_reset_with_yes() {
        let (_store, mut session) = open_session(3);
        session.mark_known().unwrap();
        let mut cmd = ResetCommand::new(&mut session);

        let options = ResetOptions {
            yes: true,
            ..Default::default()
        };
        let output = cmd.run(&options);

        assert!(output.success);
        assert_eq!(output.cards, 3);
        assert!(cmd
            .format_output(&output, &options)
            .contains("Progress reset. 3 card(s)"));
        assert_eq!(session.cards().get(0).unwrap().know_count, 0);
    }
}
