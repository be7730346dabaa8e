//! Study commands: show, flip, known, unknown.
//!
//! Each acts on the head of the study queue and reports the card that is
//! current afterwards.

use serde::Serialize;

use crate::core::{Card, CurrentView, Placement, ReviewOutcome, StudySession};
use crate::deck::DeckSource;
use crate::storage::SnapshotStore;

/// Which study action to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudyAction {
    /// Show the current question.
    Show,
    /// Turn the current card over.
    Flip,
    /// Mark the current card known.
    Known,
    /// Mark the current card not known.
    Unknown,
}

impl StudyAction {
    fn name(&self) -> &'static str {
        match self {
            StudyAction::Show => "show",
            StudyAction::Flip => "flip",
            StudyAction::Known => "known",
            StudyAction::Unknown => "unknown",
        }
    }
}

/// Options for the study commands.
#[derive(Debug, Clone, Default)]
pub struct StudyOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// A card as shown to the user.
#[derive(Debug, Clone, Serialize)]
pub struct CardInfo {
    pub id: u32,
    pub question: String,
    /// Present only when the card is flipped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    pub status: String,
    /// `k/threshold`, or a check mark once learned.
    pub progress: String,
}

impl CardInfo {
    fn from_card(card: &Card, threshold: u32) -> Self {
        Self {
            id: card.id,
            question: card.question.clone(),
            answer: card.is_flipped.then(|| card.answer.clone()),
            status: card.status.label().to_string(),
            progress: card.progress_label(threshold),
        }
    }
}

/// What a review did.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewInfo {
    pub card_id: u32,
    pub know_count: u32,
    pub status: String,
    pub placement: Placement,
}

impl From<&ReviewOutcome> for ReviewInfo {
    fn from(outcome: &ReviewOutcome) -> Self {
        Self {
            card_id: outcome.record.card_id,
            know_count: outcome.record.know_count,
            status: outcome.record.status.label().to_string(),
            placement: outcome.placement,
        }
    }
}

/// Output format for the study commands.
#[derive(Debug, Clone, Serialize)]
pub struct StudyOutput {
    /// Whether the action succeeded.
    pub success: bool,
    pub action: String,
    /// `card`, `all_mastered` or `nothing_selected`.
    pub view: String,
    /// The current card after the action.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card: Option<CardInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review: Option<ReviewInfo>,
    pub queue_len: usize,
    /// Error message if the action failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StudyOutput {
    /// Create a failed output.
    pub fn failure(action: StudyAction, error: impl Into<String>) -> Self {
        Self {
            success: false,
            action: action.name().to_string(),
            view: String::new(),
            card: None,
            review: None,
            queue_len: 0,
            error: Some(error.into()),
        }
    }
}

/// The study command implementation.
pub struct StudyCommand<'a, S: SnapshotStore, D: DeckSource> {
    session: &'a mut StudySession<S, D>,
}

impl<'a, S: SnapshotStore, D: DeckSource> StudyCommand<'a, S, D> {
    /// Create a new study command.
    pub fn new(session: &'a mut StudySession<S, D>) -> Self {
        Self { session }
    }

    /// Run one study action.
    pub fn run(&mut self, action: StudyAction) -> StudyOutput {
        let review = match action {
            StudyAction::Show => Ok(None),
            StudyAction::Flip => self.session.flip().map(|_| None),
            StudyAction::Known => self.session.mark_known(),
            StudyAction::Unknown => self.session.mark_unknown(),
        };

        match review {
            Ok(review) => self.output(action, review.as_ref()),
            Err(e) => StudyOutput::failure(action, e.to_string()),
        }
    }

    fn output(&self, action: StudyAction, review: Option<&ReviewOutcome>) -> StudyOutput {
        let threshold = self.session.mastery_policy().learned_threshold;
        let (view, card) = match self.session.current_view() {
            CurrentView::Card(card) => ("card", Some(CardInfo::from_card(card, threshold))),
            CurrentView::AllMastered => ("all_mastered", None),
            CurrentView::NothingSelected => ("nothing_selected", None),
        };

        StudyOutput {
            success: true,
            action: action.name().to_string(),
            view: view.to_string(),
            card,
            review: review.map(ReviewInfo::from),
            queue_len: self.session.queue_len(),
            error: None,
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &StudyOutput, options: &StudyOptions) -> String {
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
    fn format_human_readable(&self, output: &StudyOutput) -> String {
        if !output.success {
            return format!(
                "{} failed: {}\n",
                output.action,
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        let mut lines = Vec::new();

        if let Some(review) = &output.review {
            let verdict = if output.action == "known" {
                "✓ Known"
            } else {
                "✗ Not known"
            };
            let whereabouts = match review.placement {
                Placement::Graduated => "learned, removed from the queue".to_string(),
                Placement::Reinserted(index) => format!("back in the queue at #{}", index + 1),
                Placement::Unchanged => "queue unchanged".to_string(),
            };
            lines.push(format!(
                "{}: card {} ({}, {} known) {}",
                verdict, review.card_id, review.status, review.know_count, whereabouts
            ));
            lines.push(String::new());
        }

        match (output.view.as_str(), &output.card) {
            ("card", Some(card)) => {
                lines.push(format!(
                    "Card {} [{} {}] ({} in queue)",
                    card.id, card.status, card.progress, output.queue_len
                ));
                lines.push(format!("Q: {}", card.question));
                if let Some(answer) = &card.answer {
                    lines.push(format!("A: {}", answer));
                }
            }
            ("all_mastered", _) => {
                lines.push("All selected cards are mastered.".to_string());
                lines.push("Run 'flipdeck rebuild' to study them again.".to_string());
            }
            _ => {
                lines.push("No cards selected.".to_string());
                lines.push("Run 'flipdeck select-all' to pick cards to study.".to_string());
            }
        }

        lines.push(String::new());
        lines.join("\n")
    }
}
