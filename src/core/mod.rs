//! Core types and logic for flipdeck.
//!
//! Cards and their mastery rules, the selection, the study queue scheduler,
//! the persisted snapshot, and the session that ties them together.

pub mod card;
pub mod queue;
pub mod selection;
pub mod session;
pub mod snapshot;
pub mod store;

pub use card::{Card, CardStatus, MasteryPolicy, LEARNED_THRESHOLD};
pub use queue::{Graduation, Placement, RebuildOrder, RebuildSummary, ReinsertPolicy, StudyQueue};
pub use selection::Selection;
pub use session::{Confirmation, CurrentView, ReviewOutcome, SessionPhase, StudySession};
pub use snapshot::{Snapshot, SNAPSHOT_SCHEMA_VERSION};
pub use store::{CardStats, CardStore, ReviewRecord};
