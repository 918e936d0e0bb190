//! Ingestion domain - the scrape, dedup, persist and deliver workflow.

pub mod actions;
pub mod coordinator;
pub mod types;

pub use coordinator::{RunCoordinator, RunSettings};
pub use types::{RetryOutcome, RunError, RunOutcome, RunStatus, RunSummary};
