//! qs-engine - Migration runner for Quackstep
//!
//! This crate owns the persisted history ledger, per-migration transaction
//! boundaries, and the fail-fast failure policy. Outcomes surface as
//! structured events and a serializable run report.

pub mod error;
pub mod history;
pub mod report;
pub mod runner;

pub use error::{EngineError, EngineResult};
pub use history::{HistoryError, HistoryStore, MigrationRecord, DEFAULT_HISTORY_TABLE};
pub use report::{ExecutedMigration, RunOutcome, RunReport};
pub use runner::{Downgrade, Runner, RunnerOptions};
