//! Run reporting types.

use chrono::{DateTime, Utc};
use qs_core::event::Direction;
use qs_core::migration_id::MigrationId;
use serde::Serialize;
use uuid::Uuid;

/// Summary of a single upgrade or downgrade run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Unique identifier for this run
    pub run_id: String,

    /// Which direction the run executed in
    pub direction: Direction,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// Migrations executed, in execution order
    pub executed: Vec<ExecutedMigration>,

    /// Terminal state of the run
    pub outcome: RunOutcome,
}

/// A migration executed during a run.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutedMigration {
    /// Migration id
    pub id: MigrationId,

    /// When the migration's transaction committed
    pub completed_at: DateTime<Utc>,

    /// How long the migration took (in milliseconds)
    pub duration_ms: u64,
}

/// Terminal state of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// All planned migrations executed
    Completed,
    /// No pending (or applied) migrations matched the request
    NothingToDo,
    /// A cancellation request took effect between migrations
    Cancelled,
}

impl RunReport {
    pub(crate) fn started(direction: Direction) -> Self {
        Self {
            run_id: Uuid::new_v4().to_string()[..8].to_string(),
            direction,
            started_at: Utc::now(),
            executed: Vec::new(),
            outcome: RunOutcome::Completed,
        }
    }
}

impl std::fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunOutcome::Completed => write!(f, "completed"),
            RunOutcome::NothingToDo => write!(f, "nothing_to_do"),
            RunOutcome::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_serializes() {
        let mut report = RunReport::started(Direction::Up);
        report.executed.push(ExecutedMigration {
            id: MigrationId::new("001_create_users"),
            completed_at: Utc::now(),
            duration_ms: 3,
        });

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains(r#""direction":"up""#));
        assert!(json.contains(r#""outcome":"completed""#));
        assert!(json.contains("001_create_users"));
    }

    #[test]
    fn test_run_id_is_short() {
        let report = RunReport::started(Direction::Down);
        assert_eq!(report.run_id.len(), 8);
    }
}
