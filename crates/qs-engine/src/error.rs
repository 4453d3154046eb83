//! Error types for qs-engine

use crate::history::HistoryError;
use qs_core::error::{DbError, DiscoveryError};
use qs_core::event::Direction;
use qs_core::migration_id::MigrationId;
use thiserror::Error;

/// Runner error type for Quackstep
#[derive(Error, Debug)]
pub enum EngineError {
    /// R001: A migration's operation failed; its transaction was rolled back
    #[error("[R001] Migration {id} failed during {direction}: {source}")]
    ExecutionFailed {
        id: MigrationId,
        direction: Direction,
        #[source]
        source: DbError,
    },

    /// R002: History rows with no discovered module
    #[error("[R002] History contains migrations unknown to discovery: {}", join_ids(.ids))]
    OrphanedHistory { ids: Vec<MigrationId> },

    /// R003: An applied migration's definition changed since it was recorded
    #[error("[R003] Checksum mismatch for applied migration {id}: recorded {recorded}, computed {computed}")]
    ChecksumMismatch {
        id: MigrationId,
        recorded: String,
        computed: String,
    },

    /// R004: Target id is not in the discovered set
    #[error("[R004] Target migration not found: {id}")]
    UnknownTarget { id: MigrationId },

    /// R005: Upgrade target is older than what is already applied
    #[error("[R005] Upgrade target {target} is older than applied migration {latest}")]
    TargetBehindApplied {
        target: MigrationId,
        latest: MigrationId,
    },

    /// R006: Downgrade target is newer than what is applied
    #[error("[R006] Downgrade target {target} has not been applied (newest applied: {latest})")]
    TargetNotApplied {
        target: MigrationId,
        latest: MigrationId,
    },

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    History(#[from] HistoryError),

    /// Transaction control or other database failure outside a module's operation
    #[error(transparent)]
    Db(#[from] DbError),
}

fn join_ids(ids: &[MigrationId]) -> String {
    ids.iter()
        .map(|id| id.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type alias for EngineError
pub type EngineResult<T> = Result<T, EngineError>;
