//! Structured run events.
//!
//! The engine emits these as data through an injected [`EventSink`];
//! presentation (log lines, progress bars, JSON output) is the caller's
//! concern.

use crate::migration_id::MigrationId;
use serde::Serialize;
use std::fmt;

/// Direction of a migration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
        }
    }
}

/// A notification emitted by the runner during a run.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MigrationEvent {
    /// A run found work to do and is about to execute it.
    RunStarted { direction: Direction, pending: usize },
    /// A migration's transaction is about to begin.
    MigrationStarted {
        direction: Direction,
        id: MigrationId,
        description: String,
    },
    /// A migration committed in the forward direction.
    MigrationApplied { id: MigrationId, duration_ms: u64 },
    /// A migration committed in the backward direction.
    MigrationReverted { id: MigrationId, duration_ms: u64 },
    /// A migration failed; its transaction was rolled back.
    MigrationFailed {
        direction: Direction,
        id: MigrationId,
        error: String,
    },
    /// Upgrade requested but nothing is pending.
    NothingToApply,
    /// Downgrade requested but nothing is applied.
    NothingToRevert,
    /// A cancellation request took effect between migrations.
    RunCancelled { remaining: usize },
    /// All planned migrations executed.
    RunCompleted { direction: Direction, executed: usize },
}

/// Receiver for run events.
pub trait EventSink {
    fn emit(&self, event: &MigrationEvent);
}

/// Sink that discards every event.
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: &MigrationEvent) {}
}

/// Sink that forwards events to the `log` facade, for callers that want
/// plain log lines instead of structured handling.
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&self, event: &MigrationEvent) {
        match event {
            MigrationEvent::RunStarted { direction, pending } => {
                log::info!("Running {} migrations ({})", pending, direction)
            }
            MigrationEvent::MigrationStarted {
                direction,
                id,
                description,
            } => log::info!("Migration {} ({}): {}", id, direction, description),
            MigrationEvent::MigrationApplied { id, duration_ms } => {
                log::info!("Applied {} in {}ms", id, duration_ms)
            }
            MigrationEvent::MigrationReverted { id, duration_ms } => {
                log::info!("Reverted {} in {}ms", id, duration_ms)
            }
            MigrationEvent::MigrationFailed {
                direction,
                id,
                error,
            } => log::error!("Migration {} failed during {}: {}", id, direction, error),
            MigrationEvent::NothingToApply => log::info!("No migrations to apply"),
            MigrationEvent::NothingToRevert => log::info!("No migrations to revert"),
            MigrationEvent::RunCancelled { remaining } => {
                log::warn!("Run cancelled with {} migrations remaining", remaining)
            }
            MigrationEvent::RunCompleted {
                direction,
                executed,
            } => log::info!("Run complete: {} migrations ({})", executed, direction),
        }
    }
}

impl<F> EventSink for F
where
    F: Fn(&MigrationEvent),
{
    fn emit(&self, event: &MigrationEvent) {
        self(event)
    }
}
