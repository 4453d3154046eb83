//! Migration orchestration: planning, transaction boundaries, failure policy.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use qs_core::config::MigrateConfig;
use qs_core::connection::Database;
use qs_core::discovery::MigrationSet;
use qs_core::event::{Direction, EventSink, MigrationEvent, NullSink};
use qs_core::migration::Migration;
use qs_core::migration_id::MigrationId;

use crate::error::{EngineError, EngineResult};
use crate::history::{HistoryStore, MigrationRecord};
use crate::report::{ExecutedMigration, RunOutcome, RunReport};

/// Behavior switches for a runner.
#[derive(Debug, Clone)]
pub struct RunnerOptions {
    /// Name of the history table
    pub history_table: String,

    /// Tolerate history entries with no discovered module
    pub allow_orphaned_history: bool,

    /// Verify recorded checksums against discovered modules before upgrading
    pub verify_checksums: bool,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            history_table: crate::history::DEFAULT_HISTORY_TABLE.to_string(),
            allow_orphaned_history: false,
            verify_checksums: true,
        }
    }
}

impl From<&MigrateConfig> for RunnerOptions {
    fn from(config: &MigrateConfig) -> Self {
        Self {
            history_table: config.history_table.clone(),
            allow_orphaned_history: config.allow_orphaned_history,
            verify_checksums: config.verify_checksums,
        }
    }
}

/// How far a downgrade should go.
#[derive(Debug, Clone)]
pub enum Downgrade {
    /// Revert applied migrations strictly newer than the given id
    To(MigrationId),
    /// Revert the n most recently applied migrations
    Last(usize),
    /// Revert every applied migration
    All,
}

/// Orchestrates upgrade and downgrade runs over one database handle.
///
/// The runner owns every transaction boundary: each migration executes in
/// its own transaction together with its history record, so the two commit
/// or roll back as one. On failure the run stops and already-committed
/// migrations stay committed.
pub struct Runner<'a> {
    db: &'a dyn Database,
    set: MigrationSet,
    history: HistoryStore,
    options: RunnerOptions,
    sink: Box<dyn EventSink + 'a>,
    cancel: Option<Arc<AtomicBool>>,
}

impl<'a> Runner<'a> {
    pub fn new(db: &'a dyn Database, set: MigrationSet) -> Self {
        Self {
            db,
            set,
            history: HistoryStore::default(),
            options: RunnerOptions::default(),
            sink: Box::new(NullSink),
            cancel: None,
        }
    }

    /// Replace the default options. Fails if the history table name is not
    /// a plain SQL identifier.
    pub fn with_options(mut self, options: RunnerOptions) -> EngineResult<Self> {
        self.history = HistoryStore::new(options.history_table.as_str())?;
        self.options = options;
        Ok(self)
    }

    /// Install an event sink. Closures over `&MigrationEvent` qualify.
    pub fn with_event_sink(mut self, sink: impl EventSink + 'a) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Install a cancellation flag, checked only between migrations.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Apply pending migrations in ascending order, optionally stopping at
    /// `target` (inclusive).
    pub fn upgrade(&self, target: Option<&MigrationId>) -> EngineResult<RunReport> {
        let mut report = RunReport::started(Direction::Up);

        self.history.ensure_exists(self.db)?;
        let applied = self.history.list_applied(self.db)?;
        self.check_orphans(&applied)?;
        if self.options.verify_checksums {
            self.verify_checksums(&applied)?;
        }
        if let Some(target) = target {
            self.validate_upgrade_target(target, &applied)?;
        }

        let pending: Vec<&dyn Migration> = self
            .set
            .iter()
            .filter(|m| !applied.iter().any(|r| r.id == *m.id()))
            .filter(|m| target.is_none_or(|t| m.id() <= t))
            .collect();

        if pending.is_empty() {
            match target {
                Some(target) if applied.iter().any(|r| r.id == *target) => {
                    log::info!("Database already at target {}, no upgrade needed", target)
                }
                _ => log::info!("No migrations to apply"),
            }
            self.sink.emit(&MigrationEvent::NothingToApply);
            report.outcome = RunOutcome::NothingToDo;
            return Ok(report);
        }

        self.sink.emit(&MigrationEvent::RunStarted {
            direction: Direction::Up,
            pending: pending.len(),
        });

        for (position, module) in pending.iter().enumerate() {
            if self.cancelled() {
                self.sink.emit(&MigrationEvent::RunCancelled {
                    remaining: pending.len() - position,
                });
                report.outcome = RunOutcome::Cancelled;
                return Ok(report);
            }
            self.run_one(*module, Direction::Up, &mut report)?;
        }

        self.sink.emit(&MigrationEvent::RunCompleted {
            direction: Direction::Up,
            executed: report.executed.len(),
        });
        Ok(report)
    }

    /// Revert applied migrations newest-first, as far as `plan` asks.
    pub fn downgrade(&self, plan: Downgrade) -> EngineResult<RunReport> {
        let mut report = RunReport::started(Direction::Down);

        self.history.ensure_exists(self.db)?;
        let mut applied = self.history.list_applied(self.db)?;

        if applied.is_empty() {
            log::info!("No migrations to revert");
            self.sink.emit(&MigrationEvent::NothingToRevert);
            report.outcome = RunOutcome::NothingToDo;
            return Ok(report);
        }

        self.check_orphans(&applied)?;

        // Newest-first: later schema may depend on earlier, still-applied
        // changes until it is itself reverted.
        applied.reverse();

        let selected: Vec<&MigrationRecord> = match &plan {
            Downgrade::All => applied.iter().collect(),
            Downgrade::Last(n) => applied.iter().take(*n).collect(),
            Downgrade::To(target) => {
                if self.set.get(target).is_none() {
                    return Err(EngineError::UnknownTarget { id: target.clone() });
                }
                let newest = &applied[0].id;
                if target > newest {
                    return Err(EngineError::TargetNotApplied {
                        target: target.clone(),
                        latest: newest.clone(),
                    });
                }
                applied.iter().take_while(|r| r.id > *target).collect()
            }
        };

        if selected.is_empty() {
            log::info!("No migrations to revert");
            self.sink.emit(&MigrationEvent::NothingToRevert);
            report.outcome = RunOutcome::NothingToDo;
            return Ok(report);
        }

        // Even in orphan-tolerant mode a revert needs the module: there is
        // no down operation to run without it.
        if let Some(orphan) = selected.iter().find(|r| self.set.get(&r.id).is_none()) {
            return Err(EngineError::OrphanedHistory {
                ids: vec![orphan.id.clone()],
            });
        }

        self.sink.emit(&MigrationEvent::RunStarted {
            direction: Direction::Down,
            pending: selected.len(),
        });

        for (position, record) in selected.iter().enumerate() {
            if self.cancelled() {
                self.sink.emit(&MigrationEvent::RunCancelled {
                    remaining: selected.len() - position,
                });
                report.outcome = RunOutcome::Cancelled;
                return Ok(report);
            }
            let module = self
                .set
                .get(&record.id)
                .ok_or_else(|| EngineError::OrphanedHistory {
                    ids: vec![record.id.clone()],
                })?;
            self.run_one(module, Direction::Down, &mut report)?;
        }

        self.sink.emit(&MigrationEvent::RunCompleted {
            direction: Direction::Down,
            executed: report.executed.len(),
        });
        Ok(report)
    }

    /// Execute one migration and its history record in a single transaction.
    fn run_one(
        &self,
        module: &dyn Migration,
        direction: Direction,
        report: &mut RunReport,
    ) -> EngineResult<()> {
        let id = module.id().clone();
        self.sink.emit(&MigrationEvent::MigrationStarted {
            direction,
            id: id.clone(),
            description: module.description().to_string(),
        });

        let start = Instant::now();
        let result = self.in_transaction(|| {
            match direction {
                Direction::Up => {
                    module
                        .up(self.db)
                        .map_err(|source| EngineError::ExecutionFailed {
                            id: id.clone(),
                            direction,
                            source,
                        })?;
                    self.history
                        .record_applied(self.db, &id, module.checksum().as_deref())?;
                }
                Direction::Down => {
                    module
                        .down(self.db)
                        .map_err(|source| EngineError::ExecutionFailed {
                            id: id.clone(),
                            direction,
                            source,
                        })?;
                    self.history.record_reverted(self.db, &id)?;
                }
            }
            Ok(())
        });

        match result {
            Ok(()) => {
                let duration_ms = start.elapsed().as_millis() as u64;
                let event = match direction {
                    Direction::Up => MigrationEvent::MigrationApplied {
                        id: id.clone(),
                        duration_ms,
                    },
                    Direction::Down => MigrationEvent::MigrationReverted {
                        id: id.clone(),
                        duration_ms,
                    },
                };
                self.sink.emit(&event);
                report.executed.push(ExecutedMigration {
                    id,
                    completed_at: Utc::now(),
                    duration_ms,
                });
                Ok(())
            }
            Err(error) => {
                self.sink.emit(&MigrationEvent::MigrationFailed {
                    direction,
                    id,
                    error: error.to_string(),
                });
                Err(error)
            }
        }
    }

    /// Begin, run, and commit; roll back on any error.
    fn in_transaction<T>(&self, f: impl FnOnce() -> EngineResult<T>) -> EngineResult<T> {
        self.db.begin()?;
        match f() {
            Ok(value) => {
                self.db.commit()?;
                Ok(value)
            }
            Err(error) => {
                if let Err(rollback_error) = self.db.rollback() {
                    log::error!("Rollback failed after migration error: {}", rollback_error);
                }
                Err(error)
            }
        }
    }

    fn check_orphans(&self, applied: &[MigrationRecord]) -> EngineResult<()> {
        let orphans: Vec<MigrationId> = applied
            .iter()
            .filter(|r| self.set.get(&r.id).is_none())
            .map(|r| r.id.clone())
            .collect();
        if orphans.is_empty() {
            return Ok(());
        }
        if self.options.allow_orphaned_history {
            log::warn!(
                "Ignoring {} history entries unknown to discovery",
                orphans.len()
            );
            return Ok(());
        }
        Err(EngineError::OrphanedHistory { ids: orphans })
    }

    fn verify_checksums(&self, applied: &[MigrationRecord]) -> EngineResult<()> {
        for record in applied {
            let Some(module) = self.set.get(&record.id) else {
                continue;
            };
            if let (Some(recorded), Some(computed)) = (record.checksum.as_ref(), module.checksum())
            {
                if *recorded != computed {
                    return Err(EngineError::ChecksumMismatch {
                        id: record.id.clone(),
                        recorded: recorded.clone(),
                        computed,
                    });
                }
            }
        }
        Ok(())
    }

    fn validate_upgrade_target(
        &self,
        target: &MigrationId,
        applied: &[MigrationRecord],
    ) -> EngineResult<()> {
        if self.set.get(target).is_none() {
            return Err(EngineError::UnknownTarget { id: target.clone() });
        }
        if let Some(latest) = applied.iter().map(|r| &r.id).max() {
            if target < latest {
                return Err(EngineError::TargetBehindApplied {
                    target: target.clone(),
                    latest: latest.clone(),
                });
            }
        }
        Ok(())
    }

    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod runner_test;
