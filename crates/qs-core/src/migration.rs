//! The migration contract and the SQL-script implementation.

use crate::checksum::script_pair_checksum;
use crate::connection::DbHandle;
use crate::error::DbResult;
use crate::migration_id::MigrationId;

/// A single reversible unit of schema or data change.
///
/// Implementations receive an already-open handle bound to the runner's
/// active transaction. The handle offers statement execution only, so a
/// migration cannot begin, commit, or roll back on its own. The engine
/// guarantees each operation executes at most once per direction per
/// applied/unapplied transition; operations themselves need not be
/// idempotent.
pub trait Migration {
    /// Unique, sortable identifier.
    fn id(&self) -> &MigrationId;

    /// Human-readable summary of the change.
    fn description(&self) -> &str;

    /// Apply the change (forward direction).
    fn up(&self, conn: &dyn DbHandle) -> DbResult<()>;

    /// Revert the change (backward direction).
    fn down(&self, conn: &dyn DbHandle) -> DbResult<()>;

    /// Fingerprint of the migration definition, recorded in history when
    /// present and verified on later runs.
    fn checksum(&self) -> Option<String> {
        None
    }
}

/// A migration defined by a pair of SQL scripts.
pub struct SqlMigration {
    id: MigrationId,
    description: String,
    up_sql: String,
    down_sql: String,
}

impl SqlMigration {
    /// Create a migration from up/down SQL scripts. The description
    /// defaults to the name portion of the id.
    pub fn new(id: MigrationId, up_sql: impl Into<String>, down_sql: impl Into<String>) -> Self {
        let description = id.name().to_string();
        Self {
            id,
            description,
            up_sql: up_sql.into(),
            down_sql: down_sql.into(),
        }
    }

    /// Replace the default description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl Migration for SqlMigration {
    fn id(&self) -> &MigrationId {
        &self.id
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn up(&self, conn: &dyn DbHandle) -> DbResult<()> {
        conn.execute_batch(&self.up_sql)
    }

    fn down(&self, conn: &dyn DbHandle) -> DbResult<()> {
        conn.execute_batch(&self.down_sql)
    }

    fn checksum(&self) -> Option<String> {
        Some(script_pair_checksum(&self.up_sql, &self.down_sql))
    }
}
