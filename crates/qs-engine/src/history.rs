//! Persisted migration ledger.

use chrono::{DateTime, NaiveDateTime, Utc};
use qs_core::connection::DbHandle;
use qs_core::error::DbError;
use qs_core::migration_id::MigrationId;
use thiserror::Error;

/// Default name of the history table.
pub const DEFAULT_HISTORY_TABLE: &str = "schema_migrations";

// Written and parsed symmetrically; DuckDB renders TIMESTAMP casts in the
// same shape.
const TIMESTAMP_WRITE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";
const TIMESTAMP_READ_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// One applied migration, as recorded in the history table.
#[derive(Debug, Clone)]
pub struct MigrationRecord {
    pub id: MigrationId,
    pub applied_at: DateTime<Utc>,
    pub checksum: Option<String>,
}

/// History table errors
#[derive(Error, Debug)]
pub enum HistoryError {
    /// H001: History table name is not a plain SQL identifier
    #[error("[H001] Invalid history table name: '{name}'")]
    InvalidTableName { name: String },

    /// H002: A history row failed to decode
    #[error("[H002] Corrupt history row: {reason}")]
    Corrupt { reason: String },

    #[error(transparent)]
    Db(#[from] DbError),
}

/// Bookkeeping for applied migrations, persisted in the target database.
///
/// No operation here commits on its own; every statement runs on the
/// caller's handle, inside whatever transaction the runner holds open.
pub struct HistoryStore {
    table: String,
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self {
            table: DEFAULT_HISTORY_TABLE.to_string(),
        }
    }
}

impl HistoryStore {
    /// Create a store over the named history table.
    pub fn new(table: impl Into<String>) -> Result<Self, HistoryError> {
        let table = table.into();
        if !is_sql_identifier(&table) {
            return Err(HistoryError::InvalidTableName { name: table });
        }
        Ok(Self { table })
    }

    /// The history table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Idempotently create the history table; safe to call every run.
    pub fn ensure_exists(&self, db: &dyn DbHandle) -> Result<(), HistoryError> {
        db.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {} (\
             migration_id VARCHAR PRIMARY KEY, \
             applied_at TIMESTAMP NOT NULL, \
             checksum VARCHAR)",
            self.table
        ))?;
        Ok(())
    }

    /// Applied records in application order: by `applied_at`, ties broken
    /// by id.
    pub fn list_applied(&self, db: &dyn DbHandle) -> Result<Vec<MigrationRecord>, HistoryError> {
        let sql = format!(
            "SELECT migration_id, CAST(applied_at AS VARCHAR), checksum \
             FROM {} ORDER BY applied_at, migration_id",
            self.table
        );
        let rows = db.query_rows(&sql)?;
        rows.into_iter().map(decode_record).collect()
    }

    /// Insert the record for a freshly applied migration. Must run inside
    /// the caller's active transaction.
    pub fn record_applied(
        &self,
        db: &dyn DbHandle,
        id: &MigrationId,
        checksum: Option<&str>,
    ) -> Result<(), HistoryError> {
        let applied_at = Utc::now().naive_utc().format(TIMESTAMP_WRITE_FORMAT);
        let checksum_value = match checksum {
            Some(c) => format!("'{}'", c.replace('\'', "''")),
            None => "NULL".to_string(),
        };
        db.execute(&format!(
            "INSERT INTO {} (migration_id, applied_at, checksum) \
             VALUES ('{}', TIMESTAMP '{}', {})",
            self.table,
            id.as_str(),
            applied_at,
            checksum_value
        ))?;
        Ok(())
    }

    /// Delete the record for a reverted migration. Must run inside the
    /// caller's active transaction.
    pub fn record_reverted(&self, db: &dyn DbHandle, id: &MigrationId) -> Result<(), HistoryError> {
        db.execute(&format!(
            "DELETE FROM {} WHERE migration_id = '{}'",
            self.table,
            id.as_str()
        ))?;
        Ok(())
    }
}

fn decode_record(row: Vec<Option<String>>) -> Result<MigrationRecord, HistoryError> {
    let [id, applied_at, checksum] = <[Option<String>; 3]>::try_from(row).map_err(|row| {
        HistoryError::Corrupt {
            reason: format!("expected 3 columns, got {}", row.len()),
        }
    })?;

    let id = id.ok_or_else(|| HistoryError::Corrupt {
        reason: "NULL migration_id".to_string(),
    })?;
    let id = MigrationId::parse(id.as_str()).map_err(|reason| HistoryError::Corrupt {
        reason: format!("bad migration_id '{}': {}", id, reason),
    })?;

    let applied_at = applied_at.ok_or_else(|| HistoryError::Corrupt {
        reason: format!("NULL applied_at for '{}'", id),
    })?;
    let applied_at = NaiveDateTime::parse_from_str(&applied_at, TIMESTAMP_READ_FORMAT)
        .map_err(|e| HistoryError::Corrupt {
            reason: format!("bad applied_at '{}' for '{}': {}", applied_at, id, e),
        })?
        .and_utc();

    Ok(MigrationRecord {
        id,
        applied_at,
        checksum,
    })
}

fn is_sql_identifier(s: &str) -> bool {
    let mut bytes = s.bytes();
    match bytes.next() {
        Some(b) if b.is_ascii_alphabetic() || b == b'_' => {}
        _ => return false,
    }
    bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;
