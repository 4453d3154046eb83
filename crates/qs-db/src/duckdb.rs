//! DuckDB database backend implementation

use duckdb::Connection;
use qs_core::connection::{Database, DbHandle};
use qs_core::error::{DbError, DbResult};
use std::path::Path;
use std::sync::Mutex;

/// DuckDB database backend
///
/// Wraps a single connection behind a mutex. The engine runs migrations
/// strictly sequentially on one handle; the mutex only guards against
/// accidental cross-thread use.
pub struct DuckDbBackend {
    conn: Mutex<Connection>,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path).map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }
}

/// Read a column value as a String, trying the common DuckDB scalar types.
///
/// Non-VARCHAR columns return an error for `Option<String>`, so we fall
/// through String -> i64 -> f64 -> bool before giving up. NULL decodes to
/// `None` on the first attempt regardless of the declared type.
fn read_column(row: &duckdb::Row<'_>, idx: usize) -> DbResult<Option<String>> {
    if let Ok(s) = row.get::<_, Option<String>>(idx) {
        return Ok(s);
    }
    if let Ok(n) = row.get::<_, Option<i64>>(idx) {
        return Ok(n.map(|v| v.to_string()));
    }
    if let Ok(f) = row.get::<_, Option<f64>>(idx) {
        return Ok(f.map(|v| v.to_string()));
    }
    if let Ok(b) = row.get::<_, Option<bool>>(idx) {
        return Ok(b.map(|v| v.to_string()));
    }
    Err(DbError::RowDecode(format!(
        "column {} has an unsupported type; cast it to VARCHAR in the query",
        idx
    )))
}

impl DbHandle for DuckDbBackend {
    fn execute(&self, sql: &str) -> DbResult<usize> {
        let conn = self.conn.lock().unwrap();
        conn.execute(sql, [])
            .map_err(|e| DbError::ExecutionError(format!("{}: {}", e, sql)))
    }

    fn execute_batch(&self, sql: &str) -> DbResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(sql)
            .map_err(|e| DbError::ExecutionError(e.to_string()))
    }

    fn query_rows(&self, sql: &str) -> DbResult<Vec<Vec<Option<String>>>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| DbError::ExecutionError(e.to_string()))?;

        // Column count is only known per-row: DuckDB panics on
        // stmt.column_count() before execution.
        let mapped = stmt
            .query_map([], |row| {
                let columns = row.as_ref().column_count();
                Ok((0..columns).map(|i| read_column(row, i)).collect::<Vec<_>>())
            })
            .map_err(|e| DbError::ExecutionError(e.to_string()))?;

        let mut out = Vec::new();
        for row in mapped {
            let row = row.map_err(|e| DbError::ExecutionError(e.to_string()))?;
            out.push(row.into_iter().collect::<DbResult<Vec<_>>>()?);
        }
        Ok(out)
    }
}

impl Database for DuckDbBackend {
    fn begin(&self) -> DbResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch("BEGIN TRANSACTION")
            .map_err(|e| DbError::TransactionError(format!("begin: {}", e)))
    }

    fn commit(&self) -> DbResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch("COMMIT")
            .map_err(|e| DbError::TransactionError(format!("commit: {}", e)))
    }

    fn rollback(&self) -> DbResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch("ROLLBACK")
            .map_err(|e| DbError::TransactionError(format!("rollback: {}", e)))
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod duckdb_test;
