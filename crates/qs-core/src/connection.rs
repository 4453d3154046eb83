//! Connection seam between the engine and a database backend.

use crate::error::DbResult;

/// Statement-execution handle passed to migration operations.
///
/// No transaction control lives here: the runner owns the transaction
/// boundary, and a migration can only execute statements inside it.
pub trait DbHandle {
    /// Execute a single SQL statement, returning the number of affected rows.
    fn execute(&self, sql: &str) -> DbResult<usize>;

    /// Execute multiple SQL statements.
    fn execute_batch(&self, sql: &str) -> DbResult<()>;

    /// Execute a query, returning rows of stringly-typed values.
    ///
    /// Columns must decode to text, booleans, or numerics; anything else
    /// (timestamps included) should be cast to VARCHAR in the query.
    fn query_rows(&self, sql: &str) -> DbResult<Vec<Vec<Option<String>>>>;
}

/// Full database handle held by the runner: statement execution plus
/// transaction control.
pub trait Database: DbHandle {
    /// Begin a transaction.
    fn begin(&self) -> DbResult<()>;

    /// Commit the active transaction.
    fn commit(&self) -> DbResult<()>;

    /// Roll back the active transaction.
    fn rollback(&self) -> DbResult<()>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}
