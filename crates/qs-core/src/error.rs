//! Error types for qs-core

use crate::migration_id::MigrationId;
use thiserror::Error;

/// Discovery errors, raised before any database access.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// M001: Two modules share a migration version
    #[error("[M001] Duplicate migration version {version}: '{first}' and '{second}'", version = .first.version())]
    DuplicateId {
        first: MigrationId,
        second: MigrationId,
    },

    /// M002: Migration id does not parse as NNN_name
    #[error("[M002] Malformed migration id '{name}': {reason}")]
    MalformedId { name: String, reason: String },

    /// M003: Migration is missing one of its required operations
    #[error("[M003] Migration '{id}' has no {missing} script")]
    MissingOperation { id: String, missing: &'static str },

    /// M004: Migrations directory does not exist
    #[error("[M004] Migrations directory not found: {path}")]
    DirectoryNotFound { path: String },

    /// M005: Migrations path exists but is not a directory
    #[error("[M005] {path} exists but is not a directory")]
    NotADirectory { path: String },

    /// M006: IO error with file path context
    #[error("[M006] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },
}

/// Database operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// D001: Connection error
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// D002: Statement execution error
    #[error("[D002] SQL execution failed: {0}")]
    ExecutionError(String),

    /// D003: Row decoding error
    #[error("[D003] Failed to decode row: {0}")]
    RowDecode(String),

    /// D004: Transaction control error
    #[error("[D004] Transaction control failed: {0}")]
    TransactionError(String),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

/// Configuration file errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// C001: Configuration file not found
    #[error("[C001] Config file not found: {path}")]
    NotFound { path: String },

    /// C002: Failed to parse configuration file
    #[error("[C002] Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// C003: Invalid configuration value
    #[error("[C003] Invalid config: {message}")]
    Invalid { message: String },

    /// C004: IO error
    #[error("[C004] IO error: {0}")]
    Io(#[from] std::io::Error),
}
