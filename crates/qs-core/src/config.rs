//! Configuration types and parsing for quackstep.yml

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Project configuration from quackstep.yml
///
/// The `database` value is an already-resolved path (or `:memory:`);
/// resolving it against a project layout is the caller's job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MigrateConfig {
    /// Path to the target database file
    pub database: String,

    /// Directories containing migration SQL scripts
    #[serde(default = "default_migration_paths")]
    pub migration_paths: Vec<String>,

    /// Name of the history table
    #[serde(default = "default_history_table")]
    pub history_table: String,

    /// Tolerate history entries with no discovered module
    #[serde(default)]
    pub allow_orphaned_history: bool,

    /// Verify recorded checksums against discovered modules before upgrading
    #[serde(default = "default_true")]
    pub verify_checksums: bool,
}

fn default_migration_paths() -> Vec<String> {
    vec!["migrations".to_string()]
}

fn default_history_table() -> String {
    "schema_migrations".to_string()
}

fn default_true() -> bool {
    true
}

impl MigrateConfig {
    /// Load configuration from a YAML file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let config: MigrateConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.is_empty() {
            return Err(ConfigError::Invalid {
                message: "database must not be empty".to_string(),
            });
        }
        if self.history_table.is_empty() {
            return Err(ConfigError::Invalid {
                message: "history_table must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
