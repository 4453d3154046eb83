//! Filesystem migration source: a directory of SQL script pairs.

use crate::discovery::MigrationSource;
use crate::error::DiscoveryError;
use crate::migration::{Migration, SqlMigration};
use crate::migration_id::MigrationId;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const UP_SUFFIX: &str = ".up.sql";
const DOWN_SUFFIX: &str = ".down.sql";

/// Migration source scanning a directory for `NNN_name.up.sql` /
/// `NNN_name.down.sql` pairs.
///
/// Files with any other name are ignored, so a README or editor leftovers
/// next to the scripts are harmless. A script whose stem does not parse as
/// a migration id, or one missing its twin, is a discovery error.
pub struct SqlDirectorySource {
    dir: PathBuf,
}

/// Script paths collected for one migration stem.
#[derive(Default)]
struct ScriptPair {
    up: Option<PathBuf>,
    down: Option<PathBuf>,
}

impl SqlDirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn scan(&self) -> Result<BTreeMap<String, ScriptPair>, DiscoveryError> {
        if !self.dir.exists() {
            return Err(DiscoveryError::DirectoryNotFound {
                path: self.dir.display().to_string(),
            });
        }
        if !self.dir.is_dir() {
            return Err(DiscoveryError::NotADirectory {
                path: self.dir.display().to_string(),
            });
        }

        let mut pairs: BTreeMap<String, ScriptPair> = BTreeMap::new();
        let entries = std::fs::read_dir(&self.dir).map_err(|e| DiscoveryError::IoWithPath {
            path: self.dir.display().to_string(),
            source: e,
        })?;
        for entry in entries {
            let entry = entry.map_err(|e| DiscoveryError::IoWithPath {
                path: self.dir.display().to_string(),
                source: e,
            })?;
            let path = entry.path();
            if path.is_dir() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()).map(|n| n.to_string()) else {
                continue;
            };
            if let Some(stem) = name.strip_suffix(UP_SUFFIX) {
                pairs.entry(stem.to_string()).or_default().up = Some(path);
            } else if let Some(stem) = name.strip_suffix(DOWN_SUFFIX) {
                pairs.entry(stem.to_string()).or_default().down = Some(path);
            } else {
                log::debug!("Ignoring non-migration file {}", path.display());
            }
        }
        Ok(pairs)
    }
}

fn read_script(path: &Path) -> Result<String, DiscoveryError> {
    std::fs::read_to_string(path).map_err(|e| DiscoveryError::IoWithPath {
        path: path.display().to_string(),
        source: e,
    })
}

impl MigrationSource for SqlDirectorySource {
    fn load(&self) -> Result<Vec<Arc<dyn Migration>>, DiscoveryError> {
        let mut modules: Vec<Arc<dyn Migration>> = Vec::new();
        for (stem, pair) in self.scan()? {
            let id = MigrationId::parse(stem.as_str()).map_err(|reason| DiscoveryError::MalformedId {
                name: stem.clone(),
                reason,
            })?;
            let up_path = pair.up.ok_or_else(|| DiscoveryError::MissingOperation {
                id: stem.clone(),
                missing: "up",
            })?;
            let down_path = pair.down.ok_or_else(|| DiscoveryError::MissingOperation {
                id: stem.clone(),
                missing: "down",
            })?;
            let up_sql = read_script(&up_path)?;
            let down_sql = read_script(&down_path)?;
            modules.push(Arc::new(SqlMigration::new(id, up_sql, down_sql)));
        }
        log::debug!(
            "Discovered {} migrations in {}",
            modules.len(),
            self.dir.display()
        );
        Ok(modules)
    }
}

#[cfg(test)]
#[path = "directory_test.rs"]
mod directory_test;
