//! Static, code-registered migration source.

use crate::discovery::MigrationSource;
use crate::error::DiscoveryError;
use crate::migration::Migration;
use std::sync::Arc;

/// Builder over migrations registered in code.
///
/// Registration order does not matter; assembly into a
/// [`MigrationSet`](crate::discovery::MigrationSet) sorts by id.
#[derive(Default)]
pub struct MigrationRegistry {
    modules: Vec<Arc<dyn Migration>>,
}

impl MigrationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a migration.
    pub fn register(mut self, migration: impl Migration + 'static) -> Self {
        self.modules.push(Arc::new(migration));
        self
    }

    /// Register an already-shared migration.
    pub fn register_arc(mut self, migration: Arc<dyn Migration>) -> Self {
        self.modules.push(migration);
        self
    }
}

impl MigrationSource for MigrationRegistry {
    fn load(&self) -> Result<Vec<Arc<dyn Migration>>, DiscoveryError> {
        Ok(self.modules.clone())
    }
}
