//! Migration discovery: sources and the validated, ordered set.

use crate::error::DiscoveryError;
use crate::migration::Migration;
use crate::migration_id::MigrationId;
use std::sync::Arc;

/// A source of migration modules: a directory of SQL scripts, a static
/// registry, or any user-supplied collection.
///
/// Loading is pure and repeatable and performs no database I/O.
pub trait MigrationSource {
    fn load(&self) -> Result<Vec<Arc<dyn Migration>>, DiscoveryError>;
}

/// An ordered, validated set of migration modules.
///
/// Modules are sorted ascending by id; two modules sharing a version are
/// rejected at assembly, before any database access.
pub struct MigrationSet {
    modules: Vec<Arc<dyn Migration>>,
}

impl MigrationSet {
    /// Validate and order a collection of modules.
    pub fn assemble(mut modules: Vec<Arc<dyn Migration>>) -> Result<Self, DiscoveryError> {
        modules.sort_by(|a, b| a.id().cmp(b.id()));
        for pair in modules.windows(2) {
            if pair[0].id().version() == pair[1].id().version() {
                return Err(DiscoveryError::DuplicateId {
                    first: pair[0].id().clone(),
                    second: pair[1].id().clone(),
                });
            }
        }
        Ok(Self { modules })
    }

    /// Load and assemble from a single source.
    pub fn from_source(source: &dyn MigrationSource) -> Result<Self, DiscoveryError> {
        Self::assemble(source.load()?)
    }

    /// Load and assemble from several sources combined.
    pub fn from_sources(sources: &[&dyn MigrationSource]) -> Result<Self, DiscoveryError> {
        let mut modules = Vec::new();
        for source in sources {
            modules.extend(source.load()?);
        }
        Self::assemble(modules)
    }

    /// Number of modules in the set.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Whether the set holds no modules.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Iterate modules in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Migration> {
        self.modules.iter().map(|m| m.as_ref())
    }

    /// Look up a module by its full id.
    pub fn get(&self, id: &MigrationId) -> Option<&dyn Migration> {
        self.modules
            .iter()
            .find(|m| m.id() == id)
            .map(|m| m.as_ref())
    }

    /// The newest id in the set.
    pub fn latest(&self) -> Option<&MigrationId> {
        self.modules.last().map(|m| m.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::SqlMigration;

    fn module(id: &str) -> Arc<dyn Migration> {
        Arc::new(SqlMigration::new(MigrationId::new(id), "SELECT 1", "SELECT 1"))
    }

    #[test]
    fn test_assemble_sorts_numerically() {
        let set = MigrationSet::assemble(vec![module("10_c"), module("2_b"), module("1_a")]).unwrap();
        let ids: Vec<&str> = set.iter().map(|m| m.id().as_str()).collect();
        assert_eq!(ids, vec!["1_a", "2_b", "10_c"]);
        assert_eq!(set.latest().unwrap(), "10_c");
    }

    #[test]
    fn test_assemble_rejects_duplicate_versions() {
        let result = MigrationSet::assemble(vec![module("001_a"), module("001_b")]);
        match result {
            Err(DiscoveryError::DuplicateId { first, second }) => {
                assert_eq!(first, "001_a");
                assert_eq!(second, "001_b");
            }
            other => panic!("expected DuplicateId, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_get_by_id() {
        let set = MigrationSet::assemble(vec![module("001_a"), module("002_b")]).unwrap();
        assert!(set.get(&MigrationId::new("002_b")).is_some());
        assert!(set.get(&MigrationId::new("003_c")).is_none());
    }

    #[test]
    fn test_empty_set() {
        let set = MigrationSet::assemble(Vec::new()).unwrap();
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
        assert!(set.latest().is_none());
    }
}
