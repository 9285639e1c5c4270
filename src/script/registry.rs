//! In-process migration scripts.

use super::{ScriptError, ScriptExecutor};
use crate::catalog::{CatalogError, ScriptCatalog};
use crate::migration::MigrationDirection;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A migration written in Rust.
///
/// Each script must be reversible (implement both up and down).
#[async_trait]
pub trait MigrationScript: Send + Sync {
    /// Identifier the script is ordered and recorded by.
    fn identifier(&self) -> &str;

    /// Apply the script.
    async fn up(&self) -> Result<(), ScriptError>;

    /// Revert the script.
    async fn down(&self) -> Result<(), ScriptError>;
}

/// Registry of compiled-in scripts.
///
/// Serves as both the catalog and the executor, so a host can embed its
/// migrations instead of shipping script files.
pub struct ScriptRegistry {
    scripts: BTreeMap<String, Arc<dyn MigrationScript>>,
}

impl ScriptRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            scripts: BTreeMap::new(),
        }
    }

    /// Register a script. A later script with the same identifier replaces the earlier one.
    pub fn register(&mut self, script: Arc<dyn MigrationScript>) {
        self.scripts.insert(script.identifier().to_string(), script);
    }

    pub fn get(&self, identifier: &str) -> Option<&Arc<dyn MigrationScript>> {
        self.scripts.get(identifier)
    }

    /// Registered identifiers, ascending.
    pub fn identifiers(&self) -> Vec<String> {
        self.scripts.keys().cloned().collect()
    }
}

impl Default for ScriptRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ScriptCatalog for ScriptRegistry {
    async fn list_scripts(&self) -> Result<Vec<String>, CatalogError> {
        Ok(self.identifiers())
    }
}

#[async_trait]
impl ScriptExecutor for ScriptRegistry {
    async fn execute(
        &self,
        identifier: &str,
        direction: MigrationDirection,
    ) -> Result<(), ScriptError> {
        let script = self
            .get(identifier)
            .ok_or_else(|| ScriptError::NotFound(identifier.to_string()))?;

        match direction {
            MigrationDirection::Apply => script.up().await,
            MigrationDirection::Revert => script.down().await,
        }
    }
}
