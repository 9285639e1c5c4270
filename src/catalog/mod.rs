//! Listing of the migration scripts that exist.

mod directory;

pub use directory::DirectoryCatalog;

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to scan migrations directory: {0}")]
    WalkError(#[from] walkdir::Error),

    #[error("Migrations directory not found: {0}")]
    DirectoryNotFound(PathBuf),
}

/// Enumerates every known migration script identifier.
#[async_trait]
pub trait ScriptCatalog: Send + Sync {
    /// All identifiers, in no particular order.
    async fn list_scripts(&self) -> Result<Vec<String>, CatalogError>;
}
