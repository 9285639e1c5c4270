use super::{CatalogError, ScriptCatalog};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Catalog backed by the script files of a single directory
pub struct DirectoryCatalog {
    migrations_dir: PathBuf,
    suffix: String,
}

impl DirectoryCatalog {
    pub fn new(migrations_dir: impl Into<PathBuf>, suffix: impl Into<String>) -> Self {
        Self {
            migrations_dir: migrations_dir.into(),
            suffix: suffix.into(),
        }
    }

    pub fn migrations_dir(&self) -> &Path {
        &self.migrations_dir
    }
}

#[async_trait]
impl ScriptCatalog for DirectoryCatalog {
    async fn list_scripts(&self) -> Result<Vec<String>, CatalogError> {
        if !self.migrations_dir.is_dir() {
            return Err(CatalogError::DirectoryNotFound(self.migrations_dir.clone()));
        }

        // Only direct children count; nested directories are not scripts.
        // Symlinked scripts are listed by what they point at.
        let mut scripts = Vec::new();
        for entry in WalkDir::new(&self.migrations_dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
        {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            let name = entry.file_name().to_string_lossy();
            if name.ends_with(&self.suffix) {
                scripts.push(name.into_owned());
            }
        }

        debug!(
            dir = %self.migrations_dir.display(),
            count = scripts.len(),
            "Found candidate scripts"
        );
        Ok(scripts)
    }
}
