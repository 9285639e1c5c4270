use crate::utils::{
    DEFAULT_HISTORY_FILE, DEFAULT_INTERPRETER, DEFAULT_MIGRATIONS_DIR, DEFAULT_SCRIPT_SUFFIX,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

fn default_migrations_dir() -> PathBuf {
    PathBuf::from(DEFAULT_MIGRATIONS_DIR)
}

fn default_script_suffix() -> String {
    DEFAULT_SCRIPT_SUFFIX.to_string()
}

fn default_history_file() -> PathBuf {
    PathBuf::from(DEFAULT_HISTORY_FILE)
}

fn default_interpreter() -> String {
    DEFAULT_INTERPRETER.to_string()
}

/// Migrator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrateConfig {
    /// Directory the migration scripts live in
    #[serde(default = "default_migrations_dir")]
    pub migrations_dir: PathBuf,
    /// Suffix identifying script files, e.g. `.sh`
    #[serde(default = "default_script_suffix")]
    pub script_suffix: String,
    /// Location of the JSON ledger
    #[serde(default = "default_history_file")]
    pub history_file: PathBuf,
    /// Program that runs a script file. Empty runs the file directly.
    #[serde(default = "default_interpreter")]
    pub interpreter: String,
}

impl Default for MigrateConfig {
    fn default() -> Self {
        Self {
            migrations_dir: default_migrations_dir(),
            script_suffix: default_script_suffix(),
            history_file: default_history_file(),
            interpreter: default_interpreter(),
        }
    }
}

/// Read the configuration file
pub async fn read_config(config_path: &Path) -> Result<Option<MigrateConfig>, ConfigError> {
    if !config_path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(config_path).await?;
    let config: MigrateConfig = serde_json::from_str(&content)?;
    Ok(Some(config))
}

/// Write the configuration file
pub async fn write_config(config_path: &Path, config: &MigrateConfig) -> Result<(), ConfigError> {
    let content = serde_json::to_string_pretty(config)?;
    fs::write(config_path, content).await?;
    Ok(())
}
