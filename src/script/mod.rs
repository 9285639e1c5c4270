//! Running a single migration script.
//!
//! The runner never looks inside a script. It hands an identifier and a
//! direction to a [`ScriptExecutor`] and waits for success or failure.

mod command;
mod registry;

pub use command::CommandExecutor;
pub use registry::{MigrationScript, ScriptRegistry};

use crate::migration::MigrationDirection;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Script not found: {0}")]
    NotFound(String),

    #[error("Script {identifier} exited with {status}\nstdout: {stdout}\nstderr: {stderr}")]
    ExitStatus {
        identifier: String,
        status: std::process::ExitStatus,
        stdout: String,
        stderr: String,
    },

    #[error("{0}")]
    Failed(String),
}

/// Loads and runs one script in one direction.
#[async_trait]
pub trait ScriptExecutor: Send + Sync {
    async fn execute(
        &self,
        identifier: &str,
        direction: MigrationDirection,
    ) -> Result<(), ScriptError>;
}
