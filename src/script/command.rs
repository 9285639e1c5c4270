use super::{ScriptError, ScriptExecutor};
use crate::migration::MigrationDirection;
use crate::utils::get_script_path;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, error, info, warn};

/// Runs script files as child processes.
///
/// A script is invoked as `<interpreter> <migrations_dir>/<identifier> <up|down>`,
/// or directly as `<migrations_dir>/<identifier> <up|down>` when no interpreter
/// is configured. A zero exit status is success.
pub struct CommandExecutor {
    migrations_dir: PathBuf,
    interpreter: Option<String>,
}

impl CommandExecutor {
    pub fn new(migrations_dir: impl Into<PathBuf>, interpreter: Option<String>) -> Self {
        Self {
            migrations_dir: migrations_dir.into(),
            interpreter: interpreter.filter(|i| !i.trim().is_empty()),
        }
    }

    fn command(&self, script_path: &Path) -> Command {
        match &self.interpreter {
            Some(interpreter) => {
                let mut command = Command::new(interpreter);
                command.arg(script_path);
                command
            }
            None => Command::new(script_path),
        }
    }
}

#[async_trait]
impl ScriptExecutor for CommandExecutor {
    async fn execute(
        &self,
        identifier: &str,
        direction: MigrationDirection,
    ) -> Result<(), ScriptError> {
        let script_path = get_script_path(&self.migrations_dir, identifier);
        if !script_path.is_file() {
            return Err(ScriptError::NotFound(identifier.to_string()));
        }
        // The child runs inside the migrations directory
        let script_path = script_path.canonicalize()?;

        debug!(script = %script_path.display(), %direction, "Spawning script");
        let output = self
            .command(&script_path)
            .arg(direction.script_arg())
            .current_dir(&self.migrations_dir)
            .kill_on_drop(true)
            .output()
            .await?;

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        if !output.status.success() {
            error!(
                script = %identifier,
                status = %output.status,
                %stdout,
                %stderr,
                "Script exited unsuccessfully"
            );
            return Err(ScriptError::ExitStatus {
                identifier: identifier.to_string(),
                status: output.status,
                stdout,
                stderr,
            });
        }

        if !stdout.is_empty() {
            info!(script = %identifier, "{stdout}");
        }
        if !stderr.is_empty() {
            warn!(script = %identifier, "{stderr}");
        }
        Ok(())
    }
}
