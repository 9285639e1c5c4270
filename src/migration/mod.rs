//! Migration selection and sequencing.
//!
//! # Overview
//!
//! - [`compute_plan`] decides which scripts to run and in what order
//! - The [`MigrationRunner`] runs that plan one script at a time through a
//!   [`ScriptExecutor`](crate::script::ScriptExecutor) and records each
//!   success in a [`HistoryStore`](crate::history::HistoryStore)
//! - A run stops at the first failure; scripts that already ran stay applied
//! - A [`SessionGuard`] turns overlapping runs into no-ops
//!
//! # Usage
//!
//! ```ignore
//! let runner = MigrationRunner::new(catalog, history, executor).with_script_suffix(".sh");
//! let outcome = runner.migrate(MigrationDirection::Apply, "").await?;
//! ```

mod guard;
mod runner;
mod selector;
mod types;

pub use guard::{SessionGuard, SessionToken};
pub use runner::MigrationRunner;
pub use selector::compute_plan;
pub use types::{
    ExecutionPlan, MigrationDirection, MigrationError, MigrationEvent, MigrationOutcome,
    MigrationStatus, RunPhase,
};

use crate::catalog::DirectoryCatalog;
use crate::config::MigrateConfig;
use crate::history::JsonHistoryStore;
use crate::script::CommandExecutor;
use std::sync::Arc;

/// Build the standard file-backed runner from configuration.
///
/// Scripts are listed from and run inside `migrations_dir`, and the ledger
/// is the JSON file at `history_file`.
pub fn create_runner(config: &MigrateConfig) -> MigrationRunner {
    let catalog = DirectoryCatalog::new(&config.migrations_dir, &config.script_suffix);
    let history = JsonHistoryStore::new(&config.history_file);
    let executor = CommandExecutor::new(&config.migrations_dir, Some(config.interpreter.clone()));

    MigrationRunner::new(Arc::new(catalog), Arc::new(history), Arc::new(executor))
        .with_script_suffix(&config.script_suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn test_create_runner_reads_configured_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let migrations_dir = temp_dir.path().join("migrations");
        fs::create_dir(&migrations_dir).unwrap();
        fs::write(migrations_dir.join("001_a.sh"), "exit 0\n").unwrap();

        let config = MigrateConfig {
            migrations_dir,
            history_file: temp_dir.path().join("ledger.json"),
            ..Default::default()
        };
        let runner = create_runner(&config);

        let plan = runner
            .find_scripts_to_run(MigrationDirection::Apply, "")
            .await
            .unwrap();
        assert_eq!(plan.scripts(), ["001_a.sh".to_string()].as_slice());
    }
}
