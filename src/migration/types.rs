//! Types for the migration system.

use crate::catalog::CatalogError;
use crate::history::{HistoryError, SortOrder};
use crate::script::ScriptError;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Error types for migration operations.
#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("Failed to list migration scripts: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Failed to read migration history: {0}")]
    History(#[from] HistoryError),

    #[error("Migration {identifier} failed: {source}")]
    ScriptFailed {
        identifier: String,
        #[source]
        source: ScriptError,
    },

    #[error("Failed to update migration history for {identifier}: {source}")]
    LedgerWrite {
        identifier: String,
        #[source]
        source: HistoryError,
    },

    #[error("Invalid migration direction: {0}")]
    InvalidDirection(String),
}

impl MigrationError {
    /// The script the run stopped at, if the failure belongs to one.
    pub fn identifier(&self) -> Option<&str> {
        match self {
            MigrationError::ScriptFailed { identifier, .. }
            | MigrationError::LedgerWrite { identifier, .. } => Some(identifier),
            _ => None,
        }
    }
}

/// Direction of migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MigrationDirection {
    /// Run scripts not yet recorded, oldest first.
    #[default]
    Apply,
    /// Undo recorded scripts, newest first.
    Revert,
}

impl MigrationDirection {
    /// Order in which the ledger is read and the plan is run.
    pub fn sort_order(self) -> SortOrder {
        match self {
            MigrationDirection::Apply => SortOrder::Ascending,
            MigrationDirection::Revert => SortOrder::Descending,
        }
    }

    /// Argument handed to script files.
    pub fn script_arg(self) -> &'static str {
        match self {
            MigrationDirection::Apply => "up",
            MigrationDirection::Revert => "down",
        }
    }
}

impl fmt::Display for MigrationDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationDirection::Apply => write!(f, "apply"),
            MigrationDirection::Revert => write!(f, "revert"),
        }
    }
}

impl FromStr for MigrationDirection {
    type Err = MigrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "apply" | "up" => Ok(MigrationDirection::Apply),
            "revert" | "down" => Ok(MigrationDirection::Revert),
            other => Err(MigrationError::InvalidDirection(other.to_string())),
        }
    }
}

/// Ordered scripts selected for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPlan {
    direction: MigrationDirection,
    scripts: Vec<String>,
}

impl ExecutionPlan {
    pub(crate) fn new(direction: MigrationDirection, scripts: Vec<String>) -> Self {
        Self { direction, scripts }
    }

    pub fn direction(&self) -> MigrationDirection {
        self.direction
    }

    pub fn scripts(&self) -> &[String] {
        &self.scripts
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }

    pub fn into_scripts(self) -> Vec<String> {
        self.scripts
    }
}

impl<'a> IntoIterator for &'a ExecutionPlan {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.scripts.iter()
    }
}

/// Result of a `migrate` call that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// Every planned script ran. `ran` is empty when nothing was pending.
    Completed {
        direction: MigrationDirection,
        ran: Vec<String>,
        elapsed: Duration,
    },
    /// Another run was active, so this one did nothing.
    Skipped,
}

impl MigrationOutcome {
    /// Scripts run by this invocation.
    pub fn ran(&self) -> &[String] {
        match self {
            MigrationOutcome::Completed { ran, .. } => ran,
            MigrationOutcome::Skipped => &[],
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, MigrationOutcome::Skipped)
    }
}

/// Lifecycle signals broadcast by the runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationEvent {
    ScriptStarted {
        identifier: String,
        direction: MigrationDirection,
    },
    ScriptFinished {
        identifier: String,
        direction: MigrationDirection,
        elapsed: Duration,
    },
    /// The run finished with every planned script applied or reverted.
    Complete { ran: usize, elapsed: Duration },
    /// The run stopped. `identifier` is the failing script, if any.
    Error {
        identifier: Option<String>,
        message: String,
    },
}

/// Where the runner currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunPhase {
    #[default]
    Idle,
    SelectingPlan,
    /// Executing the plan entry at this index.
    Running(usize),
    Succeeded,
    Failed,
}

/// Snapshot of the ledger against the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MigrationStatus {
    /// Recorded migrations, ascending.
    pub applied: Vec<crate::history::MigrationRecord>,
    /// Catalog scripts not yet recorded, ascending.
    pub pending: Vec<String>,
}
