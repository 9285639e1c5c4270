//! Migration runner: selects the plan and drives it script by script.

use super::guard::{SessionGuard, SessionToken};
use super::selector::compute_plan;
use super::types::{
    ExecutionPlan, MigrationDirection, MigrationError, MigrationEvent, MigrationOutcome,
    MigrationStatus, RunPhase,
};
use crate::catalog::ScriptCatalog;
use crate::history::{HistoryQuery, HistoryStore, IdentifierBound, MigrationRecord};
use crate::script::ScriptExecutor;
use crate::utils::{format_elapsed, normalize_target, DEFAULT_SCRIPT_SUFFIX};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{broadcast, watch};
use tracing::{error, info, warn};

const EVENT_CAPACITY: usize = 64;

/// Runner for applying and reverting migrations.
///
/// Scripts of one plan run strictly one after another. The ledger is
/// updated after each script succeeds, and the first failure ends the run
/// with no retry and no rollback of the scripts that already ran.
///
/// At most one run is active per runner; a second `migrate` call made while
/// one is in flight returns [`MigrationOutcome::Skipped`] right away.
pub struct MigrationRunner {
    catalog: Arc<dyn ScriptCatalog>,
    history: Arc<dyn HistoryStore>,
    executor: Arc<dyn ScriptExecutor>,
    script_suffix: String,
    guard: SessionGuard,
    events: broadcast::Sender<MigrationEvent>,
    phase: watch::Sender<RunPhase>,
}

impl MigrationRunner {
    /// Create a new runner over the given collaborators.
    pub fn new(
        catalog: Arc<dyn ScriptCatalog>,
        history: Arc<dyn HistoryStore>,
        executor: Arc<dyn ScriptExecutor>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let (phase, _) = watch::channel(RunPhase::Idle);
        Self {
            catalog,
            history,
            executor,
            script_suffix: DEFAULT_SCRIPT_SUFFIX.to_string(),
            guard: SessionGuard::new(),
            events,
            phase,
        }
    }

    /// Suffix appended to targets given without one.
    pub fn with_script_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.script_suffix = suffix.into();
        self
    }

    /// Receive lifecycle events of subsequent runs.
    pub fn subscribe(&self) -> broadcast::Receiver<MigrationEvent> {
        self.events.subscribe()
    }

    pub fn watch_phase(&self) -> watch::Receiver<RunPhase> {
        self.phase.subscribe()
    }

    pub fn phase(&self) -> RunPhase {
        *self.phase.borrow()
    }

    pub fn is_migrating(&self) -> bool {
        self.guard.is_migrating()
    }

    /// Compute which scripts a `migrate` call would run, without running them.
    ///
    /// An empty `target` means no bound. The catalog is only read when applying.
    pub async fn find_scripts_to_run(
        &self,
        direction: MigrationDirection,
        target: &str,
    ) -> Result<ExecutionPlan, MigrationError> {
        let target = normalize_target(target, &self.script_suffix);

        let bound = target.clone().map(|t| match direction {
            MigrationDirection::Apply => IdentifierBound::AtMost(t),
            MigrationDirection::Revert => IdentifierBound::AtLeast(t),
        });
        let query = HistoryQuery::ordered(direction.sort_order()).with_bound(bound);
        let history: Vec<String> = self
            .history
            .find(&query)
            .await?
            .into_iter()
            .map(|r| r.identifier)
            .collect();

        let catalog = match direction {
            MigrationDirection::Apply => self.catalog.list_scripts().await?,
            MigrationDirection::Revert => Vec::new(),
        };

        Ok(compute_plan(direction, target.as_deref(), &catalog, &history))
    }

    /// Apply or revert migrations up to `target` (inclusive for apply,
    /// exclusive for revert). An empty `target` means all of them.
    pub async fn migrate(
        &self,
        direction: MigrationDirection,
        target: &str,
    ) -> Result<MigrationOutcome, MigrationError> {
        let Some(session) = self.guard.try_acquire() else {
            warn!("Unable to start migrations: already running");
            return Ok(MigrationOutcome::Skipped);
        };

        let started = Instant::now();
        self.phase.send_replace(RunPhase::SelectingPlan);

        let plan = match self.find_scripts_to_run(direction, target).await {
            Ok(plan) => plan,
            Err(e) => {
                error!(error = %e, "Error retrieving migrations");
                return Err(self.fail(session, started, e));
            }
        };

        if plan.is_empty() {
            info!(%direction, "No new migrations to run");
            return Ok(self.succeed(session, started, direction, Vec::new()));
        }

        info!(%direction, scripts = ?plan.scripts(), "Running migrations");

        let mut ran = Vec::with_capacity(plan.len());
        for (index, identifier) in plan.scripts().iter().enumerate() {
            self.phase.send_replace(RunPhase::Running(index));

            if let Err(e) = self.run_script(identifier, direction).await {
                return Err(self.fail(session, started, e));
            }
            ran.push(identifier.clone());
        }

        Ok(self.succeed(session, started, direction, ran))
    }

    /// Applied records and pending catalog scripts.
    pub async fn status(&self) -> Result<MigrationStatus, MigrationError> {
        let applied = self.history.find(&HistoryQuery::all()).await?;
        let recorded: Vec<String> = applied.iter().map(|r| r.identifier.clone()).collect();
        let catalog = self.catalog.list_scripts().await?;

        let pending = compute_plan(MigrationDirection::Apply, None, &catalog, &recorded);
        Ok(MigrationStatus {
            applied,
            pending: pending.into_scripts(),
        })
    }

    /// Run one script and record the result in the ledger.
    async fn run_script(
        &self,
        identifier: &str,
        direction: MigrationDirection,
    ) -> Result<(), MigrationError> {
        let script_started = Instant::now();
        info!(script = %identifier, %direction, "Running migration script");
        self.emit(MigrationEvent::ScriptStarted {
            identifier: identifier.to_string(),
            direction,
        });

        if let Err(source) = self.executor.execute(identifier, direction).await {
            error!(script = %identifier, error = %source, "Error running migration");
            return Err(MigrationError::ScriptFailed {
                identifier: identifier.to_string(),
                source,
            });
        }

        let recorded = match direction {
            MigrationDirection::Apply => {
                self.history
                    .insert(MigrationRecord::applied_now(identifier))
                    .await
            }
            MigrationDirection::Revert => self.history.delete(identifier).await,
        };
        if let Err(source) = recorded {
            // The script ran but the ledger does not say so; left for the operator
            error!(script = %identifier, error = %source, "Error saving migration to history");
            return Err(MigrationError::LedgerWrite {
                identifier: identifier.to_string(),
                source,
            });
        }

        let elapsed = script_started.elapsed();
        info!(
            script = %identifier,
            elapsed = %format_elapsed(elapsed),
            "Migration finished successfully"
        );
        self.emit(MigrationEvent::ScriptFinished {
            identifier: identifier.to_string(),
            direction,
            elapsed,
        });
        Ok(())
    }

    fn succeed(
        &self,
        session: SessionToken,
        started: Instant,
        direction: MigrationDirection,
        ran: Vec<String>,
    ) -> MigrationOutcome {
        let elapsed = started.elapsed();
        self.phase.send_replace(RunPhase::Succeeded);
        drop(session);

        if !ran.is_empty() {
            info!(count = ran.len(), "All migrations have run without any errors");
        }
        info!(elapsed = %format_elapsed(elapsed), "Total migration time");
        self.emit(MigrationEvent::Complete {
            ran: ran.len(),
            elapsed,
        });

        MigrationOutcome::Completed {
            direction,
            ran,
            elapsed,
        }
    }

    fn fail(&self, session: SessionToken, started: Instant, err: MigrationError) -> MigrationError {
        self.phase.send_replace(RunPhase::Failed);
        drop(session);

        error!(error = %err, "Migrations did not complete");
        info!(elapsed = %format_elapsed(started.elapsed()), "Total migration time");
        self.emit(MigrationEvent::Error {
            identifier: err.identifier().map(str::to_string),
            message: err.to_string(),
        });
        err
    }

    fn emit(&self, event: MigrationEvent) {
        // No subscribers is not an error
        let _ = self.events.send(event);
    }
}
