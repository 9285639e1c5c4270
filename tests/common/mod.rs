#![allow(dead_code)]

use async_trait::async_trait;
use script_migrator::{
    CatalogError, HistoryError, HistoryQuery, HistoryStore, MemoryHistoryStore,
    MigrationDirection, MigrationRecord, MigrationRunner, ScriptCatalog, ScriptError,
    ScriptExecutor,
};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub const SUFFIX: &str = ".js";

pub fn ids(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

pub fn records(names: &[&str]) -> Vec<MigrationRecord> {
    names.iter().map(|n| MigrationRecord::applied_now(*n)).collect()
}

/// Catalog with a fixed listing
pub struct StaticCatalog(pub Vec<String>);

#[async_trait]
impl ScriptCatalog for StaticCatalog {
    async fn list_scripts(&self) -> Result<Vec<String>, CatalogError> {
        Ok(self.0.clone())
    }
}

/// Catalog whose listing always fails
pub struct BrokenCatalog;

#[async_trait]
impl ScriptCatalog for BrokenCatalog {
    async fn list_scripts(&self) -> Result<Vec<String>, CatalogError> {
        Err(CatalogError::DirectoryNotFound("missing".into()))
    }
}

/// Executor that records every call and fails on chosen scripts
#[derive(Default)]
pub struct RecordingExecutor {
    calls: Mutex<Vec<(String, MigrationDirection)>>,
    failing: HashSet<String>,
    gate: Option<Gate>,
}

/// Holds the first script inside `execute` until released
#[derive(Clone, Default)]
pub struct Gate {
    pub entered: Arc<Notify>,
    pub release: Arc<Notify>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(names: &[&str]) -> Self {
        Self {
            failing: names.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn gated(gate: Gate) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<(String, MigrationDirection)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn executed(&self) -> Vec<String> {
        self.calls().into_iter().map(|(id, _)| id).collect()
    }
}

#[async_trait]
impl ScriptExecutor for RecordingExecutor {
    async fn execute(
        &self,
        identifier: &str,
        direction: MigrationDirection,
    ) -> Result<(), ScriptError> {
        self.calls
            .lock()
            .unwrap()
            .push((identifier.to_string(), direction));

        if let Some(gate) = &self.gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }

        if self.failing.contains(identifier) {
            return Err(ScriptError::Failed(format!("{identifier} blew up")));
        }
        Ok(())
    }
}

/// Ledger that reads fine but refuses every write
pub struct ReadOnlyHistory(pub MemoryHistoryStore);

#[async_trait]
impl HistoryStore for ReadOnlyHistory {
    async fn find(&self, query: &HistoryQuery) -> Result<Vec<MigrationRecord>, HistoryError> {
        self.0.find(query).await
    }

    async fn insert(&self, _record: MigrationRecord) -> Result<(), HistoryError> {
        Err(HistoryError::Unavailable("read only".to_string()))
    }

    async fn delete(&self, _identifier: &str) -> Result<(), HistoryError> {
        Err(HistoryError::Unavailable("read only".to_string()))
    }
}

/// Ledger whose reads fail
pub struct BrokenHistory;

#[async_trait]
impl HistoryStore for BrokenHistory {
    async fn find(&self, _query: &HistoryQuery) -> Result<Vec<MigrationRecord>, HistoryError> {
        Err(HistoryError::Unavailable("connection refused".to_string()))
    }

    async fn insert(&self, _record: MigrationRecord) -> Result<(), HistoryError> {
        Ok(())
    }

    async fn delete(&self, _identifier: &str) -> Result<(), HistoryError> {
        Ok(())
    }
}

/// Runner over a static catalog and an in-memory ledger
pub fn create_test_runner(
    catalog: &[&str],
    history: Arc<dyn HistoryStore>,
    executor: Arc<dyn ScriptExecutor>,
) -> MigrationRunner {
    MigrationRunner::new(Arc::new(StaticCatalog(ids(catalog))), history, executor)
        .with_script_suffix(SUFFIX)
}
