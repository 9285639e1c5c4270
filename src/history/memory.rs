use super::types::{HistoryQuery, MigrationRecord};
use super::{HistoryError, HistoryStore};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::Mutex;

/// Ledger kept in process memory
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    records: Mutex<BTreeMap<String, MigrationRecord>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger pre-populated with the given records
    pub fn with_records(records: impl IntoIterator<Item = MigrationRecord>) -> Self {
        let records = records
            .into_iter()
            .map(|r| (r.identifier.clone(), r))
            .collect();
        Self {
            records: Mutex::new(records),
        }
    }

    /// Applied identifiers, ascending
    pub async fn identifiers(&self) -> Vec<String> {
        self.records.lock().await.keys().cloned().collect()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn find(&self, query: &HistoryQuery) -> Result<Vec<MigrationRecord>, HistoryError> {
        let records = self.records.lock().await;
        Ok(query.apply(records.values()))
    }

    async fn insert(&self, record: MigrationRecord) -> Result<(), HistoryError> {
        let mut records = self.records.lock().await;
        if records.contains_key(&record.identifier) {
            return Err(HistoryError::DuplicateRecord(record.identifier));
        }
        records.insert(record.identifier.clone(), record);
        Ok(())
    }

    async fn delete(&self, identifier: &str) -> Result<(), HistoryError> {
        self.records.lock().await.remove(identifier);
        Ok(())
    }
}
