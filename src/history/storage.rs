use super::types::{HistoryQuery, LedgerFile, MigrationRecord};
use super::{HistoryError, HistoryStore};
use async_trait::async_trait;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

/// Ledger persisted as a JSON file
pub struct JsonHistoryStore {
    path: PathBuf,
    /// Held across every read-modify-write cycle
    lock: Mutex<()>,
}

impl JsonHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the ledger from disk. A missing file is an empty ledger.
    pub async fn read_ledger(&self) -> Result<LedgerFile, HistoryError> {
        if !self.path.exists() {
            return Ok(LedgerFile::new());
        }

        let content = fs::read_to_string(&self.path).await?;
        let ledger: LedgerFile = serde_json::from_str(&content)?;
        Ok(ledger)
    }

    /// Write the ledger without acquiring the lock (caller must hold lock)
    async fn write_ledger_unlocked(&self, ledger: &LedgerFile) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        // Write atomically using temp file + rename
        let temp_path = self.path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(ledger)?;
        fs::write(&temp_path, &content).await?;
        fs::rename(&temp_path, &self.path).await?;

        debug!(path = %self.path.display(), records = ledger.migrations.len(), "Ledger written");
        Ok(())
    }
}

#[async_trait]
impl HistoryStore for JsonHistoryStore {
    async fn find(&self, query: &HistoryQuery) -> Result<Vec<MigrationRecord>, HistoryError> {
        let _guard = self.lock.lock().await;
        let ledger = self.read_ledger().await?;
        Ok(query.apply(&ledger.migrations))
    }

    async fn insert(&self, record: MigrationRecord) -> Result<(), HistoryError> {
        let _guard = self.lock.lock().await;

        let mut ledger = self.read_ledger().await?;
        if ledger
            .migrations
            .iter()
            .any(|r| r.identifier == record.identifier)
        {
            return Err(HistoryError::DuplicateRecord(record.identifier));
        }

        ledger.migrations.push(record);
        ledger
            .migrations
            .sort_by(|a, b| a.identifier.cmp(&b.identifier));
        ledger.updated_at = Utc::now();
        self.write_ledger_unlocked(&ledger).await
    }

    async fn delete(&self, identifier: &str) -> Result<(), HistoryError> {
        let _guard = self.lock.lock().await;

        let mut ledger = self.read_ledger().await?;
        let before = ledger.migrations.len();
        ledger.migrations.retain(|r| r.identifier != identifier);
        if ledger.migrations.len() == before {
            return Ok(());
        }

        ledger.updated_at = Utc::now();
        self.write_ledger_unlocked(&ledger).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::SortOrder;

    #[tokio::test]
    async fn test_missing_file_is_empty_ledger() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonHistoryStore::new(temp_dir.path().join("ledger.json"));

        let records = store.find(&HistoryQuery::all()).await.unwrap();
        assert!(records.is_empty());
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_insert_persists_sorted() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("ledger.json");
        let store = JsonHistoryStore::new(&path);

        store
            .insert(MigrationRecord::applied_now("002_b.js"))
            .await
            .unwrap();
        store
            .insert(MigrationRecord::applied_now("001_a.js"))
            .await
            .unwrap();

        let reopened = JsonHistoryStore::new(&path);
        let ledger = reopened.read_ledger().await.unwrap();
        let ids: Vec<_> = ledger.migrations.iter().map(|r| r.identifier.as_str()).collect();
        assert_eq!(ids, vec!["001_a.js", "002_b.js"]);
        assert_eq!(ledger.schema_version, 1);
    }

    #[tokio::test]
    async fn test_duplicate_insert_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonHistoryStore::new(temp_dir.path().join("ledger.json"));

        store
            .insert(MigrationRecord::applied_now("001_a.js"))
            .await
            .unwrap();
        let result = store.insert(MigrationRecord::applied_now("001_a.js")).await;
        assert!(matches!(result, Err(HistoryError::DuplicateRecord(_))));
    }

    #[tokio::test]
    async fn test_delete_removes_record() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonHistoryStore::new(temp_dir.path().join("ledger.json"));

        for id in ["001_a.js", "002_b.js"] {
            store.insert(MigrationRecord::applied_now(id)).await.unwrap();
        }
        store.delete("002_b.js").await.unwrap();
        store.delete("999_missing.js").await.unwrap();

        let records = store
            .find(&HistoryQuery::ordered(SortOrder::Descending))
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].identifier, "001_a.js");
    }

    #[tokio::test]
    async fn test_corrupt_ledger_is_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("ledger.json");
        tokio::fs::write(&path, "not json").await.unwrap();

        let store = JsonHistoryStore::new(&path);
        let result = store.find(&HistoryQuery::all()).await;
        assert!(matches!(result, Err(HistoryError::JsonError(_))));
    }
}
