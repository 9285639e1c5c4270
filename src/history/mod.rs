//! The migration ledger.
//!
//! A history store records which scripts have been applied. The runner is
//! its only writer: a record is inserted after a script's apply succeeds and
//! deleted after its revert succeeds.

mod memory;
mod storage;
mod types;

pub use memory::MemoryHistoryStore;
pub use storage::JsonHistoryStore;
pub use types::{HistoryQuery, IdentifierBound, LedgerFile, MigrationRecord, SortOrder};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Migration already recorded: {0}")]
    DuplicateRecord(String),

    #[error("History store unavailable: {0}")]
    Unavailable(String),
}

/// Read/write primitives over the ledger.
///
/// Implementations serialize their own writes. Identifiers are unique.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Records matching `query`, in the query's order.
    async fn find(&self, query: &HistoryQuery) -> Result<Vec<MigrationRecord>, HistoryError>;

    /// Add a record. Fails with `DuplicateRecord` if the identifier is present.
    async fn insert(&self, record: MigrationRecord) -> Result<(), HistoryError>;

    /// Remove the record with this identifier. Removing a missing record is not an error.
    async fn delete(&self, identifier: &str) -> Result<(), HistoryError>;
}
