use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One applied migration, as stored in the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationRecord {
    pub identifier: String,
    pub applied_at: DateTime<Utc>,
}

impl MigrationRecord {
    pub fn new(identifier: impl Into<String>, applied_at: DateTime<Utc>) -> Self {
        Self {
            identifier: identifier.into(),
            applied_at,
        }
    }

    /// Record stamped with the current time
    pub fn applied_now(identifier: impl Into<String>) -> Self {
        Self::new(identifier, Utc::now())
    }
}

/// Sort order of a ledger query, always by identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Inclusive identifier bound of a ledger query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentifierBound {
    AtMost(String),
    AtLeast(String),
}

impl IdentifierBound {
    fn admits(&self, identifier: &str) -> bool {
        match self {
            IdentifierBound::AtMost(limit) => identifier <= limit.as_str(),
            IdentifierBound::AtLeast(limit) => identifier >= limit.as_str(),
        }
    }
}

/// Ordered range query over the ledger
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HistoryQuery {
    pub order: SortOrder,
    pub bound: Option<IdentifierBound>,
}

impl HistoryQuery {
    /// Every record, ascending
    pub fn all() -> Self {
        Self::default()
    }

    pub fn ordered(order: SortOrder) -> Self {
        Self { order, bound: None }
    }

    pub fn with_bound(mut self, bound: Option<IdentifierBound>) -> Self {
        self.bound = bound;
        self
    }

    /// Filter and sort records according to this query
    pub fn apply<'a, I>(&self, records: I) -> Vec<MigrationRecord>
    where
        I: IntoIterator<Item = &'a MigrationRecord>,
    {
        let mut selected: Vec<MigrationRecord> = records
            .into_iter()
            .filter(|r| {
                self.bound
                    .as_ref()
                    .map_or(true, |bound| bound.admits(&r.identifier))
            })
            .cloned()
            .collect();

        selected.sort_by(|a, b| a.identifier.cmp(&b.identifier));
        if self.order == SortOrder::Descending {
            selected.reverse();
        }
        selected
    }
}

/// The ledger file layout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerFile {
    /// Schema version of the ledger file
    pub schema_version: u32,

    /// When the ledger was last modified
    pub updated_at: DateTime<Utc>,

    pub migrations: Vec<MigrationRecord>,
}

impl LedgerFile {
    pub fn new() -> Self {
        Self {
            schema_version: crate::utils::LEDGER_SCHEMA_VERSION,
            updated_at: Utc::now(),
            migrations: Vec::new(),
        }
    }
}

impl Default for LedgerFile {
    fn default() -> Self {
        Self::new()
    }
}
