pub mod catalog;
pub mod config;
pub mod history;
pub mod migration;
pub mod script;
pub mod utils;

// Re-export commonly used types
pub use catalog::{CatalogError, DirectoryCatalog, ScriptCatalog};
pub use config::{read_config, write_config, ConfigError, MigrateConfig};
pub use history::{
    HistoryError, HistoryQuery, HistoryStore, IdentifierBound, JsonHistoryStore,
    MemoryHistoryStore, MigrationRecord, SortOrder,
};
pub use migration::{
    compute_plan, create_runner, ExecutionPlan, MigrationDirection, MigrationError,
    MigrationEvent, MigrationOutcome, MigrationRunner, MigrationStatus, RunPhase, SessionGuard,
};
pub use script::{CommandExecutor, MigrationScript, ScriptError, ScriptExecutor, ScriptRegistry};
