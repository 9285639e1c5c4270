use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default directory holding migration scripts
pub const DEFAULT_MIGRATIONS_DIR: &str = "migrations";

/// Default suffix every migration script file name ends with
pub const DEFAULT_SCRIPT_SUFFIX: &str = ".sh";

/// Default name of the ledger file
pub const DEFAULT_HISTORY_FILE: &str = ".migrations.json";

/// Default program used to run script files
pub const DEFAULT_INTERPRETER: &str = "sh";

/// Current ledger schema version
pub const LEDGER_SCHEMA_VERSION: u32 = 1;

/// Resolve a script identifier to its file inside the migrations directory
pub fn get_script_path(migrations_dir: &Path, identifier: &str) -> PathBuf {
    migrations_dir.join(identifier)
}

/// Turn a user supplied target into a script identifier.
///
/// An empty target means "no bound". A target without the script suffix
/// gets it appended so `002_b` and `002_b.sh` select the same script.
pub fn normalize_target(target: &str, suffix: &str) -> Option<String> {
    if target.is_empty() {
        return None;
    }

    if target.ends_with(suffix) {
        Some(target.to_string())
    } else {
        Some(format!("{target}{suffix}"))
    }
}

/// Render an elapsed duration as `<s>s <ms>ms`
pub fn format_elapsed(elapsed: Duration) -> String {
    format!("{}s {}ms", elapsed.as_secs(), elapsed.subsec_millis())
}
