use clap::{Parser, Subcommand};
use script_migrator::utils::format_elapsed;
use script_migrator::{
    create_runner, read_config, MigrateConfig, MigrationDirection, MigrationOutcome,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const DEFAULT_CONFIG: &str = "migrate.json";

/// Script Migrator - apply and revert ordered migration scripts
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the JSON configuration file
    #[arg(short, long, env = "MIGRATE_CONFIG", default_value = DEFAULT_CONFIG)]
    config: PathBuf,

    /// Directory containing the migration scripts
    #[arg(long, env = "MIGRATE_DIR")]
    dir: Option<PathBuf>,

    /// Ledger file recording applied migrations
    #[arg(long, env = "MIGRATE_HISTORY")]
    history: Option<PathBuf>,

    /// Suffix of migration script file names
    #[arg(long, env = "MIGRATE_SUFFIX")]
    suffix: Option<String>,

    /// Program used to run each script. Empty runs scripts directly.
    #[arg(long, env = "MIGRATE_INTERPRETER")]
    interpreter: Option<String>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply pending migrations, up to and including TO
    Up {
        #[arg(long, default_value = "")]
        to: String,
    },
    /// Revert applied migrations that ran after TO
    Down {
        #[arg(long, default_value = "")]
        to: String,
    },
    /// Print the scripts a run would execute, without running them
    Plan {
        /// apply/up or revert/down
        direction: String,
        #[arg(long, default_value = "")]
        to: String,
    },
    /// List applied and pending migrations
    Status,
}

impl Args {
    /// Configuration file values, overridden by command line flags
    fn apply_overrides(&self, mut config: MigrateConfig) -> MigrateConfig {
        if let Some(dir) = &self.dir {
            config.migrations_dir = dir.clone();
        }
        if let Some(history) = &self.history {
            config.history_file = history.clone();
        }
        if let Some(suffix) = &self.suffix {
            config.script_suffix = suffix.clone();
        }
        if let Some(interpreter) = &self.interpreter {
            config.interpreter = interpreter.clone();
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default();
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(log_filter(args.verbose, &directives))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = read_config(&args.config).await?.unwrap_or_default();
    let config = args.apply_overrides(config);
    info!(
        dir = %config.migrations_dir.display(),
        history = %config.history_file.display(),
        "Using migrations directory"
    );

    let runner = create_runner(&config);

    match &args.command {
        Command::Up { to } => {
            report(runner.migrate(MigrationDirection::Apply, to).await?);
        }
        Command::Down { to } => {
            report(runner.migrate(MigrationDirection::Revert, to).await?);
        }
        Command::Plan { direction, to } => {
            let direction: MigrationDirection = direction.parse()?;
            let plan = runner.find_scripts_to_run(direction, to).await?;
            for script in &plan {
                println!("{script}");
            }
        }
        Command::Status => {
            let status = runner.status().await?;
            for record in &status.applied {
                println!("applied  {}  {}", record.identifier, record.applied_at.to_rfc3339());
            }
            for script in &status.pending {
                println!("pending  {script}");
            }
        }
    }

    Ok(())
}

/// `RUST_LOG` directives on top of a default level picked by `--verbose`
fn log_filter(verbose: bool, directives: &str) -> EnvFilter {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    EnvFilter::builder()
        .with_default_directive(level.into())
        .parse_lossy(directives)
}

fn report(outcome: MigrationOutcome) {
    match outcome {
        MigrationOutcome::Completed {
            direction,
            ran,
            elapsed,
        } => {
            info!(
                %direction,
                count = ran.len(),
                elapsed = %format_elapsed(elapsed),
                "Migration run complete"
            );
        }
        MigrationOutcome::Skipped => info!("Migration run skipped"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_filter_defaults_to_info() {
        assert_eq!(log_filter(false, "").max_level_hint(), Some(LevelFilter::INFO));
    }

    #[test]
    fn test_log_filter_verbose_is_debug() {
        assert_eq!(log_filter(true, "").max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn test_log_filter_honours_directives() {
        let filter = log_filter(false, "script_migrator=trace");
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));
    }
}
