//! Command execution and runtime logic.
//!
//! Contains the command dispatcher and logging initialization.

use anyhow::Result;
use std::path::Path;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::ExitCode;
use crate::cli::Commands;
use crate::commands;

/// Initializes logging infrastructure.
///
/// Logs go to stderr so they never mix with command output. `RUST_LOG`
/// selects the level unless `verbose` forces debug logging.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()?;

    Ok(())
}

/// Executes the specified CLI command against the project directory `dir`.
///
/// # Errors
///
/// Returns an error if command execution fails.
pub fn execute_command(command: Commands, dir: &Path) -> Result<ExitCode> {
    match command {
        Commands::Unpack { savegame } => commands::unpack::run(&savegame, dir),
        Commands::Repack { output } => commands::repack::run(&output, dir),
        Commands::Fmt => commands::fmt::run(dir),
    }
}
