//! Unpack command implementation.
//!
//! Reads a savegame file and writes it into the project directory.

use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::info;

use super::common::{load_config, project};
use crate::ExitCode;

/// Runs the unpack command.
///
/// # Arguments
///
/// * `savegame` - Savegame JSON file to read
/// * `dir` - Project directory to unpack into (created if missing)
///
/// # Errors
///
/// Returns an error if the savegame cannot be read or parsed, or if
/// unpacking fails.
pub fn run(savegame: &Path, dir: &Path) -> Result<ExitCode> {
    info!("Unpacking {}", savegame.display());

    let config = load_config(dir)?;
    let content = fs::read_to_string(savegame)
        .with_context(|| format!("Failed to read savegame {}", savegame.display()))?;
    let document: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse savegame {}", savegame.display()))?;

    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    tts_savegame::unpack(&document, &project(dir, &config), &config)
        .with_context(|| format!("Failed to unpack into {}", dir.display()))?;

    println!("✓ Unpacked {} into {}", savegame.display(), dir.display());
    Ok(ExitCode::SUCCESS)
}
