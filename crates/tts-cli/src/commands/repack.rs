//! Repack command implementation.
//!
//! Packs the project directory into a savegame file.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::info;
use tts_savegame::format_json;

use super::common::{load_config, project};
use crate::ExitCode;

/// Runs the repack command.
///
/// # Arguments
///
/// * `output` - Savegame file to write; parent directories are created
/// * `dir` - Project directory to pack
///
/// # Errors
///
/// Returns an error if the tree cannot be repacked or the output cannot be
/// written.
pub fn run(output: &Path, dir: &Path) -> Result<ExitCode> {
    info!("Repacking {}", dir.display());

    let config = load_config(dir)?;
    let document = tts_savegame::repack(&project(dir, &config), &config)
        .with_context(|| format!("Failed to repack {}", dir.display()))?;
    let content = format_json(&document, config.json_format())?;

    if let Some(parent) = output.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    fs::write(output, content)
        .with_context(|| format!("Failed to write savegame {}", output.display()))?;

    println!("✓ Repacked {} into {}", dir.display(), output.display());
    Ok(ExitCode::SUCCESS)
}
