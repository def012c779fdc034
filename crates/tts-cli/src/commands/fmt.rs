//! Fmt command implementation.
//!
//! Rewrites the project directory in canonical form by repacking it and
//! unpacking the result in place.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use super::common::{load_config, project};
use crate::ExitCode;

/// Runs the fmt command.
///
/// # Errors
///
/// Returns an error if the tree cannot be repacked or unpacked.
pub fn run(dir: &Path) -> Result<ExitCode> {
    info!("Formatting {}", dir.display());

    let config = load_config(dir)?;
    let unpacked = project(dir, &config);
    let document = tts_savegame::repack(&unpacked, &config)
        .with_context(|| format!("Failed to repack {}", dir.display()))?;
    tts_savegame::unpack(&document, &unpacked, &config)
        .with_context(|| format!("Failed to unpack into {}", dir.display()))?;

    println!("✓ Formatted {}", dir.display());
    Ok(ExitCode::SUCCESS)
}
