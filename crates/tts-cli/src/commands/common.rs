//! Helpers shared by the command implementations.

use anyhow::{Context, Result};
use std::path::Path;
use tts_savegame::{CONFIG_NAME, Config, UnpackedSavegame};

/// Loads `tts-mod.toml` from the project directory `dir`.
///
/// A missing file yields the default configuration.
///
/// # Errors
///
/// Returns an error if the configuration exists but is invalid.
pub fn load_config(dir: &Path) -> Result<Config> {
    let path = dir.join(CONFIG_NAME);
    let config = Config::load(&path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    tracing::debug!("Configuration: {:?}", config);
    Ok(config)
}

/// Binds the unpacked savegame layout to `dir`.
#[must_use]
pub fn project(dir: &Path, config: &Config) -> UnpackedSavegame {
    UnpackedSavegame::new(dir, config.json_format())
}
