//! Per-project configuration.
//!
//! Configuration is stored in TOML format next to the unpacked savegame:
//!
//! ```toml
//! [format]
//! indent = 2
//!
//! [bundle]
//! enabled = true
//! ```

use crate::error::{Result, SavegameError};
use crate::format::JsonFormat;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// File name of the project configuration inside the unpacked directory.
pub const CONFIG_NAME: &str = "tts-mod.toml";

const MAX_INDENT: usize = 8;

/// Project configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Config {
    /// JSON output settings
    #[serde(default)]
    pub format: FormatConfig,

    /// Script bundling settings
    #[serde(default)]
    pub bundle: BundleConfig,
}

/// JSON output settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FormatConfig {
    /// Indentation width for JSON files
    pub indent: usize,
}

/// Script bundling settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BundleConfig {
    /// Split bundled scripts on unpack and re-bundle them on repack
    pub enabled: bool,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self { indent: 2 }
    }
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Config {
    /// Loads configuration from `path`, falling back to defaults when the
    /// file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML, or
    /// contains invalid values.
    ///
    /// # Examples
    ///
    /// ```
    /// use tts_savegame::Config;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// # let temp = tempfile::tempdir()?;
    /// let config = Config::load(temp.path().join("tts-mod.toml"))?;
    /// assert_eq!(config, Config::default());
    /// # Ok(())
    /// # }
    /// ```
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.is_file() {
            tracing::debug!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;

        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SavegameError::Config`] if a value is out of range.
    pub fn validate(&self) -> Result<()> {
        if self.format.indent > MAX_INDENT {
            return Err(SavegameError::Config {
                reason: format!(
                    "format.indent must be between 0 and {MAX_INDENT}, got {}",
                    self.format.indent
                ),
            });
        }
        Ok(())
    }

    /// JSON layout derived from the `[format]` section.
    #[must_use]
    pub const fn json_format(&self) -> JsonFormat {
        JsonFormat::new(self.format.indent)
    }
}
