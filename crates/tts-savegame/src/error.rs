//! Error types for savegame operations.

use std::path::PathBuf;
use tts_luabundle::BundleError;

/// Result type for savegame operations.
pub type Result<T> = std::result::Result<T, SavegameError>;

/// Errors that can occur while unpacking or repacking a savegame.
#[derive(thiserror::Error, Debug)]
pub enum SavegameError {
    /// A file or directory name failed validation.
    ///
    /// Item names end up as path segments and in `index.list`, so they may
    /// only contain Unicode letters, digits, `_` and `-`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tts_savegame::{SavegameError, verify_name};
    ///
    /// let err = verify_name("../escape").unwrap_err();
    /// assert!(matches!(err, SavegameError::InvalidName { .. }));
    /// ```
    #[error("Item names must only contain alphanumeric characters and '_' and '-': '{name}'")]
    InvalidName {
        /// The rejected name
        name: String,
    },

    /// An expected file or directory does not exist.
    ///
    /// Raised when an object listed in `index.list` has no directory, or when
    /// repacking a directory without `savegame.json`.
    #[error("Not found: {}", path.display())]
    NotFound {
        /// Path that was expected to exist
        path: PathBuf,
    },

    /// The savegame document does not have the expected shape.
    #[error("Invalid savegame document: {reason}")]
    InvalidDocument {
        /// Description of the problem
        reason: String,
    },

    /// The project configuration is invalid.
    #[error("Configuration error: {reason}")]
    Config {
        /// Description of the problem
        reason: String,
    },

    /// Bundling or unbundling a script failed.
    #[error("Bundle error: {0}")]
    Bundle(#[from] BundleError),

    /// I/O error occurred during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The configuration file is not valid TOML.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl SavegameError {
    /// Returns true if this error is caused by user input (names, documents,
    /// configuration, scripts) rather than by the system.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::InvalidName { .. }
            | Self::NotFound { .. }
            | Self::InvalidDocument { .. }
            | Self::Config { .. }
            | Self::Toml(_) => true,
            Self::Bundle(e) => e.is_recoverable(),
            Self::Io(_) | Self::Json(_) => false,
        }
    }
}
