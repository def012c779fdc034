//! Error types for bundling operations.

/// Result type for bundling operations.
pub type Result<T> = std::result::Result<T, BundleError>;

/// Errors that can occur while bundling or unbundling Lua scripts.
#[derive(thiserror::Error, Debug)]
pub enum BundleError {
    /// A `require` call names a module the engine has no source for.
    ///
    /// Load the module with [`Bundler::load_modules`](crate::Bundler::load_modules)
    /// before bundling a script that requires it.
    #[error("Module not found: {name}")]
    UnresolvedModule {
        /// Name passed to `require`
        name: String,
    },

    /// The same module name was found with two different sources.
    ///
    /// Module names are shared across every script seen by one
    /// [`Unbundler`](crate::Unbundler), so two bundles that embed a module
    /// called `name` must embed byte-identical content.
    #[error("Inconsistent module {name}")]
    InconsistentModule {
        /// Name of the module whose contents disagree
        name: String,
    },

    /// A script carrying the bundle signature could not be parsed.
    #[error("Malformed bundle: {reason}")]
    MalformedBundle {
        /// Description of what is wrong with the bundle
        reason: String,
    },

    /// The engine was used after it was shut down.
    #[error("Bundle engine is not running")]
    EngineNotRunning,

    /// JSON error while reading or writing bundle metadata.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BundleError {
    /// Returns true if this error is caused by the input scripts rather than
    /// by the engine itself.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::UnresolvedModule { .. }
                | Self::InconsistentModule { .. }
                | Self::MalformedBundle { .. }
        )
    }
}
