//! Bundling engine interface.
//!
//! A [`BundleEngine`] performs the actual fusion and splitting of Lua
//! sources. It is a stateful session: it must be started before use, keeps
//! its own set of resolvable module files, and must be shut down afterwards.
//! [`EngineSession`](crate::EngineSession) takes care of the lifecycle.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// First-line marker written at the top of every bundled script.
pub const BUNDLE_SIGNATURE: &str = "-- Bundled by luabundle ";

/// Default name given to the script a bundle was built from.
pub const ROOT_MODULE_NAME: &str = "__root";

/// Mapping from module name to module source.
pub type ModuleMap = BTreeMap<String, String>;

/// Returns true if `script` starts with the bundle signature.
///
/// # Examples
///
/// ```
/// use tts_luabundle::is_bundle;
///
/// assert!(is_bundle("-- Bundled by luabundle {\"version\":\"1.6.0\"}\n"));
/// assert!(!is_bundle("print('hello')"));
/// ```
#[must_use]
pub fn is_bundle(script: &str) -> bool {
    script.starts_with(BUNDLE_SIGNATURE)
}

/// Options passed to [`BundleEngine::bundle_string`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleOptions {
    /// Target Lua dialect recorded in the metadata
    pub lua_version: String,
    /// Do not fall back to the host `require` for unknown modules
    pub isolate: bool,
    /// Module search templates, `?` is replaced by the module name
    pub paths: Vec<String>,
    /// Embed metadata so the bundle can be unbundled later
    pub metadata: bool,
    /// Name under which the input script is registered
    pub root_module_name: String,
}

impl Default for BundleOptions {
    fn default() -> Self {
        Self {
            lua_version: "5.2".to_string(),
            isolate: true,
            paths: vec!["?".to_string()],
            metadata: true,
            root_module_name: ROOT_MODULE_NAME.to_string(),
        }
    }
}

/// Metadata embedded on the first line of a bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    /// Target Lua dialect
    pub lua_version: String,
    /// Name of the module the bundle evaluates on load
    #[serde(default = "default_root_module_name")]
    pub root_module_name: String,
    /// Version of the bundler that produced the script
    pub version: String,
}

fn default_root_module_name() -> String {
    ROOT_MODULE_NAME.to_string()
}

/// One module recovered from a bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    /// Registered module name
    pub name: String,
    /// Module source
    pub content: String,
}

/// Result of splitting a bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnbundledData {
    /// Metadata from the bundle header
    pub metadata: Metadata,
    /// Every registered module, the root module included
    pub modules: BTreeMap<String, Module>,
}

/// A stateful bundling engine.
///
/// Calls must be issued sequentially; every method takes `&mut self`.
#[cfg_attr(test, mockall::automock)]
pub trait BundleEngine {
    /// Starts the engine session.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot be brought up.
    fn start(&mut self) -> Result<()>;

    /// Makes `files` resolvable by later [`bundle_string`](Self::bundle_string)
    /// calls.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine is not running.
    fn write_files(&mut self, files: &ModuleMap) -> Result<()>;

    /// Fuses `script` and every module it transitively requires.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::UnresolvedModule`](crate::BundleError::UnresolvedModule)
    /// if a required module was never written.
    fn bundle_string(&mut self, script: &str, options: &BundleOptions) -> Result<String>;

    /// Splits a bundled script back into its modules.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::MalformedBundle`](crate::BundleError::MalformedBundle)
    /// if `script` is not a well-formed bundle.
    fn unbundle_string(&mut self, script: &str) -> Result<UnbundledData>;

    /// Tears the session down and releases its state.
    ///
    /// # Errors
    ///
    /// Returns an error if teardown fails.
    fn shutdown(&mut self) -> Result<()>;
}
