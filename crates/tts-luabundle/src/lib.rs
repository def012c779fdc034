//! Lua script bundling for Tabletop Simulator mods.
//!
//! Tabletop Simulator stores each object's script as a single Lua source.
//! Tooling such as luabundle fuses a root script and the modules it
//! `require`s into one self-contained script, and embeds enough metadata to
//! split it back apart. This crate provides both directions:
//!
//! - [`Bundler`] fuses a script with previously loaded modules
//! - [`Unbundler`] splits bundles and keeps a registry of every module seen,
//!   rejecting a module name that shows up with two different sources
//!
//! # Architecture
//!
//! The fusion itself is delegated to a [`BundleEngine`]. Engines are
//! stateful sessions, so they are always owned through an [`EngineSession`]
//! which starts them on construction and shuts them down on every exit path.
//! [`NativeEngine`] is the in-process implementation of the luabundle format.
//!
//! # Examples
//!
//! ```
//! use tts_luabundle::{Bundler, ModuleMap, Unbundler};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut modules = ModuleMap::new();
//! modules.insert("deck".to_string(), "return { size = 52 }".to_string());
//!
//! let mut bundler = Bundler::new()?;
//! bundler.load_modules(&modules)?;
//! let script = bundler.bundle("local deck = require(\"deck\")\nprint(deck.size)")?;
//! bundler.close()?;
//!
//! let mut unbundler = Unbundler::new()?;
//! let root = unbundler.unbundle(&script)?;
//! assert_eq!(root, "local deck = require(\"deck\")\nprint(deck.size)");
//! assert_eq!(unbundler.finish()?, modules);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod bundler;
pub mod engine;
pub mod error;
pub mod native;
pub mod session;

pub use bundler::{Bundler, Unbundler};
pub use engine::{
    BUNDLE_SIGNATURE, BundleEngine, BundleOptions, Metadata, Module, ModuleMap, ROOT_MODULE_NAME,
    UnbundledData, is_bundle,
};
pub use error::{BundleError, Result};
pub use native::{LUABUNDLE_VERSION, NativeEngine, find_requires};
pub use session::EngineSession;
