//! Bundling and unbundling with a shared module registry.

use crate::engine::{BundleEngine, BundleOptions, ModuleMap, is_bundle};
use crate::error::{BundleError, Result};
use crate::native::NativeEngine;
use crate::session::EngineSession;

/// Fuses scripts with the modules they require.
///
/// # Examples
///
/// ```
/// use tts_luabundle::{Bundler, ModuleMap, Unbundler};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut modules = ModuleMap::new();
/// modules.insert("util".to_string(), "return { answer = 42 }".to_string());
///
/// let mut bundler = Bundler::new()?;
/// bundler.load_modules(&modules)?;
/// let bundle = bundler.bundle("local util = require(\"util\")")?;
///
/// let mut unbundler = Unbundler::new()?;
/// assert_eq!(unbundler.unbundle(&bundle)?, "local util = require(\"util\")");
/// assert_eq!(unbundler.modules(), &modules);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Bundler<E: BundleEngine = NativeEngine> {
    session: EngineSession<E>,
    options: BundleOptions,
}

impl Bundler<NativeEngine> {
    /// Creates a bundler backed by the in-process engine.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine fails to start.
    pub fn new() -> Result<Self> {
        Self::with_engine(NativeEngine::new())
    }
}

impl<E: BundleEngine> Bundler<E> {
    /// Creates a bundler that drives `engine`.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine fails to start.
    pub fn with_engine(engine: E) -> Result<Self> {
        Ok(Self {
            session: EngineSession::open(engine)?,
            options: BundleOptions::default(),
        })
    }

    /// Makes `modules` available to later [`bundle`](Self::bundle) calls.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine rejects the files.
    pub fn load_modules(&mut self, modules: &ModuleMap) -> Result<()> {
        tracing::debug!("Loading {} modules into bundler", modules.len());
        self.session.engine()?.write_files(modules)
    }

    /// Returns `script` fused with every module it requires.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::UnresolvedModule`] if a required module was not
    /// loaded.
    pub fn bundle(&mut self, script: &str) -> Result<String> {
        let options = &self.options;
        self.session.engine()?.bundle_string(script, options)
    }

    /// Shuts the engine down.
    ///
    /// # Errors
    ///
    /// Returns an error if engine teardown fails.
    pub fn close(self) -> Result<()> {
        self.session.close()
    }
}

/// Splits bundles back into their root script and a registry of modules.
///
/// The registry is shared by every [`unbundle`](Self::unbundle) call on one
/// instance: a module name must map to the same content in every bundle.
#[derive(Debug)]
pub struct Unbundler<E: BundleEngine = NativeEngine> {
    session: EngineSession<E>,
    modules: ModuleMap,
}

impl Unbundler<NativeEngine> {
    /// Creates an unbundler backed by the in-process engine.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine fails to start.
    pub fn new() -> Result<Self> {
        Self::with_engine(NativeEngine::new())
    }
}

impl<E: BundleEngine> Unbundler<E> {
    /// Creates an unbundler that drives `engine`.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine fails to start.
    pub fn with_engine(engine: E) -> Result<Self> {
        Ok(Self {
            session: EngineSession::open(engine)?,
            modules: ModuleMap::new(),
        })
    }

    /// Returns the root script of `script`, recording its other modules.
    ///
    /// Scripts without the bundle signature are returned unchanged.
    ///
    /// # Errors
    ///
    /// - [`BundleError::InconsistentModule`] if a module was already recorded
    ///   with different content
    /// - [`BundleError::MalformedBundle`] if the bundle cannot be split or has
    ///   no root module
    pub fn unbundle(&mut self, script: &str) -> Result<String> {
        if !is_bundle(script) {
            return Ok(script.to_string());
        }

        let mut unbundled = self.session.engine()?.unbundle_string(script)?;
        let root_name = unbundled.metadata.root_module_name;
        let root = unbundled
            .modules
            .remove(&root_name)
            .ok_or_else(|| BundleError::MalformedBundle {
                reason: format!("root module {root_name} is missing"),
            })?;

        for (name, module) in unbundled.modules {
            match self.modules.get(&name) {
                Some(existing) if *existing != module.content => {
                    return Err(BundleError::InconsistentModule { name });
                }
                Some(_) => {}
                None => {
                    tracing::debug!("Recorded module {}", name);
                    self.modules.insert(name, module.content);
                }
            }
        }

        Ok(root.content)
    }

    /// Modules recorded so far.
    #[must_use]
    pub const fn modules(&self) -> &ModuleMap {
        &self.modules
    }

    /// Shuts the engine down and returns the recorded modules.
    ///
    /// # Errors
    ///
    /// Returns an error if engine teardown fails.
    pub fn finish(self) -> Result<ModuleMap> {
        self.session.close()?;
        Ok(self.modules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Metadata, MockBundleEngine, Module, UnbundledData};
    use std::collections::BTreeMap;

    fn bundle_with(modules: &[(&str, &str)], root: &str) -> String {
        let map: ModuleMap = modules
            .iter()
            .map(|(name, content)| ((*name).to_string(), (*content).to_string()))
            .collect();
        let mut bundler = Bundler::new().unwrap();
        bundler.load_modules(&map).unwrap();
        bundler.bundle(root).unwrap()
    }

    #[test]
    fn test_plain_script_passes_through() {
        let mut unbundler = Unbundler::new().unwrap();
        let script = "print('not bundled')\n";

        assert_eq!(unbundler.unbundle(script).unwrap(), script);
        assert!(unbundler.modules().is_empty());
    }

    #[test]
    fn test_same_module_recorded_once() {
        let first = bundle_with(&[("util", "return 1")], "require('util') print('a')");
        let second = bundle_with(&[("util", "return 1")], "require('util') print('b')");

        let mut unbundler = Unbundler::new().unwrap();
        assert_eq!(
            unbundler.unbundle(&first).unwrap(),
            "require('util') print('a')"
        );
        assert_eq!(
            unbundler.unbundle(&second).unwrap(),
            "require('util') print('b')"
        );
        assert_eq!(unbundler.modules().len(), 1);
        assert_eq!(unbundler.modules()["util"], "return 1");
    }

    #[test]
    fn test_divergent_module_is_rejected() {
        let first = bundle_with(&[("util", "return 1")], "require('util')");
        let second = bundle_with(&[("util", "return 1")], "require('util')");
        let third = bundle_with(&[("util", "return 2")], "require('util')");

        let mut unbundler = Unbundler::new().unwrap();
        unbundler.unbundle(&first).unwrap();
        unbundler.unbundle(&second).unwrap();
        let err = unbundler.unbundle(&third).unwrap_err();

        assert!(matches!(err, BundleError::InconsistentModule { ref name } if name == "util"));
        assert_eq!(err.to_string(), "Inconsistent module util");
        assert_eq!(unbundler.modules()["util"], "return 1");
    }

    #[test]
    fn test_root_module_is_not_recorded() {
        let bundle = bundle_with(&[("util", "return 1")], "require('util')");
        let mut unbundler = Unbundler::new().unwrap();
        unbundler.unbundle(&bundle).unwrap();

        assert!(!unbundler.modules().contains_key("__root"));
    }

    #[test]
    fn test_finish_returns_registry() {
        let bundle = bundle_with(
            &[("a", "return 'a'"), ("b", "return 'b'")],
            "require('a') require('b')",
        );
        let mut unbundler = Unbundler::new().unwrap();
        unbundler.unbundle(&bundle).unwrap();

        let modules = unbundler.finish().unwrap();
        assert_eq!(modules.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_missing_root_module_is_malformed() {
        let mut engine = MockBundleEngine::new();
        engine.expect_start().returning(|| Ok(()));
        engine.expect_unbundle_string().returning(|_| {
            let mut modules = BTreeMap::new();
            modules.insert(
                "util".to_string(),
                Module {
                    name: "util".to_string(),
                    content: "return 1".to_string(),
                },
            );
            Ok(UnbundledData {
                metadata: Metadata {
                    lua_version: "5.2".to_string(),
                    root_module_name: "__root".to_string(),
                    version: "1.6.0".to_string(),
                },
                modules,
            })
        });
        engine.expect_shutdown().times(1).returning(|| Ok(()));

        let mut unbundler = Unbundler::with_engine(engine).unwrap();
        let err = unbundler
            .unbundle("-- Bundled by luabundle {}\n")
            .unwrap_err();
        assert!(matches!(err, BundleError::MalformedBundle { .. }));
    }

    #[test]
    fn test_bundler_shuts_engine_down_after_error() {
        let mut engine = MockBundleEngine::new();
        engine.expect_start().times(1).returning(|| Ok(()));
        engine.expect_bundle_string().times(1).returning(|_, _| {
            Err(BundleError::UnresolvedModule {
                name: "missing".to_string(),
            })
        });
        engine.expect_shutdown().times(1).returning(|| Ok(()));

        let mut bundler = Bundler::with_engine(engine).unwrap();
        assert!(bundler.bundle("require('missing')").is_err());
    }

    #[test]
    fn test_bundler_passes_fixed_options() {
        let mut engine = MockBundleEngine::new();
        engine.expect_start().returning(|| Ok(()));
        engine
            .expect_bundle_string()
            .withf(|_, options| {
                options.lua_version == "5.2"
                    && options.isolate
                    && options.metadata
                    && options.paths == ["?"]
            })
            .returning(|script, _| Ok(script.to_string()));
        engine.expect_shutdown().returning(|| Ok(()));

        let mut bundler = Bundler::with_engine(engine).unwrap();
        assert_eq!(bundler.bundle("print(1)").unwrap(), "print(1)");
        bundler.close().unwrap();
    }
}
