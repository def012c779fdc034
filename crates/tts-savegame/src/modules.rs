//! On-disk store for Lua modules shared between scripts.
//!
//! Each module is stored as `<name>.lua` under the store directory, with
//! `/` in module names mapping to subdirectories:
//!
//! ```text
//! modules/
//! ├── util.lua            # require("util")
//! └── lib/
//!     └── deck.lua        # require("lib/deck")
//! ```

use crate::error::{Result, SavegameError};
use crate::name::verify_module_name;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use tts_luabundle::ModuleMap;
use walkdir::WalkDir;

const MODULE_EXTENSION: &str = "lua";

/// Directory of shared Lua modules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleStore {
    path: PathBuf,
}

impl ModuleStore {
    /// Binds a module store to `path`. No I/O is performed.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn module_path(&self, name: &str) -> PathBuf {
        self.path.join(format!("{name}.{MODULE_EXTENSION}"))
    }

    /// Reads every module in the store.
    ///
    /// Returns an empty map if the store directory does not exist. Files
    /// without the `.lua` extension are ignored.
    ///
    /// # Errors
    ///
    /// - [`SavegameError::InvalidName`] if a module path is not a valid
    ///   module name
    /// - I/O errors while walking the directory or reading files
    pub fn read_all(&self) -> Result<ModuleMap> {
        let mut modules = ModuleMap::new();
        if !self.path.is_dir() {
            return Ok(modules);
        }

        for entry in WalkDir::new(&self.path).sort_by_file_name() {
            let entry = entry.map_err(io::Error::from)?;
            if !entry.file_type().is_file() || !has_module_extension(entry.path()) {
                continue;
            }

            let name = self.module_name(entry.path())?;
            let content = fs::read_to_string(entry.path())?;
            modules.insert(name, content);
        }

        tracing::debug!(
            "Read {} modules from {}",
            modules.len(),
            self.path.display()
        );
        Ok(modules)
    }

    /// Replaces the store contents with `modules`.
    ///
    /// All names are validated before anything is written. Module sources
    /// are written verbatim. `.lua` files that do not belong to any module
    /// are removed, as are directories left empty. An empty map removes every
    /// module and then the store directory itself, unless other files remain.
    ///
    /// # Errors
    ///
    /// - [`SavegameError::InvalidName`] if a module name is invalid
    /// - I/O errors while writing or removing files
    pub fn write_all(&self, modules: &ModuleMap) -> Result<()> {
        for name in modules.keys() {
            verify_module_name(name)?;
        }

        if modules.is_empty() {
            if self.path.is_dir() {
                self.prune(modules)?;
                if fs::read_dir(&self.path)?.next().is_none() {
                    fs::remove_dir(&self.path)?;
                    tracing::debug!("Removed module store {}", self.path.display());
                }
            }
            return Ok(());
        }

        for (name, content) in modules {
            let path = self.module_path(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, content)?;
        }

        self.prune(modules)?;

        tracing::debug!(
            "Wrote {} modules to {}",
            modules.len(),
            self.path.display()
        );
        Ok(())
    }

    fn prune(&self, modules: &ModuleMap) -> Result<()> {
        for entry in WalkDir::new(&self.path).contents_first(true) {
            let entry = entry.map_err(io::Error::from)?;
            let path = entry.path();

            if entry.file_type().is_dir() {
                if path != self.path && fs::read_dir(path)?.next().is_none() {
                    fs::remove_dir(path)?;
                }
            } else if has_module_extension(path) {
                let known = self
                    .module_name(path)
                    .is_ok_and(|name| modules.contains_key(&name));
                if !known {
                    fs::remove_file(path)?;
                    tracing::debug!("Removed stale module {}", path.display());
                }
            }
        }
        Ok(())
    }

    /// Maps a file inside the store back to its module name.
    fn module_name(&self, path: &Path) -> Result<String> {
        let invalid = || SavegameError::InvalidName {
            name: path.display().to_string(),
        };

        let relative = path.strip_prefix(&self.path).map_err(|_| invalid())?;
        let relative = relative.with_extension("");
        let segments = relative
            .components()
            .map(|component| match component {
                Component::Normal(segment) => segment.to_str().ok_or_else(invalid),
                _ => Err(invalid()),
            })
            .collect::<Result<Vec<_>>>()?;

        let name = segments.join("/");
        verify_module_name(&name)?;
        Ok(name)
    }
}

fn has_module_extension(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == MODULE_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn module_map(entries: &[(&str, &str)]) -> ModuleMap {
        entries
            .iter()
            .map(|(name, content)| ((*name).to_string(), (*content).to_string()))
            .collect()
    }

    #[test]
    fn test_missing_store_reads_empty() {
        let temp = TempDir::new().unwrap();
        let store = ModuleStore::new(temp.path().join("modules"));
        assert!(store.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_round_trip_with_nested_names() {
        let temp = TempDir::new().unwrap();
        let store = ModuleStore::new(temp.path().join("modules"));
        let modules = module_map(&[
            ("util", "return {}\r\n"),
            ("lib/deck", "return { size = 52 }"),
            ("lib.json", "return json"),
        ]);

        store.write_all(&modules).unwrap();

        assert!(store.path().join("lib/deck.lua").is_file());
        assert!(store.path().join("lib.json.lua").is_file());
        assert_eq!(store.read_all().unwrap(), modules);
    }

    #[test]
    fn test_stale_modules_removed() {
        let temp = TempDir::new().unwrap();
        let store = ModuleStore::new(temp.path().join("modules"));
        store
            .write_all(&module_map(&[("util", "a"), ("old/thing", "b")]))
            .unwrap();
        fs::write(store.path().join("README.md"), "notes").unwrap();

        store.write_all(&module_map(&[("util", "a")])).unwrap();

        assert!(!store.path().join("old").exists());
        assert!(store.path().join("README.md").is_file());
        assert_eq!(store.read_all().unwrap(), module_map(&[("util", "a")]));
    }

    #[test]
    fn test_empty_map_removes_store() {
        let temp = TempDir::new().unwrap();
        let store = ModuleStore::new(temp.path().join("modules"));
        store.write_all(&module_map(&[("util", "a")])).unwrap();

        store.write_all(&ModuleMap::new()).unwrap();
        assert!(!store.path().exists());
    }

    #[test]
    fn test_empty_map_keeps_other_files() {
        let temp = TempDir::new().unwrap();
        let store = ModuleStore::new(temp.path().join("modules"));
        store
            .write_all(&module_map(&[("util", "a"), ("lib/deck", "b")]))
            .unwrap();
        fs::write(store.path().join("README.md"), "notes").unwrap();

        store.write_all(&ModuleMap::new()).unwrap();

        assert!(store.path().join("README.md").is_file());
        assert!(!store.path().join("util.lua").exists());
        assert!(!store.path().join("lib").exists());
        assert!(store.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_invalid_name_rejected_before_writing() {
        let temp = TempDir::new().unwrap();
        let store = ModuleStore::new(temp.path().join("modules"));

        let err = store
            .write_all(&module_map(&[("good", "a"), ("../evil", "b")]))
            .unwrap_err();
        assert!(matches!(err, SavegameError::InvalidName { .. }));
        assert!(!store.path().exists());
    }
}
