//! Directory layouts of unpacked savegames and objects.
//!
//! ```text
//! <root>/
//! ├── savegame.json          # everything not split out below
//! ├── script.lua
//! ├── script-state.json
//! ├── note.txt
//! ├── ui.xml
//! ├── modules/               # shared Lua modules
//! └── objects/
//!     ├── index.list
//!     └── <name>/
//!         ├── object.json
//!         ├── script.lua
//!         ├── script-state.json
//!         ├── ui.xml
//!         └── contained/     # same layout, recursively
//! ```
//!
//! Accessors only bind paths; I/O happens when the returned slot or index
//! is used.

use crate::files::{JsonFile, TextFile};
use crate::format::JsonFormat;
use crate::index::{UnpackedIndex, UnpackedNode};
use crate::modules::ModuleStore;
use std::path::{Path, PathBuf};

/// Residual savegame JSON.
pub const SAVEGAME_FILE: &str = "savegame.json";
/// Residual object JSON.
pub const OBJECT_FILE: &str = "object.json";
/// Lua script.
pub const SCRIPT_FILE: &str = "script.lua";
/// Lua script state.
pub const SCRIPT_STATE_FILE: &str = "script-state.json";
/// XML UI markup.
pub const XML_UI_FILE: &str = "ui.xml";
/// Savegame notebook text.
pub const NOTE_FILE: &str = "note.txt";
/// Top-level objects of a savegame.
pub const OBJECTS_DIR: &str = "objects";
/// Objects contained in another object.
pub const CONTAINED_DIR: &str = "contained";
/// Shared Lua modules.
pub const MODULES_DIR: &str = "modules";

/// An unpacked object directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnpackedObject {
    path: PathBuf,
    format: JsonFormat,
}

impl UnpackedObject {
    /// Directory of this object.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `object.json`
    #[must_use]
    pub fn object(&self) -> JsonFile {
        JsonFile::new(self.path.join(OBJECT_FILE), self.format)
    }

    /// `script.lua`
    #[must_use]
    pub fn script(&self) -> TextFile {
        TextFile::new(self.path.join(SCRIPT_FILE))
    }

    /// `script-state.json`
    #[must_use]
    pub fn script_state(&self) -> JsonFile {
        JsonFile::new(self.path.join(SCRIPT_STATE_FILE), self.format)
    }

    /// `ui.xml`
    #[must_use]
    pub fn xml_ui(&self) -> TextFile {
        TextFile::new(self.path.join(XML_UI_FILE))
    }

    /// `contained/`
    #[must_use]
    pub fn contained(&self) -> UnpackedIndex<Self> {
        UnpackedIndex::new(self.path.join(CONTAINED_DIR), self.format)
    }
}

impl UnpackedNode for UnpackedObject {
    fn at(path: PathBuf, format: JsonFormat) -> Self {
        Self { path, format }
    }
}

/// An unpacked savegame root directory.
///
/// # Examples
///
/// ```
/// use tts_savegame::{JsonFormat, UnpackedSavegame};
///
/// let unpacked = UnpackedSavegame::new("my-mod", JsonFormat::default());
/// assert!(unpacked.script().path().ends_with("script.lua"));
/// assert!(unpacked.objects().path().ends_with("objects"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnpackedSavegame {
    path: PathBuf,
    format: JsonFormat,
}

impl UnpackedSavegame {
    /// Binds a savegame layout to `path`. No I/O is performed.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, format: JsonFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    /// Root directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `savegame.json`
    #[must_use]
    pub fn savegame(&self) -> JsonFile {
        JsonFile::new(self.path.join(SAVEGAME_FILE), self.format)
    }

    /// `script.lua`
    #[must_use]
    pub fn script(&self) -> TextFile {
        TextFile::new(self.path.join(SCRIPT_FILE))
    }

    /// `script-state.json`
    #[must_use]
    pub fn script_state(&self) -> JsonFile {
        JsonFile::new(self.path.join(SCRIPT_STATE_FILE), self.format)
    }

    /// `note.txt`
    #[must_use]
    pub fn note(&self) -> TextFile {
        TextFile::new(self.path.join(NOTE_FILE))
    }

    /// `ui.xml`
    #[must_use]
    pub fn xml_ui(&self) -> TextFile {
        TextFile::new(self.path.join(XML_UI_FILE))
    }

    /// `objects/`
    #[must_use]
    pub fn objects(&self) -> UnpackedIndex<UnpackedObject> {
        UnpackedIndex::new(self.path.join(OBJECTS_DIR), self.format)
    }

    /// `modules/`
    #[must_use]
    pub fn modules(&self) -> ModuleStore {
        ModuleStore::new(self.path.join(MODULES_DIR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_accessors_perform_no_io() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("never-created");
        let unpacked = UnpackedSavegame::new(&root, JsonFormat::default());

        let _ = unpacked.savegame();
        let _ = unpacked.note();
        let _ = unpacked.objects();
        let _ = unpacked.modules();

        assert!(!root.exists());
    }

    #[test]
    fn test_object_layout() {
        let temp = TempDir::new().unwrap();
        let unpacked = UnpackedSavegame::new(temp.path(), JsonFormat::default());
        let object = unpacked.objects().child("abc123", true).unwrap();

        assert_eq!(object.path(), temp.path().join("objects").join("abc123"));
        assert_eq!(object.object().path(), object.path().join("object.json"));
        assert_eq!(object.script().path(), object.path().join("script.lua"));
        assert_eq!(
            object.script_state().path(),
            object.path().join("script-state.json")
        );
        assert_eq!(object.xml_ui().path(), object.path().join("ui.xml"));
        assert_eq!(object.contained().path(), object.path().join("contained"));
    }

    #[test]
    fn test_nested_objects() {
        let temp = TempDir::new().unwrap();
        let unpacked = UnpackedSavegame::new(temp.path(), JsonFormat::default());

        let bag = unpacked.objects().child("bag", true).unwrap();
        let card = bag.contained().child("card", true).unwrap();
        card.script().write_text("print('card')").unwrap();

        assert!(
            temp.path()
                .join("objects/bag/contained/card/script.lua")
                .is_file()
        );
    }
}
