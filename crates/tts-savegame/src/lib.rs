//! Tabletop Simulator savegames as directory trees.
//!
//! A savegame is a single large JSON document in which every object carries
//! its own Lua script, saved script state and XML UI. This crate unpacks such
//! a document into a directory tree that diffs well under version control,
//! and repacks the tree into an equivalent document.
//!
//! # Layout
//!
//! ```text
//! my-mod/
//! ├── savegame.json
//! ├── script.lua
//! ├── modules/
//! │   └── util.lua
//! └── objects/
//!     ├── index.list
//!     └── a1b2c3/
//!         ├── object.json
//!         ├── script.lua
//!         └── contained/
//! ```
//!
//! Sibling order is kept in `index.list` manifests (see [`UnpackedIndex`]).
//! Scripts produced by luabundle are split into their root script and the
//! shared modules under `modules/`; repacking bundles them again.
//!
//! # Examples
//!
//! ```
//! use serde_json::json;
//! use tts_savegame::{Config, UnpackedSavegame, repack, unpack};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! # let temp = tempfile::tempdir()?;
//! let config = Config::default();
//! let unpacked = UnpackedSavegame::new(temp.path(), config.json_format());
//!
//! let savegame = json!({
//!     "SaveName": "Demo",
//!     "ObjectStates": [
//!         {"GUID": "a1b2c3", "Name": "Bag", "ContainedObjects": [{"GUID": "d4e5f6"}]},
//!         {"GUID": "0f0f0f", "Name": "Card", "LuaScript": "print('card')"}
//!     ]
//! });
//!
//! unpack(&savegame, &unpacked, &config)?;
//! assert_eq!(repack(&unpacked, &config)?, savegame);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod config;
pub mod document;
pub mod error;
pub mod files;
pub mod format;
pub mod index;
pub mod layout;
pub mod modules;
pub mod name;
pub mod repack;
pub mod unpack;

pub use config::{BundleConfig, CONFIG_NAME, Config, FormatConfig};
pub use error::{Result, SavegameError};
pub use files::{JsonFile, TextFile};
pub use format::{JsonFormat, format_json, to_unix};
pub use index::{Children, INDEX_FILE, UnpackedIndex, UnpackedNode};
pub use layout::{UnpackedObject, UnpackedSavegame};
pub use modules::ModuleStore;
pub use name::{verify_module_name, verify_name};
pub use repack::repack;
pub use unpack::unpack;
