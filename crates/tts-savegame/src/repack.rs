//! Directory tree -> savegame document.

use crate::config::Config;
use crate::document::{
    CONTAINED_OBJECTS_KEY, NOTE_KEY, OBJECT_STATES_KEY, Object, SCRIPT_KEY, SCRIPT_STATE_KEY,
    XML_UI_KEY, decode_script_state, put_text,
};
use crate::error::{Result, SavegameError};
use crate::files::JsonFile;
use crate::index::UnpackedIndex;
use crate::layout::{UnpackedObject, UnpackedSavegame};
use serde_json::Value;
use tts_luabundle::{Bundler, ModuleMap, find_requires};

/// Rebuilds the savegame document from the `unpacked` directory tree.
///
/// This is the inverse of [`unpack()`](crate::unpack()): scripts, states, UI
/// markup and the notebook are merged back into the residual documents and
/// objects are reassembled in `index.list` order. Scripts whose `require`d
/// modules are all found in `modules/` are bundled with those sources; any
/// other script is kept verbatim.
///
/// # Errors
///
/// - [`SavegameError::NotFound`] if `savegame.json` (or the `object.json` of a
///   listed object) does not exist
/// - [`SavegameError::InvalidDocument`] if a residual document is not a JSON
///   object
/// - [`SavegameError::InvalidName`] or [`SavegameError::NotFound`] for
///   corrupted `index.list` entries
/// - [`SavegameError::Bundle`] if a stored module requires an unknown module
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use tts_savegame::{Config, UnpackedSavegame, repack, unpack};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// # let temp = tempfile::tempdir()?;
/// let config = Config::default();
/// let unpacked = UnpackedSavegame::new(temp.path(), config.json_format());
///
/// let savegame = json!({"SaveName": "Demo", "Note": "Rules on page 3"});
/// unpack(&savegame, &unpacked, &config)?;
/// assert_eq!(repack(&unpacked, &config)?, savegame);
/// # Ok(())
/// # }
/// ```
pub fn repack(unpacked: &UnpackedSavegame, config: &Config) -> Result<Value> {
    tracing::info!("Repacking savegame from {}", unpacked.path().display());

    let mut repacker = Repacker {
        bundler: None,
        modules: ModuleMap::new(),
        objects: 0,
    };
    if config.bundle.enabled {
        let modules = unpacked.modules().read_all()?;
        let mut bundler = Bundler::new()?;
        bundler.load_modules(&modules)?;
        repacker.bundler = Some(bundler);
        repacker.modules = modules;
    }

    let mut root = read_residual(&unpacked.savegame())?;

    let script = repacker.bundle(unpacked.script().read_text()?)?;
    put_text(&mut root, SCRIPT_KEY, script);
    put_script_state(&mut root, unpacked.script_state().read_json()?)?;
    put_text(&mut root, XML_UI_KEY, unpacked.xml_ui().read_text()?);
    put_text(&mut root, NOTE_KEY, unpacked.note().read_text()?);
    repacker.repack_children(&mut root, OBJECT_STATES_KEY, &unpacked.objects())?;

    if let Some(bundler) = repacker.bundler {
        bundler.close()?;
    }

    tracing::info!("Repacked {} objects", repacker.objects);
    Ok(Value::Object(root))
}

fn read_residual(file: &JsonFile) -> Result<Object> {
    match file.read_json()? {
        Some(Value::Object(object)) => Ok(object),
        Some(_) => Err(SavegameError::InvalidDocument {
            reason: format!("{} must contain a JSON object", file.path().display()),
        }),
        None => Err(SavegameError::NotFound {
            path: file.path().to_path_buf(),
        }),
    }
}

fn put_script_state(object: &mut Object, state: Option<Value>) -> Result<()> {
    if let Some(state) = state {
        object.insert(
            SCRIPT_STATE_KEY.to_string(),
            Value::String(decode_script_state(state)?),
        );
    }
    Ok(())
}

struct Repacker {
    bundler: Option<Bundler>,
    /// Sources loaded into `bundler`
    modules: ModuleMap,
    objects: usize,
}

impl Repacker {
    /// Bundles `script` if it requires modules and all of them are stored.
    fn bundle(&mut self, script: String) -> Result<String> {
        let Some(bundler) = &mut self.bundler else {
            return Ok(script);
        };
        let requires = find_requires(&script);
        if requires.is_empty() {
            return Ok(script);
        }
        if let Some(missing) = requires.iter().find(|name| !self.modules.contains_key(*name)) {
            tracing::debug!("Keeping script verbatim, module '{missing}' is not stored");
            return Ok(script);
        }
        Ok(bundler.bundle(&script)?)
    }

    fn repack_children(
        &mut self,
        parent: &mut Object,
        key: &str,
        index: &UnpackedIndex<UnpackedObject>,
    ) -> Result<()> {
        if !index.exists() {
            return Ok(());
        }

        let mut children = Vec::new();
        for child in index.children()? {
            let (_, node) = child?;
            children.push(Value::Object(self.repack_object(&node)?));
        }
        parent.insert(key.to_string(), Value::Array(children));
        Ok(())
    }

    fn repack_object(&mut self, node: &UnpackedObject) -> Result<Object> {
        let mut object = read_residual(&node.object())?;

        let script = self.bundle(node.script().read_text()?)?;
        put_text(&mut object, SCRIPT_KEY, script);
        put_script_state(&mut object, node.script_state().read_json()?)?;
        put_text(&mut object, XML_UI_KEY, node.xml_ui().read_text()?);
        self.repack_children(&mut object, CONTAINED_OBJECTS_KEY, &node.contained())?;

        self.objects += 1;
        tracing::debug!("Repacked object {}", node.path().display());
        Ok(object)
    }
}
