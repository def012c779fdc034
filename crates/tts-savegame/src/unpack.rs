//! Savegame document -> directory tree.

use crate::config::Config;
use crate::document::{
    CONTAINED_OBJECTS_KEY, NOTE_KEY, OBJECT_STATES_KEY, Object, SCRIPT_KEY, SCRIPT_STATE_KEY,
    XML_UI_KEY, child_names, encode_script_state, take_children, take_text,
};
use crate::error::{Result, SavegameError};
use crate::index::UnpackedIndex;
use crate::layout::{UnpackedObject, UnpackedSavegame};
use serde_json::Value;
use tts_luabundle::Unbundler;

/// Writes `savegame` into the `unpacked` directory tree.
///
/// Scripts, script states, UI markup and the notebook are split into their
/// own files, and every object in `ObjectStates` (recursively through
/// `ContainedObjects`) gets its own directory. Bundled scripts are split into
/// their root script and shared modules, which are written to `modules/`.
///
/// Existing files for values that are now empty, and directories of objects
/// that no longer exist, are removed, so unpacking the same document twice
/// leaves an identical tree.
///
/// # Errors
///
/// - [`SavegameError::InvalidDocument`] if `savegame` is not a JSON object or
///   a child list contains something other than objects
/// - [`SavegameError::Bundle`] if a bundle is malformed or two bundles embed
///   different sources for the same module
/// - I/O and JSON errors while writing files
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use tts_savegame::{Config, UnpackedSavegame, unpack};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// # let temp = tempfile::tempdir()?;
/// let config = Config::default();
/// let unpacked = UnpackedSavegame::new(temp.path(), config.json_format());
///
/// let savegame = json!({
///     "SaveName": "Demo",
///     "LuaScript": "print('hello')",
///     "ObjectStates": [{"GUID": "a1b2c3", "Name": "Card"}]
/// });
/// unpack(&savegame, &unpacked, &config)?;
///
/// assert_eq!(unpacked.script().read_text()?, "print('hello')");
/// assert!(temp.path().join("objects/a1b2c3/object.json").is_file());
/// # Ok(())
/// # }
/// ```
pub fn unpack(savegame: &Value, unpacked: &UnpackedSavegame, config: &Config) -> Result<()> {
    let Value::Object(root) = savegame else {
        return Err(SavegameError::InvalidDocument {
            reason: "savegame must be a JSON object".to_string(),
        });
    };

    tracing::info!("Unpacking savegame into {}", unpacked.path().display());

    let mut unpacker = Unpacker {
        unbundler: if config.bundle.enabled {
            Some(Unbundler::new()?)
        } else {
            None
        },
        objects: 0,
    };

    let mut root = root.clone();
    let script = unpacker.unbundle(&take_text(&mut root, SCRIPT_KEY))?;
    unpacked.script().write_text(&script)?;
    unpacked
        .script_state()
        .write_json(take_script_state(&mut root).as_ref())?;
    unpacked
        .xml_ui()
        .write_text(&take_text(&mut root, XML_UI_KEY))?;
    unpacked.note().write_text(&take_text(&mut root, NOTE_KEY))?;

    let objects = take_children(&mut root, OBJECT_STATES_KEY)?;
    unpacker.unpack_children(objects, &unpacked.objects())?;

    unpacked.savegame().write_json(Some(&Value::Object(root)))?;

    let object_count = unpacker.objects;
    if let Some(unbundler) = unpacker.unbundler {
        let modules = unbundler.finish()?;
        unpacked.modules().write_all(&modules)?;
        tracing::info!(
            "Unpacked {} objects and {} modules",
            object_count,
            modules.len()
        );
    } else {
        tracing::info!("Unpacked {} objects", object_count);
    }

    Ok(())
}

fn take_script_state(object: &mut Object) -> Option<Value> {
    let raw = take_text(object, SCRIPT_STATE_KEY);
    (!raw.is_empty()).then(|| encode_script_state(raw))
}

struct Unpacker {
    unbundler: Option<Unbundler>,
    objects: usize,
}

impl Unpacker {
    fn unbundle(&mut self, script: &str) -> Result<String> {
        match &mut self.unbundler {
            Some(unbundler) => Ok(unbundler.unbundle(script)?),
            None => Ok(script.to_string()),
        }
    }

    fn unpack_children(
        &mut self,
        children: Vec<Object>,
        index: &UnpackedIndex<UnpackedObject>,
    ) -> Result<()> {
        if children.is_empty() {
            return index.remove();
        }

        let names = child_names(&children);
        for (name, child) in names.iter().zip(children) {
            let node = index.child(name, true)?;
            self.unpack_object(child, &node)?;
        }
        index.write_index(&names)
    }

    fn unpack_object(&mut self, mut object: Object, node: &UnpackedObject) -> Result<()> {
        let script = self.unbundle(&take_text(&mut object, SCRIPT_KEY))?;
        node.script().write_text(&script)?;
        node.script_state()
            .write_json(take_script_state(&mut object).as_ref())?;
        node.xml_ui()
            .write_text(&take_text(&mut object, XML_UI_KEY))?;

        let contained = take_children(&mut object, CONTAINED_OBJECTS_KEY)?;
        self.unpack_children(contained, &node.contained())?;

        node.object().write_json(Some(&Value::Object(object)))?;

        self.objects += 1;
        tracing::debug!("Unpacked object {}", node.path().display());
        Ok(())
    }
}
