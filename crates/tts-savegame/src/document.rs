//! Savegame document fields that are split out into separate files.

use crate::error::{Result, SavegameError};
use crate::name::verify_name;
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Lua script of the savegame or an object.
pub const SCRIPT_KEY: &str = "LuaScript";
/// Saved Lua script state.
pub const SCRIPT_STATE_KEY: &str = "LuaScriptState";
/// XML UI markup.
pub const XML_UI_KEY: &str = "XmlUI";
/// Savegame notebook text.
pub const NOTE_KEY: &str = "Note";
/// Top-level objects of a savegame.
pub const OBJECT_STATES_KEY: &str = "ObjectStates";
/// Objects inside a container (bag, deck, ...).
pub const CONTAINED_OBJECTS_KEY: &str = "ContainedObjects";
/// Object identifier.
pub const GUID_KEY: &str = "GUID";

/// Directory name used for objects without a usable GUID.
const FALLBACK_NAME: &str = "object";

/// A JSON object as stored in the savegame.
pub type Object = Map<String, Value>;

/// Removes `key` from `object` if it holds a non-empty string and returns it.
///
/// Any other value is left in place and an empty string is returned, so the
/// residual document still reproduces it.
pub fn take_text(object: &mut Object, key: &str) -> String {
    match object.get(key) {
        Some(Value::String(text)) if !text.is_empty() => {}
        _ => return String::new(),
    }
    match object.shift_remove(key) {
        Some(Value::String(text)) => text,
        _ => String::new(),
    }
}

/// Inserts `text` under `key` unless it is empty.
pub fn put_text(object: &mut Object, key: &str, text: String) {
    if !text.is_empty() {
        object.insert(key.to_string(), Value::String(text));
    }
}

/// Removes `key` from `object` if it holds a non-empty array and returns
/// its elements.
///
/// # Errors
///
/// Returns [`SavegameError::InvalidDocument`] if an element is not a JSON
/// object; `object` is left unchanged in that case.
pub fn take_children(object: &mut Object, key: &str) -> Result<Vec<Object>> {
    match object.get(key) {
        Some(Value::Array(items)) if !items.is_empty() => {
            if let Some(position) = items.iter().position(|item| !item.is_object()) {
                return Err(SavegameError::InvalidDocument {
                    reason: format!("{key}[{position}] is not an object"),
                });
            }
        }
        _ => return Ok(Vec::new()),
    }

    let Some(Value::Array(items)) = object.shift_remove(key) else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(child) => Some(child),
            _ => None,
        })
        .collect())
}

/// Converts a raw `LuaScriptState` string to the value stored in
/// `script-state.json`.
///
/// States that are JSON and re-serialize to the exact same text are stored
/// as that JSON value. Anything else is stored as a JSON string holding the
/// raw text, which keeps the conversion lossless.
#[must_use]
pub fn encode_script_state(raw: String) -> Value {
    match serde_json::from_str::<Value>(&raw) {
        Ok(value)
            if !value.is_string()
                && serde_json::to_string(&value).is_ok_and(|text| text == raw) =>
        {
            value
        }
        _ => Value::String(raw),
    }
}

/// Inverse of [`encode_script_state`].
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
pub fn decode_script_state(value: Value) -> Result<String> {
    match value {
        Value::String(raw) => Ok(raw),
        other => Ok(serde_json::to_string(&other)?),
    }
}

/// Chooses a directory name for each child, in order.
///
/// A child is named after its `GUID` when that is a valid item name and
/// `object` otherwise. Repeated names get `-2`, `-3`, ... suffixes in
/// document order, so the result depends only on the children and their
/// order.
#[must_use]
pub fn child_names(children: &[Object]) -> Vec<String> {
    let mut used = HashSet::new();
    children
        .iter()
        .map(|child| {
            let base = child
                .get(GUID_KEY)
                .and_then(Value::as_str)
                .filter(|guid| verify_name(guid).is_ok())
                .unwrap_or(FALLBACK_NAME);

            let mut name = base.to_string();
            let mut suffix = 1;
            while used.contains(&name) {
                suffix += 1;
                name = format!("{base}-{suffix}");
            }
            used.insert(name.clone());
            name
        })
        .collect()
}
