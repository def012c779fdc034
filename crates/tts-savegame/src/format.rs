//! Text and JSON formatting shared by every file written to the tree.

use crate::error::Result;
use serde::Serialize;
use serde_json::Value;
use serde_json::ser::PrettyFormatter;

/// JSON layout used for every JSON file written to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonFormat {
    indent: usize,
}

impl JsonFormat {
    /// Creates a format indenting nested values by `indent` spaces.
    #[must_use]
    pub const fn new(indent: usize) -> Self {
        Self { indent }
    }

    /// Indentation width in spaces.
    #[must_use]
    pub const fn indent(self) -> usize {
        self.indent
    }
}

impl Default for JsonFormat {
    fn default() -> Self {
        Self::new(2)
    }
}

/// Serializes `value` as pretty-printed JSON terminated by a newline.
///
/// Object keys keep their document order.
///
/// # Errors
///
/// Returns an error if serialization fails.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use tts_savegame::{JsonFormat, format_json};
///
/// let text = format_json(&json!({"Name": "Deck", "Tags": []}), JsonFormat::new(2)).unwrap();
/// assert_eq!(text, "{\n  \"Name\": \"Deck\",\n  \"Tags\": []\n}\n");
/// ```
pub fn format_json(value: &Value, format: JsonFormat) -> Result<String> {
    let indent = " ".repeat(format.indent);
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(indent.as_bytes());
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    buf.push(b'\n');
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Converts `\r\n` and lone `\r` line endings to `\n`.
#[must_use]
pub fn to_unix(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}
