//! Single-file slots holding one scalar value each.
//!
//! An empty value is represented by the absence of the file: writing an
//! empty value deletes the file and reading a missing file yields the empty
//! value.

use crate::error::Result;
use crate::format::{JsonFormat, format_json, to_unix};
use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Removes `path`, treating an already missing file as success.
fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            tracing::debug!("Removed {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// A plain text file.
///
/// # Examples
///
/// ```
/// use tts_savegame::TextFile;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// # let temp = tempfile::tempdir()?;
/// let file = TextFile::new(temp.path().join("script.lua"));
///
/// file.write_text("print('hi')\r\n")?;
/// assert_eq!(file.read_text()?, "print('hi')\n");
///
/// file.write_text("")?;
/// assert!(!file.path().exists());
/// assert_eq!(file.read_text()?, "");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFile {
    path: PathBuf,
}

impl TextFile {
    /// Binds a text slot to `path`. No I/O is performed.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `text` with Unix line endings, or deletes the file if `text`
    /// is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or removed.
    pub fn write_text(&self, text: &str) -> Result<()> {
        if text.is_empty() {
            return remove_if_exists(&self.path);
        }
        fs::write(&self.path, to_unix(text))?;
        Ok(())
    }

    /// Returns the file contents, or an empty string if there is no regular
    /// file at the path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn read_text(&self) -> Result<String> {
        if self.path.is_file() {
            Ok(fs::read_to_string(&self.path)?)
        } else {
            Ok(String::new())
        }
    }
}

/// A JSON document file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonFile {
    path: PathBuf,
    format: JsonFormat,
}

impl JsonFile {
    /// Binds a JSON slot to `path`. No I/O is performed.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, format: JsonFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    /// Location of the file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `value`, or deletes the file if `value` is `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or removed.
    pub fn write_json(&self, value: Option<&Value>) -> Result<()> {
        match value {
            Some(value) => {
                fs::write(&self.path, format_json(value, self.format)?)?;
                Ok(())
            }
            None => remove_if_exists(&self.path),
        }
    }

    /// Returns the parsed file, or `None` if there is no regular file at the
    /// path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn read_json(&self) -> Result<Option<Value>> {
        if self.path.is_file() {
            let text = fs::read_to_string(&self.path)?;
            Ok(Some(serde_json::from_str(&text)?))
        } else {
            Ok(None)
        }
    }
}
