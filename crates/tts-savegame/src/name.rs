//! Validation of names used as path segments.

use crate::error::{Result, SavegameError};
use regex::Regex;
use std::sync::LazyLock;

static NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w-]+$").expect("valid regex"));
static MODULE_SEGMENT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.-]+$").expect("valid regex"));

/// Checks that `name` is safe to use as a directory name and `index.list` entry.
///
/// # Errors
///
/// Returns [`SavegameError::InvalidName`] unless `name` consists of one or
/// more Unicode letters, digits, `_` or `-`.
///
/// # Examples
///
/// ```
/// use tts_savegame::verify_name;
///
/// assert!(verify_name("abc_1-2").is_ok());
/// assert!(verify_name("Würfel").is_ok());
/// assert!(verify_name("a.b").is_err());
/// ```
pub fn verify_name(name: &str) -> Result<()> {
    if NAME_REGEX.is_match(name) {
        Ok(())
    } else {
        Err(SavegameError::InvalidName {
            name: name.to_string(),
        })
    }
}

/// Checks that a Lua module name maps to a safe relative path.
///
/// Module names are `/`-separated. Each segment may additionally contain
/// `.`, but `.` and `..` segments are rejected.
///
/// # Errors
///
/// Returns [`SavegameError::InvalidName`] if any segment is invalid.
pub fn verify_module_name(name: &str) -> Result<()> {
    let valid = name.split('/').all(|segment| {
        segment != "." && segment != ".." && MODULE_SEGMENT_REGEX.is_match(segment)
    });
    if valid {
        Ok(())
    } else {
        Err(SavegameError::InvalidName {
            name: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        for name in ["abc_1-2", "A", "0", "a1b2c3", "-", "_", "ä", "Würfel", "骰子"] {
            assert!(verify_name(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn test_invalid_names() {
        for name in ["", "a/b", "a b", "a.b", "..", "a\nb", "index.list", "a\tb"] {
            let err = verify_name(name).unwrap_err();
            assert!(
                matches!(err, SavegameError::InvalidName { name: ref n } if n == name),
                "{name:?} should be invalid"
            );
        }
    }

    #[test]
    fn test_trailing_newline_rejected() {
        assert!(verify_name("abc\n").is_err());
        assert!(verify_name("ä\n").is_err());
        assert!(verify_module_name("lib/util\n").is_err());
    }

    #[test]
    fn test_valid_module_names() {
        for name in ["util", "lib/util", "lib.util", "vendor/json-1.2/json", "größe/util"] {
            assert!(verify_module_name(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn test_invalid_module_names() {
        for name in ["", "/util", "lib//util", "../util", "lib/./util", "a b", "lib\\util"] {
            assert!(verify_module_name(name).is_err(), "{name:?} should be invalid");
        }
    }
}
