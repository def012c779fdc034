//! Ordered collections of named child directories.
//!
//! An index directory holds one subdirectory per child and an `index.list`
//! manifest naming the children in order, one per line:
//!
//! ```text
//! contained/
//! ├── index.list      # "a1b2c3\nd4e5f6\n"
//! ├── a1b2c3/
//! └── d4e5f6/
//! ```

use crate::error::{Result, SavegameError};
use crate::files::TextFile;
use crate::format::JsonFormat;
use crate::name::verify_name;
use std::collections::HashSet;
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// Name of the order manifest inside an index directory.
pub const INDEX_FILE: &str = "index.list";

/// A node shape that can be bound to a directory.
pub trait UnpackedNode: Sized {
    /// Binds the node to `path`. Must not perform I/O.
    fn at(path: PathBuf, format: JsonFormat) -> Self;
}

/// Ordered, named children of type `T` stored under one directory.
///
/// # Examples
///
/// ```
/// use tts_savegame::{JsonFormat, UnpackedIndex, UnpackedObject};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// # let temp = tempfile::tempdir()?;
/// let index: UnpackedIndex<UnpackedObject> =
///     UnpackedIndex::new(temp.path().join("objects"), JsonFormat::default());
///
/// index.child("b", true)?;
/// index.child("a", true)?;
/// index.write_index(&["b", "a"])?;
///
/// let names = index
///     .children()?
///     .map(|child| child.map(|(name, _)| name))
///     .collect::<Result<Vec<_>, _>>()?;
/// assert_eq!(names, vec!["b", "a"]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnpackedIndex<T> {
    path: PathBuf,
    format: JsonFormat,
    child_type: PhantomData<fn() -> T>,
}

impl<T: UnpackedNode> UnpackedIndex<T> {
    /// Binds an index to `path`. No I/O is performed.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, format: JsonFormat) -> Self {
        Self {
            path: path.into(),
            format,
            child_type: PhantomData,
        }
    }

    /// Location of the index directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn manifest(&self) -> TextFile {
        TextFile::new(self.path.join(INDEX_FILE))
    }

    /// Returns true if the index directory exists.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.is_dir()
    }

    /// Returns the child called `name`.
    ///
    /// With `create`, the child directory (and any missing parents) is
    /// created first.
    ///
    /// # Errors
    ///
    /// - [`SavegameError::InvalidName`] if `name` is not a valid item name
    /// - [`SavegameError::NotFound`] if `create` is false and the child
    ///   directory does not exist
    /// - I/O errors if the directory cannot be created
    pub fn child(&self, name: &str, create: bool) -> Result<T> {
        verify_name(name)?;

        let path = self.path.join(name);
        if create {
            fs::create_dir_all(&path)?;
        } else if !path.is_dir() {
            return Err(SavegameError::NotFound { path });
        }
        Ok(T::at(path, self.format))
    }

    /// Iterates over the children in manifest order.
    ///
    /// Yields nothing if the index directory does not exist. Every manifest
    /// entry is validated as it is reached, so a corrupted manifest produces
    /// an error instead of silently skipping entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest cannot be read. Errors for
    /// individual entries are yielded by the iterator.
    pub fn children(&self) -> Result<Children<'_, T>> {
        let names = if self.exists() {
            self.manifest()
                .read_text()?
                .lines()
                .map(str::to_string)
                .collect()
        } else {
            Vec::new()
        };

        Ok(Children {
            index: self,
            names: names.into_iter(),
        })
    }

    /// Writes the manifest and removes every entry that is not listed.
    ///
    /// All names are validated before anything is written. Unlisted
    /// directories are removed recursively, unlisted files individually.
    ///
    /// # Errors
    ///
    /// - [`SavegameError::InvalidName`] if any name is invalid; nothing is
    ///   modified in that case
    /// - I/O errors while writing the manifest or removing stale entries
    pub fn write_index<S: AsRef<str>>(&self, names: &[S]) -> Result<()> {
        for name in names {
            verify_name(name.as_ref())?;
        }

        fs::create_dir_all(&self.path)?;

        let mut manifest = String::new();
        for name in names {
            manifest.push_str(name.as_ref());
            manifest.push('\n');
        }
        self.manifest().write_text(&manifest)?;

        let keep: HashSet<&str> = names.iter().map(|name| name.as_ref()).collect();
        for entry in fs::read_dir(&self.path)? {
            let entry = entry?;
            let file_name = entry.file_name();
            let file_name = file_name.to_string_lossy();
            if file_name == INDEX_FILE || keep.contains(&*file_name) {
                continue;
            }

            let path = entry.path();
            if entry.file_type()?.is_dir() {
                fs::remove_dir_all(&path)?;
            } else {
                fs::remove_file(&path)?;
            }
            tracing::debug!("Removed stale entry {}", path.display());
        }

        Ok(())
    }

    /// Removes the index directory and everything in it.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory exists but cannot be removed.
    pub fn remove(&self) -> Result<()> {
        if self.exists() {
            fs::remove_dir_all(&self.path)?;
            tracing::debug!("Removed index {}", self.path.display());
        }
        Ok(())
    }
}

/// Iterator over the children of an [`UnpackedIndex`], in manifest order.
#[derive(Debug)]
pub struct Children<'a, T> {
    index: &'a UnpackedIndex<T>,
    names: std::vec::IntoIter<String>,
}

impl<T: UnpackedNode> Iterator for Children<'_, T> {
    type Item = Result<(String, T)>;

    fn next(&mut self) -> Option<Self::Item> {
        let name = self.names.next()?;
        Some(self.index.child(&name, false).map(|child| (name, child)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.names.size_hint()
    }
}
