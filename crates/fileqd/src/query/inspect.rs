//! Single-file metadata lookups for `w24fn`.

use std::fs;
use std::path::{Component, Path};

use camino::Utf8PathBuf;

use super::{FileRecord, QueryError};

/// Resolves a single name under the root and reports its metadata.
#[derive(Debug, Clone)]
pub struct FileInspector {
    root: Utf8PathBuf,
}

impl FileInspector {
    /// Creates an inspector scoped to `root`.
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Looks up `name` directly under the root.
    ///
    /// Names that are not a single normal path segment are treated as absent,
    /// so `..`, absolute paths and nested paths never escape the root.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::FileNotFound`] when the name is rejected or the
    /// entry cannot be stat'ed.
    pub fn inspect(&self, name: &str) -> Result<FileRecord, QueryError> {
        if !is_single_segment(name) {
            return Err(QueryError::file_not_found(name));
        }
        let path = self.root.join(name);
        let metadata =
            fs::metadata(path.as_std_path()).map_err(|_| QueryError::file_not_found(name))?;
        Ok(FileRecord::from_metadata(name, &metadata))
    }
}

fn is_single_segment(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
