//! Directory listings for `dirlist`.

use std::fs;

use camino::Utf8PathBuf;
use tracing::debug;

use super::{FileRecord, QUERY_TARGET, QueryError};

/// Ordering requested by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Case-sensitive lexicographic order by name (`-a`).
    Name,
    /// Ascending creation time, stable on ties (`-t`).
    CreationTime,
}

impl SortKey {
    /// Maps a `dirlist` flag to a sort key.
    pub fn from_flag(flag: &str) -> Option<Self> {
        match flag {
            "-a" => Some(Self::Name),
            "-t" => Some(Self::CreationTime),
            _ => None,
        }
    }
}

/// Enumerates the immediate subdirectories of the root.
#[derive(Debug, Clone)]
pub struct DirectoryLister {
    root: Utf8PathBuf,
    max_entries: usize,
}

impl DirectoryLister {
    /// Creates a lister that considers at most `max_entries` directories.
    pub fn new(root: impl Into<Utf8PathBuf>, max_entries: usize) -> Self {
        Self {
            root: root.into(),
            max_entries,
        }
    }

    /// Lists directories under the root in the requested order.
    ///
    /// Entries beyond the cap are dropped in enumeration order before sorting.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::RootUnavailable`] when the root cannot be read.
    pub fn list(&self, key: SortKey) -> Result<DirectoryListing, QueryError> {
        let entries = fs::read_dir(self.root.as_std_path())
            .map_err(|source| QueryError::root_unavailable(self.root.clone(), source))?;

        let mut directories = Vec::new();
        for entry in entries {
            if directories.len() >= self.max_entries {
                debug!(
                    target: QUERY_TARGET,
                    cap = self.max_entries,
                    "directory listing truncated"
                );
                break;
            }
            let Ok(entry) = entry else { continue };
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            if !file_type.is_dir() {
                continue;
            }
            let Ok(metadata) = entry.metadata() else {
                continue;
            };
            let name = entry.file_name().to_string_lossy().into_owned();
            directories.push(FileRecord::from_metadata(name, &metadata));
        }

        match key {
            SortKey::Name => directories.sort_by(|left, right| left.name.cmp(&right.name)),
            SortKey::CreationTime => directories.sort_by_key(|record| record.created),
        }

        Ok(DirectoryListing {
            entries: directories.into_iter().map(|record| record.name).collect(),
        })
    }
}

/// Ordered directory names produced by one `dirlist` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryListing {
    /// Directory names in response order.
    pub entries: Vec<String>,
}

impl DirectoryListing {
    /// Returns `true` when no directory was found.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Renders one name per line, newline terminated.
    pub fn render(&self) -> String {
        let mut rendered = String::new();
        for entry in &self.entries {
            rendered.push_str(entry);
            rendered.push('\n');
        }
        rendered
    }
}
