//! Error types for filesystem queries.
//!
//! The display text of every variant is the diagnostic sent to the client, so
//! it stays short and free of host paths. Paths and OS errors travel in the
//! variant fields for logging.

use std::io;

use camino::Utf8PathBuf;
use thiserror::Error;

/// Resource errors raised while answering a query.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The root directory could not be read.
    #[error("Failed to open root directory")]
    RootUnavailable {
        /// Configured root.
        root: Utf8PathBuf,
        /// Underlying filesystem error.
        #[source]
        source: io::Error,
    },

    /// The named file does not exist under the root.
    #[error("File not found")]
    FileNotFound {
        /// Name supplied by the client.
        name: String,
    },

    /// The archive artifact could not be created.
    #[error("Failed to open archive for writing")]
    ArchiveCreate {
        /// Artifact path.
        path: Utf8PathBuf,
        /// Underlying filesystem error.
        #[source]
        source: io::Error,
    },

    /// Writing into an already open archive failed.
    #[error("Failed to write archive")]
    ArchiveWrite {
        /// Artifact path; the partial file is left in place.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

impl QueryError {
    /// Creates a root unavailable error.
    pub fn root_unavailable(root: impl Into<Utf8PathBuf>, source: io::Error) -> Self {
        Self::RootUnavailable {
            root: root.into(),
            source,
        }
    }

    /// Creates a file not found error.
    pub fn file_not_found(name: impl Into<String>) -> Self {
        Self::FileNotFound { name: name.into() }
    }

    /// Creates an archive creation error.
    pub fn archive_create(path: impl Into<Utf8PathBuf>, source: io::Error) -> Self {
        Self::ArchiveCreate {
            path: path.into(),
            source,
        }
    }

    /// Creates an archive write error.
    pub fn archive_write(path: impl Into<Utf8PathBuf>, source: io::Error) -> Self {
        Self::ArchiveWrite {
            path: path.into(),
            source,
        }
    }
}
