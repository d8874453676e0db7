//! Filesystem queries answered by the service.
//!
//! Every query is scoped to the immediate children of one configured root
//! directory. Nothing here is cached: each request stats the filesystem afresh
//! and the results live only as long as the response that carries them.

mod archive;
mod errors;
mod inspect;
mod listing;
mod record;

pub use self::archive::{
    ARCHIVE_PREFIX, ARCHIVE_SUFFIX, ArchiveBuilder, ArchiveFilter, ArchiveOutcome, MAX_EXTENSIONS,
    is_artifact,
};
#[cfg(test)]
pub(crate) use self::archive::upcoming_artifact_names;
pub use self::errors::QueryError;
pub use self::inspect::FileInspector;
pub use self::listing::{DirectoryLister, DirectoryListing, SortKey};
pub use self::record::{EntryKind, FileRecord};

#[cfg(test)]
pub(crate) use self::record::creation_time;

/// Tracing target for filesystem queries.
pub(crate) const QUERY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::query");
