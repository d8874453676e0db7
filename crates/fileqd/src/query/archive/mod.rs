//! Compressed archives of filtered root files.
//!
//! Archives are tar streams compressed with zstd. Each request writes a fresh
//! artifact named `fileq-archive-<pid>-<seq>.tar.zst` directly under the root,
//! so concurrent requests on any instance never share a path. Artifacts
//! produced earlier are never archived themselves.
//!
//! Created artifacts are never deleted by the service; they accumulate in the
//! root until an operator removes them.

mod filter;

use std::fs::{self, File, Metadata};
use std::io::{self, BufReader, Read, Write};
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, info, warn};

use super::{FileRecord, QUERY_TARGET, QueryError};

pub use self::filter::{ArchiveFilter, MAX_EXTENSIONS};

/// File name prefix of archive artifacts.
pub const ARCHIVE_PREFIX: &str = "fileq-archive-";
/// File name suffix of archive artifacts.
pub const ARCHIVE_SUFFIX: &str = ".tar.zst";

const CHUNK_BYTES: usize = 8 * 1024;

static SEQUENCE: AtomicU64 = AtomicU64::new(1);

/// Result of an archive request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveOutcome {
    /// At least one member was written.
    Created {
        /// Location of the artifact.
        path: Utf8PathBuf,
        /// Number of files stored.
        members: usize,
    },
    /// Nothing matched; no artifact remains.
    Empty,
}

/// Streams matching root files into a compressed archive.
#[derive(Debug, Clone)]
pub struct ArchiveBuilder {
    root: Utf8PathBuf,
    level: i32,
}

impl ArchiveBuilder {
    /// Creates a builder writing into `root` at the given zstd level.
    pub fn new(root: impl Into<Utf8PathBuf>, level: i32) -> Self {
        Self {
            root: root.into(),
            level,
        }
    }

    /// Builds an archive of every regular root file accepted by `filter`.
    ///
    /// Files that cannot be opened are skipped. A failure after the artifact
    /// has been opened leaves the partial file in place.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::RootUnavailable`] when the root cannot be read,
    /// [`QueryError::ArchiveCreate`] when the artifact cannot be opened and
    /// [`QueryError::ArchiveWrite`] when streaming into it fails.
    pub fn build(&self, filter: &ArchiveFilter) -> Result<ArchiveOutcome, QueryError> {
        self.build_at(filter, self.next_artifact_path())
    }

    fn build_at(
        &self,
        filter: &ArchiveFilter,
        path: Utf8PathBuf,
    ) -> Result<ArchiveOutcome, QueryError> {
        let entries = fs::read_dir(self.root.as_std_path())
            .map_err(|source| QueryError::root_unavailable(self.root.clone(), source))?;

        let file = File::create(path.as_std_path())
            .map_err(|source| QueryError::archive_create(path.clone(), source))?;
        let encoder = zstd::stream::write::Encoder::new(file, self.level)
            .map_err(|source| QueryError::archive_create(path.clone(), source))?;
        let mut archive = tar::Builder::new(encoder);

        let mut members = 0_usize;
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().into_owned();
            if is_artifact(&name) {
                continue;
            }
            let Ok(metadata) = entry.metadata() else {
                continue;
            };
            if !metadata.is_file() {
                continue;
            }
            let record = FileRecord::from_metadata(name, &metadata);
            if !filter.matches(&record) {
                continue;
            }
            let member = self.root.join(&record.name);
            let source = match File::open(member.as_std_path()) {
                Ok(source) => source,
                Err(error) => {
                    warn!(
                        target: QUERY_TARGET,
                        file = %member,
                        %error,
                        "skipping unreadable file"
                    );
                    continue;
                }
            };
            append_member(&mut archive, &record.name, &metadata, source)
                .map_err(|source| QueryError::archive_write(path.clone(), source))?;
            members += 1;
        }

        finish(archive).map_err(|source| QueryError::archive_write(path.clone(), source))?;

        if members == 0 {
            discard(&path);
            debug!(target: QUERY_TARGET, filter = filter.label(), "no archive members matched");
            return Ok(ArchiveOutcome::Empty);
        }

        info!(
            target: QUERY_TARGET,
            filter = filter.label(),
            members,
            archive = %path,
            "archive created"
        );
        Ok(ArchiveOutcome::Created { path, members })
    }

    fn next_artifact_path(&self) -> Utf8PathBuf {
        let sequence = SEQUENCE.fetch_add(1, Ordering::Relaxed);
        self.root.join(artifact_name(sequence))
    }
}

fn artifact_name(sequence: u64) -> String {
    format!("{ARCHIVE_PREFIX}{}-{sequence}{ARCHIVE_SUFFIX}", process::id())
}

/// Names the next `count` artifacts this process may produce.
///
/// Archive builds in between consume names from the front of the list.
#[cfg(test)]
pub(crate) fn upcoming_artifact_names(count: u64) -> Vec<String> {
    let next = SEQUENCE.load(Ordering::Relaxed);
    (next..next + count).map(artifact_name).collect()
}

/// Returns `true` for names produced by [`ArchiveBuilder`].
pub fn is_artifact(name: &str) -> bool {
    name.starts_with(ARCHIVE_PREFIX) && name.ends_with(ARCHIVE_SUFFIX)
}

fn append_member<W: Write>(
    archive: &mut tar::Builder<W>,
    name: &str,
    metadata: &Metadata,
    source: File,
) -> io::Result<()> {
    let mut header = tar::Header::new_gnu();
    header.set_metadata(metadata);
    let reader = BufReader::with_capacity(CHUNK_BYTES, source.take(metadata.len()));
    archive.append_data(&mut header, name, reader)
}

fn finish<W: Write>(
    archive: tar::Builder<zstd::stream::write::Encoder<'static, W>>,
) -> io::Result<()> {
    let encoder = archive.into_inner()?;
    let mut inner = encoder.finish()?;
    inner.flush()
}

fn discard(path: &Utf8Path) {
    if let Err(error) = fs::remove_file(path.as_std_path()) {
        warn!(
            target: QUERY_TARGET,
            archive = %path,
            %error,
            "failed to remove empty archive"
        );
    }
}
