//! Per-file metadata snapshots.

use std::fs::Metadata;
use std::time::{SystemTime, UNIX_EPOCH};

use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

/// `ctime(3)`-style rendering used in metadata blocks.
const CREATED_FORMAT: &[BorrowedFormatItem<'static>] = format_description!(
    "[weekday repr:short] [month repr:short] [day padding:space] [hour]:[minute]:[second] [year]"
);

/// Kind of a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Symlink, socket, device or anything else.
    Other,
}

/// Metadata reported for one directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Entry name relative to the root.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Permission bits (`mode & 0o777`).
    pub permissions: u32,
    /// Creation timestamp.
    pub created: SystemTime,
    /// Entry kind.
    pub kind: EntryKind,
}

impl FileRecord {
    /// Builds a record from already fetched metadata.
    pub fn from_metadata(name: impl Into<String>, metadata: &Metadata) -> Self {
        let file_type = metadata.file_type();
        let kind = if file_type.is_file() {
            EntryKind::File
        } else if file_type.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::Other
        };
        Self {
            name: name.into(),
            size: metadata.len(),
            permissions: permission_bits(metadata),
            created: creation_time(metadata),
            kind,
        }
    }

    /// Text after the final `.` of the name, if the name has one.
    pub fn extension(&self) -> Option<&str> {
        self.name.rsplit_once('.').map(|(_, extension)| extension)
    }

    /// Creation time as a UTC date-time.
    pub fn created_at(&self) -> OffsetDateTime {
        OffsetDateTime::from(self.created)
    }

    /// Renders the metadata block returned by `w24fn`.
    pub fn render(&self) -> String {
        let created = self
            .created_at()
            .format(CREATED_FORMAT)
            .unwrap_or_else(|_| self.created_at().unix_timestamp().to_string());
        format!(
            "Name: {}\nSize: {} bytes\nPermissions: {:o}\nDate Created: {created} UTC\n",
            self.name, self.size, self.permissions
        )
    }
}

/// Creation time of an entry.
///
/// Prefers the filesystem birth time. Platforms without one fall back to the
/// inode status-change time and finally to the modification time.
pub(crate) fn creation_time(metadata: &Metadata) -> SystemTime {
    metadata
        .created()
        .ok()
        .or_else(|| status_change_time(metadata))
        .or_else(|| metadata.modified().ok())
        .unwrap_or(UNIX_EPOCH)
}

#[cfg(unix)]
fn status_change_time(metadata: &Metadata) -> Option<SystemTime> {
    use std::os::unix::fs::MetadataExt;
    use std::time::Duration;

    let seconds = u64::try_from(metadata.ctime()).ok()?;
    let nanos = u32::try_from(metadata.ctime_nsec()).ok()?;
    UNIX_EPOCH.checked_add(Duration::new(seconds, nanos))
}

#[cfg(not(unix))]
fn status_change_time(_metadata: &Metadata) -> Option<SystemTime> {
    None
}

#[cfg(unix)]
fn permission_bits(metadata: &Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;

    metadata.permissions().mode() & 0o777
}

#[cfg(not(unix))]
fn permission_bits(metadata: &Metadata) -> u32 {
    if metadata.permissions().readonly() {
        0o444
    } else {
        0o644
    }
}
