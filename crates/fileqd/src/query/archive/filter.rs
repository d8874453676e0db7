//! Member selection predicates for archive commands.

use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::query::FileRecord;

/// Most extensions accepted by a single `w24ft` request.
pub const MAX_EXTENSIONS: usize = 3;

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Predicate selecting which regular files join an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveFilter {
    /// Inclusive byte-size bounds.
    SizeRange {
        /// Smallest accepted size.
        min: u64,
        /// Largest accepted size.
        max: u64,
    },
    /// Case-sensitive match on the text after the final `.`.
    ExtensionSet(Vec<String>),
    /// Creation time at or before the threshold.
    DateBefore(OffsetDateTime),
    /// Creation time at or after the threshold.
    DateAfter(OffsetDateTime),
}

impl ArchiveFilter {
    /// Size range filter; `min > max` is accepted and simply matches nothing.
    pub fn size_range(min: u64, max: u64) -> Self {
        Self::SizeRange { min, max }
    }

    /// Extension filter, or `None` unless one to three extensions are given.
    pub fn extensions<I, S>(extensions: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let extensions: Vec<String> = extensions.into_iter().map(Into::into).collect();
        (1..=MAX_EXTENSIONS)
            .contains(&extensions.len())
            .then_some(Self::ExtensionSet(extensions))
    }

    /// Parses a `YYYY-MM-DD` date into a midnight UTC threshold.
    pub fn parse_threshold(text: &str) -> Option<OffsetDateTime> {
        if text.len() != 10 || !text.is_ascii() {
            return None;
        }
        Date::parse(text, DATE_FORMAT)
            .ok()
            .map(|date| date.midnight().assume_utc())
    }

    /// Returns `true` when `record` belongs in the archive.
    pub fn matches(&self, record: &FileRecord) -> bool {
        match self {
            Self::SizeRange { min, max } => (*min..=*max).contains(&record.size),
            Self::ExtensionSet(extensions) => record
                .extension()
                .is_some_and(|extension| extensions.iter().any(|wanted| wanted == extension)),
            Self::DateBefore(threshold) => record.created_at() <= *threshold,
            Self::DateAfter(threshold) => record.created_at() >= *threshold,
        }
    }

    /// Response sent when no file matched.
    pub fn no_match_message(&self) -> &'static str {
        match self {
            Self::SizeRange { .. } => "No files found within the specified size range",
            Self::ExtensionSet(_) => "No files found matching specified extensions",
            Self::DateBefore(_) | Self::DateAfter(_) => "No files found",
        }
    }

    /// Short name used in log events.
    pub fn label(&self) -> &'static str {
        match self {
            Self::SizeRange { .. } => "size_range",
            Self::ExtensionSet(_) => "extension_set",
            Self::DateBefore(_) => "date_before",
            Self::DateAfter(_) => "date_after",
        }
    }
}
