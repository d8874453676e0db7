//! Command routing to the query components.

use std::io::Write;

use camino::Utf8PathBuf;
use tracing::debug;

use fileq_config::Config;

use crate::query::{ArchiveBuilder, ArchiveOutcome, DirectoryLister, FileInspector};

use super::errors::DispatchError;
use super::request::Command;
use super::response::ResponseWriter;

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

const NO_DIRECTORIES: &str = "No directories found";
const QUIT_CONFIRMATION: &str = "Connection closed by client";

/// What the worker should do after a command has been answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Keep reading requests.
    Continue,
    /// Close the connection.
    Close,
}

/// Routes typed commands to the lister, inspector and archive builder.
#[derive(Debug, Clone)]
pub struct CommandRouter {
    lister: DirectoryLister,
    inspector: FileInspector,
    archiver: ArchiveBuilder,
}

impl CommandRouter {
    /// Creates a router over `root`.
    pub fn new(root: impl Into<Utf8PathBuf>, max_listing_entries: usize, level: i32) -> Self {
        let root = root.into();
        Self {
            lister: DirectoryLister::new(root.clone(), max_listing_entries),
            inspector: FileInspector::new(root.clone()),
            archiver: ArchiveBuilder::new(root, level),
        }
    }

    /// Creates a router from resolved configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.root(),
            config.max_listing_entries,
            config.compression_level,
        )
    }

    /// Answers one command with exactly one response.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Query`] when the query fails; nothing has been
    /// written in that case. Write failures surface as [`DispatchError::Io`].
    pub fn route<W: Write>(
        &self,
        command: &Command,
        writer: &mut ResponseWriter<W>,
    ) -> Result<DispatchOutcome, DispatchError> {
        debug!(target: DISPATCH_TARGET, ?command, "routing command");
        match command {
            Command::ListDirectories(key) => {
                let listing = self.lister.list(*key)?;
                if listing.is_empty() {
                    writer.write_text(NO_DIRECTORIES)?;
                } else {
                    writer.write_text(&listing.render())?;
                }
            }
            Command::InspectFile(name) => {
                let record = self.inspector.inspect(name)?;
                writer.write_text(&record.render())?;
            }
            Command::Archive(filter) => match self.archiver.build(filter)? {
                ArchiveOutcome::Created { path, .. } => writer.write_text(path.as_str())?,
                ArchiveOutcome::Empty => writer.write_text(filter.no_match_message())?,
            },
            Command::Quit => {
                writer.write_text(QUIT_CONFIRMATION)?;
                return Ok(DispatchOutcome::Close);
            }
        }
        Ok(DispatchOutcome::Continue)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    use super::*;
    use crate::query::{ArchiveFilter, SortKey, upcoming_artifact_names};

    struct Harness {
        dir: TempDir,
        router: CommandRouter,
    }

    impl Harness {
        fn answer(&self, command: Command) -> (DispatchOutcome, String) {
            let mut output = Vec::new();
            let outcome = self
                .router
                .route(&command, &mut ResponseWriter::new(&mut output))
                .expect("route");
            (outcome, String::from_utf8(output).expect("utf8"))
        }
    }

    #[fixture]
    fn harness() -> Harness {
        let dir = tempfile::tempdir().expect("temp dir");
        fs::create_dir(dir.path().join("projects")).expect("mkdir");
        fs::write(dir.path().join("a.txt"), b"abc").expect("write");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8");
        Harness {
            router: CommandRouter::new(root, 100, 3),
            dir,
        }
    }

    #[rstest]
    fn lists_directories(harness: Harness) {
        let (outcome, text) = harness.answer(Command::ListDirectories(SortKey::Name));
        assert_eq!(outcome, DispatchOutcome::Continue);
        assert_eq!(text, "projects\n");
    }

    #[test]
    fn reports_empty_listing() {
        let dir = tempfile::tempdir().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8");
        let mut output = Vec::new();
        CommandRouter::new(root, 100, 3)
            .route(
                &Command::ListDirectories(SortKey::CreationTime),
                &mut ResponseWriter::new(&mut output),
            )
            .expect("route");
        assert_eq!(output, b"No directories found\n");
    }

    #[rstest]
    fn archive_reports_artifact_path(harness: Harness) {
        let (_, text) = harness.answer(Command::Archive(ArchiveFilter::size_range(3, 3)));
        let path = text.trim_end();
        assert!(path.ends_with(".tar.zst"), "unexpected response {text:?}");
        assert!(fs::metadata(path).expect("artifact").is_file());
    }

    #[rstest]
    fn archive_reports_no_match(harness: Harness) {
        let filter = ArchiveFilter::extensions(["pdf"]).expect("filter");
        let (_, text) = harness.answer(Command::Archive(filter));
        assert_eq!(text, "No files found matching specified extensions\n");
    }

    #[rstest]
    fn archive_creation_failure_is_recoverable(harness: Harness) {
        for name in upcoming_artifact_names(256) {
            fs::create_dir(harness.dir.path().join(name)).expect("mkdir");
        }

        let mut output = Vec::new();
        let error = harness
            .router
            .route(
                &Command::Archive(ArchiveFilter::size_range(0, 10)),
                &mut ResponseWriter::new(&mut output),
            )
            .expect_err("artifact path is taken");

        assert!(!error.is_fatal());
        assert_eq!(error.to_string(), "Failed to open archive for writing");
        assert!(output.is_empty());
    }

    #[rstest]
    fn quit_confirms_and_closes(harness: Harness) {
        let (outcome, text) = harness.answer(Command::Quit);
        assert_eq!(outcome, DispatchOutcome::Close);
        assert_eq!(text, "Connection closed by client\n");
    }

    #[rstest]
    fn missing_file_is_a_query_error(harness: Harness) {
        let mut output = Vec::new();
        let error = harness
            .router
            .route(
                &Command::InspectFile("absent".into()),
                &mut ResponseWriter::new(&mut output),
            )
            .expect_err("missing file");
        assert!(!error.is_fatal());
        assert!(output.is_empty());
    }
}
