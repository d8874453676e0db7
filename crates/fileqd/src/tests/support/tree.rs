//! Temporary root directories populated with a known layout.

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

/// A root holding `alpha/`, `beta/`, `notes.txt` (12 bytes), `report.pdf`
/// (2048 bytes) and `data.csv` (300 bytes).
pub struct FixtureRoot {
    _dir: TempDir,
    path: Utf8PathBuf,
}

impl FixtureRoot {
    pub fn new() -> Self {
        Self::with_directories(&["alpha", "beta"])
    }

    /// Builds the standard files alongside the named subdirectories.
    pub fn with_directories(directories: &[&str]) -> Self {
        let dir = TempDir::new().expect("failed to create fixture root");
        let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
            .expect("fixture root was not valid UTF-8");
        for name in directories {
            fs::create_dir(path.join(name)).expect("create fixture directory");
        }
        fs::write(path.join("notes.txt"), b"hello, world").expect("write notes.txt");
        fs::write(path.join("report.pdf"), vec![b'%'; 2048]).expect("write report.pdf");
        fs::write(path.join("data.csv"), vec![b','; 300]).expect("write data.csv");
        Self { _dir: dir, path }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}
