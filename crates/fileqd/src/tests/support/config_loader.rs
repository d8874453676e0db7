//! Configuration loaders for success and failure scenarios.

use std::ffi::OsString;
use std::sync::Arc;

use camino::Utf8PathBuf;
use ortho_config::OrthoError;
use tempfile::TempDir;

use fileq_config::{Config, ServiceRole, SocketEndpoint};

use crate::bootstrap::ConfigLoader;

use super::tree::FixtureRoot;

/// Loader serving a standalone instance over a fixture root, listening on a
/// Unix socket inside a private temporary directory.
#[derive(Clone)]
pub struct TestConfigLoader {
    root: Arc<FixtureRoot>,
    socket_dir: Arc<TempDir>,
    config: Config,
}

impl TestConfigLoader {
    pub fn new() -> Self {
        let root = Arc::new(FixtureRoot::new());
        let socket_dir = Arc::new(TempDir::new().expect("failed to create socket directory"));
        let config = Config {
            listen: SocketEndpoint::unix(Self::socket_path_in(&socket_dir)),
            role: ServiceRole::Mirror,
            root: root.path().to_path_buf(),
            ..Config::default()
        };
        Self {
            root,
            socket_dir,
            config,
        }
    }

    fn socket_path_in(dir: &TempDir) -> Utf8PathBuf {
        let path = dir.path().join("run").join("fileqd.sock");
        Utf8PathBuf::from_path_buf(path).expect("socket path was not valid UTF-8")
    }

    pub fn socket_path(&self) -> Utf8PathBuf {
        Self::socket_path_in(&self.socket_dir)
    }

    pub fn root(&self) -> &FixtureRoot {
        &self.root
    }

    /// Applies `adjust` to the configuration returned by later loads.
    pub fn adjust(&mut self, adjust: impl FnOnce(&mut Config)) {
        adjust(&mut self.config);
    }
}

impl ConfigLoader for TestConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Loader that fails by passing an unsupported listening endpoint.
pub struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load_from_iter([
            OsString::from("fileqd"),
            OsString::from("--listen"),
            OsString::from("invalid://socket"),
        ])
    }
}
