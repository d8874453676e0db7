//! Shared configuration for the fileq service and client.
//!
//! Values are layered with `ortho_config`: built-in defaults, then an
//! optional TOML file named by `--config-path`, then `FILEQ_*` environment
//! variables, then command-line flags. The same [`Config`] drives the primary
//! and both mirrors; only `role` and `listen` differ between the three
//! instances of a deployment.

mod defaults;
mod logging;
mod role;
mod socket;

use std::ffi::OsString;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::{OrthoConfig, OrthoResult};
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_COMPRESSION_LEVEL, DEFAULT_HOST, DEFAULT_IO_TIMEOUT_SECS, DEFAULT_LOG_FILTER,
    DEFAULT_MAX_LISTING_ENTRIES, DEFAULT_MAX_WORKERS, DEFAULT_MIRROR_ONE_PORT,
    DEFAULT_MIRROR_TWO_PORT, DEFAULT_PRIMARY_PORT, DEFAULT_TIER_BATCH, default_listen_endpoint,
    default_log_filter, default_log_filter_string, default_log_format, default_mirror_one_endpoint,
    default_mirror_two_endpoint, default_role, default_root,
};
pub use logging::{LogFormat, LogFormatParseError};
pub use role::{ServiceRole, ServiceRoleParseError};
pub use socket::{SocketEndpoint, SocketParseError, SocketPreparationError};

/// Resolved configuration for one service instance.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, OrthoConfig)]
#[ortho_config(prefix = "FILEQ")]
pub struct Config {
    /// Endpoint this instance binds.
    #[ortho_config(default = default_listen_endpoint())]
    pub listen: SocketEndpoint,
    /// Whether this instance distributes connections or only serves them.
    #[ortho_config(default = default_role())]
    pub role: ServiceRole,
    /// Endpoint of the first mirror, dialled by the primary.
    #[ortho_config(default = default_mirror_one_endpoint())]
    pub mirror_one: SocketEndpoint,
    /// Endpoint of the second mirror, dialled by the primary.
    #[ortho_config(default = default_mirror_two_endpoint())]
    pub mirror_two: SocketEndpoint,
    /// Directory every command operates on.
    #[ortho_config(default = default_root())]
    pub root: Utf8PathBuf,
    /// Maximum number of connections served concurrently by this instance.
    #[ortho_config(default = DEFAULT_MAX_WORKERS)]
    pub max_workers: usize,
    /// Consecutive connections given to each tier before rotation starts.
    #[ortho_config(default = DEFAULT_TIER_BATCH)]
    pub tier_batch: usize,
    /// Cap on the directory entries considered by a listing.
    #[ortho_config(default = DEFAULT_MAX_LISTING_ENTRIES)]
    pub max_listing_entries: usize,
    /// Per-connection read and write deadline in seconds; zero disables it.
    #[ortho_config(default = DEFAULT_IO_TIMEOUT_SECS)]
    pub io_timeout_secs: u64,
    /// zstd level applied to archives.
    #[ortho_config(default = DEFAULT_COMPRESSION_LEVEL)]
    pub compression_level: i32,
    /// `tracing` filter expression.
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Log rendering format.
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: default_listen_endpoint(),
            role: default_role(),
            mirror_one: default_mirror_one_endpoint(),
            mirror_two: default_mirror_two_endpoint(),
            root: default_root(),
            max_workers: DEFAULT_MAX_WORKERS,
            tier_batch: DEFAULT_TIER_BATCH,
            max_listing_entries: DEFAULT_MAX_LISTING_ENTRIES,
            io_timeout_secs: DEFAULT_IO_TIMEOUT_SECS,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Loads configuration from the process arguments and environment.
    ///
    /// # Errors
    ///
    /// Returns the loader error when a layer cannot be read or a value fails
    /// to parse.
    pub fn load() -> OrthoResult<Self> {
        <Self as OrthoConfig>::load()
    }

    /// Loads configuration from an explicit argument list.
    ///
    /// # Errors
    ///
    /// Returns the loader error when a layer cannot be read or a value fails
    /// to parse.
    pub fn load_from_iter<I>(args: I) -> OrthoResult<Self>
    where
        I: IntoIterator<Item = OsString>,
    {
        <Self as OrthoConfig>::load_from_iter(args)
    }

    /// Endpoint this instance binds.
    #[must_use]
    pub fn listen(&self) -> &SocketEndpoint {
        &self.listen
    }

    /// Role of this instance.
    #[must_use]
    pub fn role(&self) -> ServiceRole {
        self.role
    }

    /// Mirror endpoints in tier order.
    #[must_use]
    pub fn mirrors(&self) -> [&SocketEndpoint; 2] {
        [&self.mirror_one, &self.mirror_two]
    }

    /// Directory every command operates on.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Per-connection deadline, or `None` when disabled.
    #[must_use]
    pub fn io_timeout(&self) -> Option<Duration> {
        (self.io_timeout_secs > 0).then(|| Duration::from_secs(self.io_timeout_secs))
    }

    /// `tracing` filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log rendering format.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }
}
