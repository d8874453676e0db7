use camino::Utf8PathBuf;

use crate::logging::LogFormat;
use crate::role::ServiceRole;
use crate::socket::SocketEndpoint;

/// Loopback host used by the default endpoints.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default port of the primary service.
pub const DEFAULT_PRIMARY_PORT: u16 = 9089;

/// Default port of the first mirror.
pub const DEFAULT_MIRROR_ONE_PORT: u16 = 9090;

/// Default port of the second mirror.
pub const DEFAULT_MIRROR_TWO_PORT: u16 = 9091;

/// Default number of concurrently served connections per instance.
pub const DEFAULT_MAX_WORKERS: usize = 3;

/// Default number of consecutive connections assigned to each tier before
/// the distributor starts rotating.
pub const DEFAULT_TIER_BATCH: usize = 3;

/// Default cap on directory entries considered by `dirlist`.
pub const DEFAULT_MAX_LISTING_ENTRIES: usize = 100;

/// Default per-connection read and write deadline in seconds.
pub const DEFAULT_IO_TIMEOUT_SECS: u64 = 300;

/// Default zstd level applied to archives.
pub const DEFAULT_COMPRESSION_LEVEL: i32 = 3;

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default log filter expression used by the binaries.
#[must_use]
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binaries.
#[must_use]
pub fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Default role of a freshly started instance.
#[must_use]
pub fn default_role() -> ServiceRole {
    ServiceRole::Primary
}

/// Endpoint the primary service listens on.
#[must_use]
pub fn default_listen_endpoint() -> SocketEndpoint {
    SocketEndpoint::tcp(DEFAULT_HOST, DEFAULT_PRIMARY_PORT)
}

/// Endpoint of the first mirror.
#[must_use]
pub fn default_mirror_one_endpoint() -> SocketEndpoint {
    SocketEndpoint::tcp(DEFAULT_HOST, DEFAULT_MIRROR_ONE_PORT)
}

/// Endpoint of the second mirror.
#[must_use]
pub fn default_mirror_two_endpoint() -> SocketEndpoint {
    SocketEndpoint::tcp(DEFAULT_HOST, DEFAULT_MIRROR_TWO_PORT)
}

/// Root directory served when none is configured: the operator's home
/// directory, or the working directory when no home can be determined.
#[must_use]
pub fn default_root() -> Utf8PathBuf {
    dirs::home_dir()
        .and_then(|path| Utf8PathBuf::from_path_buf(path).ok())
        .unwrap_or_else(|| Utf8PathBuf::from("."))
}
