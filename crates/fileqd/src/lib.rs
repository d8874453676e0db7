//! File-query service.
//!
//! `fileqd` answers single-line text commands about one configured root
//! directory: subdirectory listings, per-file metadata, and zstd-compressed tar
//! archives of files selected by size, extension or creation date. The same
//! binary runs as the primary instance or as one of its two mirrors; only the
//! [`fileq_config::Config`] role and listening endpoint differ.
//!
//! The primary numbers accepted connections and spreads them across tiers.
//! The first batch is served by local workers, the next two batches are
//! proxied to the mirrors, and later connections rotate one at a time. Local
//! workers are capped; a connection arriving while every worker is busy is
//! told so and closed.
//!
//! Startup follows a fixed sequence. Configuration is loaded and telemetry is
//! installed. The root and settings are validated, the listener is bound, and
//! the service then blocks until a termination signal arrives.

mod bootstrap;
pub mod dispatch;
mod distributor;
mod health;
mod process;
pub mod query;
pub mod telemetry;
mod transport;

pub use bootstrap::{
    BootstrapError, ConfigLoader, Service, StaticConfigLoader, SystemConfigLoader, bootstrap_with,
};
pub use distributor::{
    BUSY_MESSAGE, DistributionPolicy, MIRROR_UNAVAILABLE_MESSAGE, Tier, WorkerPermit, WorkerPool,
};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use process::{
    LaunchError, ShutdownError, ShutdownSignal, SystemShutdownSignal, run_service,
    run_service_with,
};
pub use telemetry::{TelemetryError, TelemetryHandle};
pub use transport::ListenerError;

#[cfg(test)]
mod tests;
