//! Stop requests for the foreground service.

use std::io;

use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
use signal_hook::iterator::Signals;
use thiserror::Error;
use tracing::info;

use super::PROCESS_TARGET;

/// Source of the request that ends `run_service_with`.
///
/// The call blocks the launching thread while the accept loop runs in the
/// background; returning tells the service to stop accepting.
pub trait ShutdownSignal: Send + Sync {
    /// Blocks until the service should stop accepting connections.
    fn wait(&self) -> Result<(), ShutdownError>;
}

/// Failure to start waiting for a stop request.
#[derive(Debug, Error)]
pub enum ShutdownError {
    /// The signal-hook iterator could not be registered.
    #[error("failed to install signal handlers: {source}")]
    Install {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Stops the service on the first SIGTERM, SIGINT, SIGQUIT or SIGHUP.
///
/// SIGHUP is a stop request here, not a configuration reload.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemShutdownSignal;

impl ShutdownSignal for SystemShutdownSignal {
    fn wait(&self) -> Result<(), ShutdownError> {
        let mut signals = Signals::new([SIGTERM, SIGINT, SIGQUIT, SIGHUP])
            .map_err(|source| ShutdownError::Install { source })?;
        if let Some(signal) = signals.forever().next() {
            info!(target: PROCESS_TARGET, signal, "shutdown signal received");
        }
        Ok(())
    }
}
