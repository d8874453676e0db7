//! Supervises service launch sequencing.

use std::sync::Arc;

use tracing::info;

use crate::bootstrap::{ConfigLoader, SystemConfigLoader, bootstrap_with};
use crate::health::{HealthReporter, StructuredHealthReporter};
use crate::transport::SocketListener;

use super::PROCESS_TARGET;
use super::errors::LaunchError;
use super::shutdown::{ShutdownSignal, SystemShutdownSignal};

/// Runs the service with the production collaborators.
///
/// # Errors
///
/// Returns [`LaunchError`] when bootstrap, listener startup or signal
/// installation fails.
pub fn run_service() -> Result<(), LaunchError> {
    run_service_with(
        &SystemConfigLoader,
        Arc::new(StructuredHealthReporter::new()),
        &SystemShutdownSignal,
    )
}

/// Runs the service with injected collaborators.
///
/// Blocks until `shutdown` returns, then stops accepting and joins the accept
/// thread. Connections already handed to workers finish on their own.
///
/// # Errors
///
/// Returns [`LaunchError`] when bootstrap, listener startup or signal
/// installation fails.
pub fn run_service_with(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
    shutdown: &dyn ShutdownSignal,
) -> Result<(), LaunchError> {
    let service = bootstrap_with(loader, reporter)?;
    let config = service.config();
    info!(
        target: PROCESS_TARGET,
        role = %config.role(),
        listen = %config.listen(),
        "starting service runtime"
    );

    let listener = SocketListener::bind(config.listen())?;
    let handle = listener.start(Arc::new(service.distributor()))?;
    service.reporter().service_listening(config.listen());

    let waited = shutdown.wait();
    service.reporter().service_stopping();
    handle.shutdown();
    handle.join()?;
    waited?;

    info!(target: PROCESS_TARGET, "shutdown sequence completed");
    Ok(())
}
