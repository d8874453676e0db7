//! Service bootstrap orchestration.

use std::fs;
use std::sync::Arc;

use camino::Utf8PathBuf;
use ortho_config::OrthoError;
use thiserror::Error;

use fileq_config::{Config, SocketPreparationError};

use crate::dispatch::{CommandRouter, ConnectionWorker};
use crate::distributor::{DistributionPolicy, Distributor, MIRROR_CONNECT_TIMEOUT, WorkerPool};
use crate::health::HealthReporter;
use crate::telemetry::{self, TelemetryError};

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the service configuration.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that delegates to [`Config::load`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load()
    }
}

/// Loader returning a configuration resolved elsewhere.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps an already resolved configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// A numeric setting is outside its accepted range.
    #[error("invalid setting '{name}': {reason}")]
    InvalidSetting {
        /// Configuration key.
        name: &'static str,
        /// Accepted range.
        reason: &'static str,
    },
    /// The root directory could not be inspected.
    #[error("failed to access root directory '{path}': {source}")]
    Root {
        /// Configured root.
        path: Utf8PathBuf,
        /// Underlying filesystem error.
        #[source]
        source: std::io::Error,
    },
    /// The root exists but is not a directory.
    #[error("root '{path}' is not a directory")]
    RootNotDirectory {
        /// Configured root.
        path: Utf8PathBuf,
    },
    /// Socket preparation failed.
    #[error("failed to prepare service socket: {source}")]
    Socket {
        /// Filesystem error reported while preparing the socket directory.
        #[source]
        source: SocketPreparationError,
    },
}

/// Result of a successful bootstrap invocation.
pub struct Service {
    config: Config,
    reporter: Arc<dyn HealthReporter>,
}

impl Service {
    /// Accessor for the resolved configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Reporter supplied at bootstrap.
    #[must_use]
    pub fn reporter(&self) -> &Arc<dyn HealthReporter> {
        &self.reporter
    }

    /// Builds the connection handler for this instance.
    pub(crate) fn distributor(&self) -> Distributor {
        let router = Arc::new(CommandRouter::from_config(&self.config));
        let worker = ConnectionWorker::new(router, self.config.io_timeout());
        Distributor::new(
            DistributionPolicy::from_config(&self.config),
            WorkerPool::new(self.config.max_workers),
            worker,
            MIRROR_CONNECT_TIMEOUT,
        )
    }
}

/// Bootstraps the service using the supplied collaborators.
///
/// # Errors
///
/// Returns [`BootstrapError`] when configuration cannot be loaded, telemetry
/// cannot be installed, or the configuration fails validation.
pub fn bootstrap_with(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
) -> Result<Service, BootstrapError> {
    reporter.bootstrap_starting();

    let result = loader
        .load()
        .map_err(|source| BootstrapError::Configuration { source })
        .and_then(|config| {
            telemetry::initialise(&config)
                .map_err(|source| BootstrapError::Telemetry { source })?;
            validate(&config)?;
            config
                .listen()
                .prepare_filesystem()
                .map_err(|source| BootstrapError::Socket { source })?;
            Ok(config)
        });

    match result {
        Ok(config) => {
            reporter.bootstrap_succeeded(&config);
            Ok(Service { config, reporter })
        }
        Err(error) => {
            reporter.bootstrap_failed(&error);
            Err(error)
        }
    }
}

fn validate(config: &Config) -> Result<(), BootstrapError> {
    if config.max_workers == 0 {
        return Err(BootstrapError::InvalidSetting {
            name: "max_workers",
            reason: "must be at least 1",
        });
    }
    if config.tier_batch == 0 {
        return Err(BootstrapError::InvalidSetting {
            name: "tier_batch",
            reason: "must be at least 1",
        });
    }
    let metadata = fs::metadata(config.root().as_std_path()).map_err(|source| {
        BootstrapError::Root {
            path: config.root().to_path_buf(),
            source,
        }
    })?;
    if !metadata.is_dir() {
        return Err(BootstrapError::RootNotDirectory {
            path: config.root().to_path_buf(),
        });
    }
    Ok(())
}
