//! Daemon bootstrap orchestration.

use std::sync::Arc;

use ortho_config::OrthoError;
use thiserror::Error;

use wlanmgr_config::Config;

use crate::health::HealthReporter;
use crate::metrics::Metrics;
use crate::orchestrator::{InitializeError, Orchestrator, OrchestratorSettings};
use crate::queue;
use crate::service::{InterfaceManager, ServiceError, ServiceHandle, spawn_service};
use crate::subsystems::Subsystems;
use crate::telemetry::{self, TelemetryError, TelemetryHandle};

const BOOTSTRAP_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::bootstrap");

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the daemon configuration.
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

/// Loader returning a configuration resolved earlier.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps an already loaded configuration.
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
    /// The vendor HAL or the wireless control daemon refused initialisation.
    #[error("failed to initialise the radio stack: {source}")]
    Initialize {
        /// Subsystem that refused.
        #[source]
        source: InitializeError,
    },
    /// The lifecycle worker could not be started.
    #[error("failed to start the lifecycle worker: {source}")]
    Service {
        /// Underlying worker error.
        #[source]
        source: ServiceError,
    },
}

/// Result of a successful bootstrap invocation.
#[derive(Debug)]
pub struct Daemon {
    config: Config,
    manager: InterfaceManager,
    service: ServiceHandle,
    telemetry: TelemetryHandle,
}

impl Daemon {
    /// Accessor for the resolved configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Handle used to request interface lifecycle operations.
    #[must_use]
    pub fn manager(&self) -> &InterfaceManager {
        &self.manager
    }

    /// Accessor for the telemetry handle, primarily useful for testing.
    #[must_use]
    pub fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }

    /// Tears down every interface, then stops the lifecycle worker.
    pub fn shutdown(self) -> Result<(), ServiceError> {
        if let Err(error) = self.manager.teardown_all_interfaces() {
            tracing::warn!(
                target: BOOTSTRAP_TARGET,
                %error,
                "interfaces could not be torn down before shutdown"
            );
        }
        self.service.shutdown()
    }
}

/// Bootstraps the daemon using the supplied collaborators.
///
/// Loads configuration, installs telemetry, initialises the orchestrator
/// against `subsystems`, and moves it onto the lifecycle worker.
pub fn bootstrap_with(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
    subsystems: Subsystems,
    metrics: Arc<dyn Metrics>,
) -> Result<Daemon, BootstrapError> {
    reporter.bootstrap_starting();

    let config = match loader.load() {
        Ok(config) => config,
        Err(source) => {
            return Err(fail(&reporter, BootstrapError::Configuration { source }));
        }
    };

    let telemetry = match telemetry::initialise(&config) {
        Ok(handle) => handle,
        Err(source) => {
            return Err(fail(&reporter, BootstrapError::Telemetry { source }));
        }
    };

    let (events, looper) = queue::channel();
    let mut orchestrator = Orchestrator::new(
        subsystems,
        OrchestratorSettings::from_config(&config),
        events,
        metrics,
        Arc::clone(&reporter),
    );
    if let Err(source) = orchestrator.initialize() {
        return Err(fail(&reporter, BootstrapError::Initialize { source }));
    }

    let (manager, service) = match spawn_service(orchestrator, looper) {
        Ok(parts) => parts,
        Err(source) => {
            return Err(fail(&reporter, BootstrapError::Service { source }));
        }
    };
    reporter.bootstrap_succeeded(&config);

    Ok(Daemon {
        config,
        manager,
        service,
        telemetry,
    })
}

fn fail(reporter: &Arc<dyn HealthReporter>, error: BootstrapError) -> BootstrapError {
    reporter.bootstrap_failed(&error);
    error
}
