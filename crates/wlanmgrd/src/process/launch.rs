//! Supervises daemon launch sequencing and runtime orchestration.

use std::sync::Arc;

use tracing::info;

use wlanmgr_config::{Config, StartupMode};

use crate::StructuredHealthReporter;
use crate::bootstrap::{ConfigLoader, StaticConfigLoader, SystemConfigLoader, bootstrap_with};
use crate::callbacks::InterfaceCallback;
use crate::health::HealthReporter;
use crate::metrics::{CountingMetrics, Metrics};
use crate::service::{InterfaceManager, ManagerError};
use crate::sim::SimulatedHardware;
use crate::subsystems::SoftApConfig;

use super::PROCESS_TARGET;
use super::errors::LaunchError;
use super::shutdown::{ShutdownSignal, SystemShutdownSignal};

/// Collaborators required to launch the daemon runtime.
pub(crate) struct LaunchPlan<L, S> {
    pub(crate) loader: L,
    pub(crate) reporter: Arc<dyn HealthReporter>,
    pub(crate) shutdown: S,
    /// Hardware to drive; built from the configured profile when absent.
    pub(crate) hardware: Option<SimulatedHardware>,
    pub(crate) metrics: Arc<CountingMetrics>,
}

/// Runs the daemon using the production collaborators.
pub fn run_daemon() -> Result<(), LaunchError> {
    let plan = LaunchPlan {
        loader: SystemConfigLoader,
        reporter: Arc::new(StructuredHealthReporter::new()),
        shutdown: SystemShutdownSignal::new(),
        hardware: None,
        metrics: Arc::new(CountingMetrics::new()),
    };
    run_daemon_with(plan)
}

/// Runs the daemon with injected collaborators.
pub(crate) fn run_daemon_with<L, S>(plan: LaunchPlan<L, S>) -> Result<(), LaunchError>
where
    L: ConfigLoader,
    S: ShutdownSignal,
{
    let LaunchPlan {
        loader,
        reporter,
        shutdown,
        hardware,
        metrics,
    } = plan;

    let config = loader.load()?;
    let hardware = hardware.unwrap_or_else(|| SimulatedHardware::new(config.hardware_profile()));
    info!(
        target: PROCESS_TARGET,
        hardware_profile = %hardware.profile(),
        startup_mode = %config.startup_mode(),
        "starting daemon runtime"
    );
    let static_loader = StaticConfigLoader::new(config);
    let counters: Arc<dyn Metrics> = metrics.clone();
    let daemon = bootstrap_with(&static_loader, reporter, hardware.subsystems(), counters)?;

    let callback: Arc<dyn InterfaceCallback> = Arc::new(LoggingInterfaceCallback);
    if let Err(error) = bring_up(daemon.manager(), daemon.config(), callback) {
        daemon.shutdown()?;
        return Err(error.into());
    }

    let waited = shutdown.wait();
    daemon.shutdown()?;
    waited?;

    for (key, count) in metrics.snapshot() {
        info!(target: PROCESS_TARGET, metric = %key, count, "lifecycle counter");
    }
    info!(target: PROCESS_TARGET, "shutdown sequence completed");
    Ok(())
}

/// Brings up the interface selected by `startup_mode`.
///
/// Returns the interface name, or `None` when the daemon starts idle. In soft
/// AP mode the access point is also started with the configured SSID.
pub fn bring_up(
    manager: &InterfaceManager,
    config: &Config,
    callback: Arc<dyn InterfaceCallback>,
) -> Result<Option<String>, ManagerError> {
    let name = match config.startup_mode() {
        StartupMode::Idle => return Ok(None),
        StartupMode::Client => manager.setup_interface_for_client_in_connectivity_mode(callback)?,
        StartupMode::ScanOnly => manager.setup_interface_for_client_in_scan_mode(callback)?,
        StartupMode::SoftAp => {
            let name = manager.setup_interface_for_soft_ap_mode(callback)?;
            let mut access_point = SoftApConfig::open(config.soft_ap_ssid());
            if let Some(passphrase) = config.soft_ap_passphrase() {
                access_point = access_point.with_passphrase(passphrase);
            }
            manager.start_soft_ap(&name, access_point)?;
            name
        }
    };
    info!(target: PROCESS_TARGET, name = %name, "startup interface ready");
    Ok(Some(name))
}

/// Interface owner used by the daemon binary; it only logs notifications.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingInterfaceCallback;

impl InterfaceCallback for LoggingInterfaceCallback {
    fn on_up(&self, name: &str) {
        info!(target: PROCESS_TARGET, name, "interface up");
    }

    fn on_down(&self, name: &str) {
        info!(target: PROCESS_TARGET, name, "interface down");
    }

    fn on_destroyed(&self, name: &str) {
        info!(target: PROCESS_TARGET, name, "interface destroyed");
    }
}
