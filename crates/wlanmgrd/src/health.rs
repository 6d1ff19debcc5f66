//! Structured health reporting for daemon and interface lifecycle events.

use std::sync::Arc;

use crate::bootstrap::BootstrapError;
use crate::iface::IfaceType;
use crate::orchestrator::{RecoveryError, SetupError};
use crate::subsystems::Subsystem;

use wlanmgr_config::Config;

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait HealthReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn bootstrap_starting(&self);

    /// Invoked after bootstrap completes successfully.
    fn bootstrap_succeeded(&self, config: &Config);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked before an interface setup sequence begins.
    fn interface_setup_starting(&self, kind: IfaceType);

    /// Invoked once an interface has been registered.
    fn interface_ready(&self, kind: IfaceType, name: &str);

    /// Invoked after a failed setup has been rolled back.
    fn interface_setup_failed(&self, kind: IfaceType, error: &SetupError);

    /// Invoked after an interface's destroyed path completed.
    fn interface_destroyed(&self, kind: IfaceType, name: &str);

    /// Invoked when a subsystem death is handled.
    fn subsystem_died(&self, subsystem: Subsystem);

    /// Invoked when a crashed subsystem has been restored.
    fn subsystem_recovered(&self, subsystem: Subsystem);

    /// Invoked when a crashed subsystem could not be restored.
    fn subsystem_recovery_failed(&self, error: &RecoveryError);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        (**self).bootstrap_succeeded(config);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn interface_setup_starting(&self, kind: IfaceType) {
        (**self).interface_setup_starting(kind);
    }

    fn interface_ready(&self, kind: IfaceType, name: &str) {
        (**self).interface_ready(kind, name);
    }

    fn interface_setup_failed(&self, kind: IfaceType, error: &SetupError) {
        (**self).interface_setup_failed(kind, error);
    }

    fn interface_destroyed(&self, kind: IfaceType, name: &str) {
        (**self).interface_destroyed(kind, name);
    }

    fn subsystem_died(&self, subsystem: Subsystem) {
        (**self).subsystem_died(subsystem);
    }

    fn subsystem_recovered(&self, subsystem: Subsystem) {
        (**self).subsystem_recovered(subsystem);
    }

    fn subsystem_recovery_failed(&self, error: &RecoveryError) {
        (**self).subsystem_recovery_failed(error);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_starting",
            "starting daemon bootstrap"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_succeeded",
            hardware_profile = %config.hardware_profile(),
            startup_mode = %config.startup_mode(),
            log_filter = %config.log_filter(),
            log_format = ?config.log_format(),
            "daemon bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "bootstrap_failed",
            error = %error,
            "daemon bootstrap failed"
        );
    }

    fn interface_setup_starting(&self, kind: IfaceType) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "interface_setup_starting",
            kind = %kind,
            "setting up interface"
        );
    }

    fn interface_ready(&self, kind: IfaceType, name: &str) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "interface_ready",
            kind = %kind,
            name,
            "interface ready"
        );
    }

    fn interface_setup_failed(&self, kind: IfaceType, error: &SetupError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "interface_setup_failed",
            kind = %kind,
            reason = ?error.failure_reason(),
            error = %error,
            "interface setup failed"
        );
    }

    fn interface_destroyed(&self, kind: IfaceType, name: &str) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "interface_destroyed",
            kind = %kind,
            name,
            "interface destroyed"
        );
    }

    fn subsystem_died(&self, subsystem: Subsystem) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "subsystem_died",
            subsystem = %subsystem,
            "subsystem died"
        );
    }

    fn subsystem_recovered(&self, subsystem: Subsystem) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "subsystem_recovered",
            subsystem = %subsystem,
            "subsystem recovered"
        );
    }

    fn subsystem_recovery_failed(&self, error: &RecoveryError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "subsystem_recovery_failed",
            subsystem = %error.subsystem,
            stage = error.stage,
            "subsystem recovery failed"
        );
    }
}
