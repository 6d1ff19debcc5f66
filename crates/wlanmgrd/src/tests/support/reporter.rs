//! Test double for [`HealthReporter`] that records structured events for assertions.

use std::sync::Mutex;

use wlanmgr_config::Config;

use crate::bootstrap::BootstrapError;
use crate::health::HealthReporter;
use crate::iface::IfaceType;
use crate::orchestrator::{RecoveryError, SetupError};
use crate::subsystems::Subsystem;

/// Structured health events tracked during scenarios.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthEvent {
    BootstrapStarting,
    BootstrapSucceeded,
    BootstrapFailed(String),
    SetupStarting(IfaceType),
    InterfaceReady { kind: IfaceType, name: String },
    SetupFailed { kind: IfaceType, error: SetupError },
    InterfaceDestroyed { kind: IfaceType, name: String },
    SubsystemDied(Subsystem),
    SubsystemRecovered(Subsystem),
    RecoveryFailed(RecoveryError),
}

/// Records health events for assertions.
#[derive(Debug, Default)]
pub struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    /// Captures a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    pub fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn bootstrap_starting(&self) {
        self.record(HealthEvent::BootstrapStarting);
    }

    fn bootstrap_succeeded(&self, _config: &Config) {
        self.record(HealthEvent::BootstrapSucceeded);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.record(HealthEvent::BootstrapFailed(error.to_string()));
    }

    fn interface_setup_starting(&self, kind: IfaceType) {
        self.record(HealthEvent::SetupStarting(kind));
    }

    fn interface_ready(&self, kind: IfaceType, name: &str) {
        self.record(HealthEvent::InterfaceReady {
            kind,
            name: name.to_owned(),
        });
    }

    fn interface_setup_failed(&self, kind: IfaceType, error: &SetupError) {
        self.record(HealthEvent::SetupFailed {
            kind,
            error: error.clone(),
        });
    }

    fn interface_destroyed(&self, kind: IfaceType, name: &str) {
        self.record(HealthEvent::InterfaceDestroyed {
            kind,
            name: name.to_owned(),
        });
    }

    fn subsystem_died(&self, subsystem: Subsystem) {
        self.record(HealthEvent::SubsystemDied(subsystem));
    }

    fn subsystem_recovered(&self, subsystem: Subsystem) {
        self.record(HealthEvent::SubsystemRecovered(subsystem));
    }

    fn subsystem_recovery_failed(&self, error: &RecoveryError) {
        self.record(HealthEvent::RecoveryFailed(*error));
    }
}
