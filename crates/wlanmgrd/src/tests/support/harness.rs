//! Orchestrator driven directly on the test thread over simulated hardware.

use std::sync::Arc;
use std::time::Duration;

use wlanmgr_config::HardwareProfile;

use crate::iface::IfaceType;
use crate::metrics::CountingMetrics;
use crate::orchestrator::{Orchestrator, OrchestratorSettings, SetupError};
use crate::queue::{Looper, channel};
use crate::sim::{CallLog, SimulatedHardware};

use super::callbacks::RecordingCallback;
use super::reporter::RecordingHealthReporter;

/// Readiness polling shortened so stalled daemons fail quickly.
pub fn test_settings() -> OrchestratorSettings {
    OrchestratorSettings {
        daemon_connect_retries: 2,
        daemon_connect_interval: Duration::from_millis(1),
        ..OrchestratorSettings::default()
    }
}

/// Initialised orchestrator plus the queue it posts to.
///
/// Queued notifications are only handled when [`Harness::pump`] runs, which
/// lets tests interleave them with direct calls.
pub struct Harness {
    pub hardware: SimulatedHardware,
    pub log: CallLog,
    pub metrics: Arc<CountingMetrics>,
    pub reporter: Arc<RecordingHealthReporter>,
    pub orchestrator: Orchestrator,
    looper: Looper,
}

impl Harness {
    /// Builds and initialises an orchestrator, then clears the call log.
    pub fn new(profile: HardwareProfile) -> Self {
        let hardware = SimulatedHardware::new(profile);
        let log = hardware.log();
        let (events, looper) = channel();
        let metrics = Arc::new(CountingMetrics::new());
        let reporter = Arc::new(RecordingHealthReporter::default());
        let mut orchestrator = Orchestrator::new(
            hardware.subsystems(),
            test_settings(),
            events,
            metrics.clone(),
            reporter.clone(),
        );
        orchestrator
            .initialize()
            .expect("orchestrator should initialise");
        log.clear();
        Self {
            hardware,
            log,
            metrics,
            reporter,
            orchestrator,
            looper,
        }
    }

    /// Handles every queued notification.
    pub fn pump(&mut self) -> usize {
        self.looper.dispatch_pending(&mut self.orchestrator)
    }

    /// Owner recording into the shared call log.
    pub fn owner(&self, label: &str) -> Arc<RecordingCallback> {
        RecordingCallback::new(label, self.log.clone())
    }

    pub fn setup(
        &mut self,
        kind: IfaceType,
        owner: &Arc<RecordingCallback>,
    ) -> Result<String, SetupError> {
        let callback = owner.clone();
        match kind {
            IfaceType::StaConnectivity => self
                .orchestrator
                .setup_interface_for_client_in_connectivity_mode(callback),
            IfaceType::StaScanOnly => self
                .orchestrator
                .setup_interface_for_client_in_scan_mode(callback),
            IfaceType::AccessPoint => self.orchestrator.setup_interface_for_soft_ap_mode(callback),
        }
    }

    /// Index of an entry that must be present.
    pub fn position(&self, entry: &str) -> usize {
        self.log
            .position(entry)
            .unwrap_or_else(|| panic!("missing {entry} in {:?}", self.log.entries()))
    }

    pub fn interface_names(&self) -> Vec<String> {
        self.orchestrator
            .registry()
            .iter()
            .map(|iface| iface.name().to_owned())
            .collect()
    }
}
