//! BDD test world: simulated hardware, the orchestrator, and per-owner results.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::sync::Arc;

use wlanmgr_config::HardwareProfile;

use crate::iface::IfaceType;
use crate::orchestrator::SetupError;
use crate::subsystems::Subsystem;

use super::callbacks::{RecordingCallback, RecordingStatusListener};
use super::harness::Harness;

/// Scenario world shared across BDD steps.
#[derive(Default)]
pub struct TestWorld {
    harness: Option<Harness>,
    pub status: Option<Arc<RecordingStatusListener>>,
    owners: BTreeMap<String, Arc<RecordingCallback>>,
    results: BTreeMap<String, Result<String, SetupError>>,
}

impl TestWorld {
    pub fn use_hardware(&mut self, profile: HardwareProfile) {
        self.harness = Some(Harness::new(profile));
    }

    pub fn harness(&self) -> Result<&Harness, String> {
        self.harness
            .as_ref()
            .ok_or_else(|| "no hardware configured".to_owned())
    }

    pub fn harness_mut(&mut self) -> Result<&mut Harness, String> {
        self.harness
            .as_mut()
            .ok_or_else(|| "no hardware configured".to_owned())
    }

    pub fn listen_for_status(&mut self) -> Result<(), String> {
        let listener = Arc::new(RecordingStatusListener::default());
        self.harness_mut()?
            .orchestrator
            .register_status_listener(listener.clone());
        self.status = Some(listener);
        Ok(())
    }

    pub fn setup(&mut self, label: &str, kind: IfaceType) -> Result<(), String> {
        let harness = self
            .harness
            .as_mut()
            .ok_or_else(|| "no hardware configured".to_owned())?;
        let owner = harness.owner(label);
        let result = harness.setup(kind, &owner);
        self.owners.insert(label.to_owned(), owner);
        self.results.insert(label.to_owned(), result);
        Ok(())
    }

    pub fn teardown_all(&mut self) -> Result<(), String> {
        let harness = self.harness_mut()?;
        harness.orchestrator.teardown_all_interfaces();
        harness.pump();
        Ok(())
    }

    pub fn kill(&mut self, subsystem: Subsystem) -> Result<(), String> {
        let harness = self.harness_mut()?;
        if !harness.hardware.kill(subsystem) {
            return Err(format!("{subsystem} had no death handler"));
        }
        harness.pump();
        Ok(())
    }

    pub fn result(&self, label: &str) -> Result<&Result<String, SetupError>, String> {
        self.results
            .get(label)
            .ok_or_else(|| format!("owner {label} never requested an interface"))
    }
}

pub fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::default())
}
