//! Interface owners and status observers used by the suites.

use std::sync::{Arc, Mutex};

use mockall::mock;

use crate::callbacks::{InterfaceCallback, StatusListener};
use crate::sim::CallLog;

/// Owner that writes its notifications into the hardware call log, so they
/// can be ordered against subsystem calls.
#[derive(Debug)]
pub struct RecordingCallback {
    label: String,
    log: CallLog,
}

impl RecordingCallback {
    pub fn new(label: &str, log: CallLog) -> Arc<Self> {
        Arc::new(Self {
            label: label.to_owned(),
            log,
        })
    }

    pub fn destroyed_entry(&self, name: &str) -> String {
        format!("{}.on_destroyed({name})", self.label)
    }

    pub fn up_entry(&self, name: &str) -> String {
        format!("{}.on_up({name})", self.label)
    }

    pub fn down_entry(&self, name: &str) -> String {
        format!("{}.on_down({name})", self.label)
    }
}

impl InterfaceCallback for RecordingCallback {
    fn on_up(&self, name: &str) {
        self.log.record(self.up_entry(name));
    }

    fn on_down(&self, name: &str) {
        self.log.record(self.down_entry(name));
    }

    fn on_destroyed(&self, name: &str) {
        self.log.record(self.destroyed_entry(name));
    }
}

/// Status observer that keeps every reported value.
#[derive(Debug, Default)]
pub struct RecordingStatusListener {
    changes: Mutex<Vec<bool>>,
}

impl RecordingStatusListener {
    pub fn changes(&self) -> Vec<bool> {
        self.changes
            .lock()
            .expect("status listener mutex poisoned")
            .clone()
    }
}

impl StatusListener for RecordingStatusListener {
    fn on_status_changed(&self, ready: bool) {
        self.changes
            .lock()
            .expect("status listener mutex poisoned")
            .push(ready);
    }
}

mock! {
    pub Owner {}

    impl InterfaceCallback for Owner {
        fn on_up(&self, name: &str);
        fn on_down(&self, name: &str);
        fn on_destroyed(&self, name: &str);
    }
}

mock! {
    pub Listener {}

    impl StatusListener for Listener {
        fn on_status_changed(&self, ready: bool);
    }
}
