//! In-memory radio stack implementing every subsystem boundary.
//!
//! The simulation backs the daemon binary on hosts without wireless hardware
//! and drives the test suites. Every call is appended to a shared
//! [`CallLog`]; pure queries (`is_supported`, readiness polls, feature sets)
//! are not logged. Faults can be armed per step, subsystems killed, link state
//! flipped, and interface removal deferred to exercise the asynchronous
//! destroy path.

mod facades;
mod log;

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use wlanmgr_config::HardwareProfile;

use crate::death::{DeathNotifier, RadioModeChangeHandler};
use crate::iface::InterfaceClass;
use crate::listeners::{DestroyedListener, LinkObserver};
use crate::metrics::RadioMode;
use crate::subsystems::{SoftApConfig, Subsystem, Subsystems};

use facades::{
    SimApHost, SimLinkFacility, SimRadioControl, SimStaAuth, SimStationMonitor, SimVendorHal,
};

pub use log::CallLog;

const SIM_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::sim");

/// Capability bits the simulated vendor HAL reports for every interface.
pub const SIM_HAL_FEATURES: u64 = 0x0000_00ff;

/// Key-management bits the simulated station daemon reports.
pub const SIM_KEY_MGMT_FEATURES: u64 = 0x0001_0000;

/// A step the simulation can be told to refuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Fault {
    /// `VendorHal::initialize` returns `false`.
    HalInitialize,
    /// `VendorHal::start` returns `false`.
    HalStart,
    /// Interface creation returns no name.
    HalCreateIface,
    /// Interface removal is refused.
    HalRemoveIface,
    /// `RadioControl::initialize` returns `false`.
    RadioControlInitialize,
    /// Client and soft AP bindings are refused.
    RadioControlSetup,
    /// The station daemon process does not launch.
    StaAuthStart,
    /// The station daemon launches but never finishes initialising.
    StaAuthNeverReady,
    /// The station daemon refuses to attach to an interface.
    StaAuthSetupIface,
    /// The access point daemon process does not launch.
    ApHostStart,
    /// The link facility refuses observers.
    ObserverRegistration,
    /// The access point daemon rejects an access point configuration.
    AccessPointAdd,
}

#[derive(Debug)]
struct HalIface {
    class: InterfaceClass,
    listener: DestroyedListener,
}

#[derive(Debug, Default)]
struct DaemonState {
    initialization_started: bool,
    running: bool,
    death: Option<DeathNotifier>,
}

#[derive(Debug, Default)]
struct SimState {
    faults: BTreeSet<Fault>,
    hal_death: Option<DeathNotifier>,
    radio_death: Option<DeathNotifier>,
    radio_mode_handler: Option<RadioModeChangeHandler>,
    hal_started: bool,
    hal_ifaces: BTreeMap<String, HalIface>,
    deferred_removal: bool,
    pending_removals: Vec<(String, DestroyedListener)>,
    radio_bindings: BTreeMap<String, InterfaceClass>,
    sta_auth: DaemonState,
    ap_host: DaemonState,
    sta_auth_ifaces: BTreeSet<String>,
    access_points: BTreeMap<String, SoftApConfig>,
    monitored: BTreeSet<String>,
    link_up: BTreeMap<String, bool>,
    observers: BTreeMap<u64, LinkObserver>,
    next_observer: u64,
}

impl SimState {
    fn daemon(&mut self, subsystem: Subsystem) -> Option<&mut DaemonState> {
        match subsystem {
            Subsystem::StaAuth => Some(&mut self.sta_auth),
            Subsystem::ApHost => Some(&mut self.ap_host),
            Subsystem::VendorHal | Subsystem::RadioControl => None,
        }
    }
}

#[derive(Debug)]
struct SimInner {
    profile: HardwareProfile,
    state: Mutex<SimState>,
    log: CallLog,
}

impl SimInner {
    fn state(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, entry: impl Into<String>) {
        let entry = entry.into();
        tracing::trace!(target: SIM_TARGET, call = %entry, "simulated call");
        self.log.record(entry);
    }
}

/// Handle to one simulated radio stack.
///
/// Clones share the same hardware.
#[derive(Debug, Clone)]
pub struct SimulatedHardware {
    inner: Arc<SimInner>,
}

impl SimulatedHardware {
    /// Builds idle hardware behaving according to `profile`.
    #[must_use]
    pub fn new(profile: HardwareProfile) -> Self {
        Self::with_log(profile, CallLog::new())
    }

    /// Builds idle hardware recording into an existing log.
    #[must_use]
    pub fn with_log(profile: HardwareProfile, log: CallLog) -> Self {
        Self {
            inner: Arc::new(SimInner {
                profile,
                state: Mutex::new(SimState::default()),
                log,
            }),
        }
    }

    /// Profile the hardware was built with.
    #[must_use]
    pub fn profile(&self) -> HardwareProfile {
        self.inner.profile
    }

    /// Boundary handles for the orchestrator.
    #[must_use]
    pub fn subsystems(&self) -> Subsystems {
        Subsystems {
            vendor_hal: Arc::new(SimVendorHal::new(Arc::clone(&self.inner))),
            radio: Arc::new(SimRadioControl::new(Arc::clone(&self.inner))),
            sta_auth: Arc::new(SimStaAuth::new(Arc::clone(&self.inner))),
            ap_host: Arc::new(SimApHost::new(Arc::clone(&self.inner))),
            monitor: Arc::new(SimStationMonitor::new(Arc::clone(&self.inner))),
            link: Arc::new(SimLinkFacility::new(Arc::clone(&self.inner))),
        }
    }

    /// Shared call record.
    #[must_use]
    pub fn log(&self) -> CallLog {
        self.inner.log.clone()
    }

    /// Arms a fault until cleared.
    pub fn inject_fault(&self, fault: Fault) {
        self.inner.state().faults.insert(fault);
    }

    /// Disarms a fault.
    pub fn clear_fault(&self, fault: Fault) {
        self.inner.state().faults.remove(&fault);
    }

    /// Kills a subsystem process and fires its death handler.
    ///
    /// The handler is consumed; the subsystem must be re-initialised or given a
    /// new handler before a second death is reported. Returns `false` when no
    /// handler was installed.
    pub fn kill(&self, subsystem: Subsystem) -> bool {
        let notifier = {
            let mut state = self.inner.state();
            match subsystem {
                Subsystem::VendorHal => {
                    state.hal_started = false;
                    state.hal_death.take()
                }
                Subsystem::RadioControl => state.radio_death.take(),
                Subsystem::StaAuth | Subsystem::ApHost => state.daemon(subsystem).and_then(|daemon| {
                    daemon.running = false;
                    daemon.initialization_started = false;
                    daemon.death.take()
                }),
            }
        };
        tracing::info!(target: SIM_TARGET, %subsystem, "killing simulated subsystem");
        match notifier {
            Some(notifier) => {
                notifier.notify_death();
                true
            }
            None => false,
        }
    }

    /// Sets the link state of `name` and notifies every observer.
    pub fn set_link_state(&self, name: &str, up: bool) {
        let observers: Vec<LinkObserver> = {
            let mut state = self.inner.state();
            state.link_up.insert(name.to_owned(), up);
            state.observers.values().cloned().collect()
        };
        for observer in observers {
            observer.interface_link_state_changed(name, up);
        }
    }

    /// Switches interface removal between synchronous and deferred completion.
    pub fn set_deferred_removal(&self, deferred: bool) {
        self.inner.state().deferred_removal = deferred;
    }

    /// Completes every deferred removal, firing the destroy listeners.
    ///
    /// Returns the number of removals completed.
    pub fn complete_pending_removals(&self) -> usize {
        let pending = std::mem::take(&mut self.inner.state().pending_removals);
        let completed = pending.len();
        for (name, listener) in pending {
            listener.on_destroyed(&name);
        }
        completed
    }

    /// Reports a radio concurrency mode change through the installed handler.
    ///
    /// Returns `false` when no handler was installed.
    pub fn radio_mode_changed(&self, mode: RadioMode) -> bool {
        let Some(handler) = self.inner.state().radio_mode_handler.clone() else {
            return false;
        };
        handler.on_radio_mode_change(mode);
        true
    }

    /// Names of the interfaces the vendor HAL currently holds.
    #[must_use]
    pub fn hal_interfaces(&self) -> Vec<String> {
        self.inner.state().hal_ifaces.keys().cloned().collect()
    }

    /// Whether the vendor HAL is powered up.
    #[must_use]
    pub fn is_hal_started(&self) -> bool {
        self.inner.state().hal_started
    }

    /// Whether a per-interface daemon process is running.
    #[must_use]
    pub fn is_daemon_running(&self, subsystem: Subsystem) -> bool {
        self.inner
            .state()
            .daemon(subsystem)
            .is_some_and(|daemon| daemon.running)
    }

    /// Whether a per-interface daemon holds a death handler.
    #[must_use]
    pub fn has_death_handler(&self, subsystem: Subsystem) -> bool {
        let mut state = self.inner.state();
        match subsystem {
            Subsystem::VendorHal => state.hal_death.is_some(),
            Subsystem::RadioControl => state.radio_death.is_some(),
            Subsystem::StaAuth | Subsystem::ApHost => state
                .daemon(subsystem)
                .is_some_and(|daemon| daemon.death.is_some()),
        }
    }

    /// Names bound by the wireless control daemon.
    #[must_use]
    pub fn radio_bindings(&self) -> Vec<String> {
        self.inner.state().radio_bindings.keys().cloned().collect()
    }

    /// Whether station events are being delivered for `name`.
    #[must_use]
    pub fn is_monitoring(&self, name: &str) -> bool {
        self.inner.state().monitored.contains(name)
    }

    /// Access point configuration served on `name`.
    #[must_use]
    pub fn access_point(&self, name: &str) -> Option<SoftApConfig> {
        self.inner.state().access_points.get(name).cloned()
    }

    /// Number of registered link observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.inner.state().observers.len()
    }
}
