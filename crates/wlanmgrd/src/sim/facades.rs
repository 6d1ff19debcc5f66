//! Boundary trait implementations over the shared simulated state.

use std::sync::Arc;

use wlanmgr_config::HardwareProfile;

use crate::death::{DeathNotifier, RadioModeChangeHandler};
use crate::iface::InterfaceClass;
use crate::listeners::{DestroyedListener, LinkObserver};
use crate::subsystems::{
    ApHostDaemon, InterfaceConfig, LinkError, LinkFacility, ManagedDaemon, ObserverHandle,
    RadioControl, SoftApConfig, StaAuthDaemon, StationEventMonitor, Subsystem, VendorHal,
};

use super::{Fault, HalIface, SIM_HAL_FEATURES, SIM_KEY_MGMT_FEATURES, SIM_TARGET, SimInner};

/// Name handed out by single-interface hardware.
const SINGLE_INTERFACE_NAME: &str = "wlan0";

pub(super) struct SimVendorHal {
    inner: Arc<SimInner>,
}

impl SimVendorHal {
    pub(super) fn new(inner: Arc<SimInner>) -> Self {
        Self { inner }
    }

    fn create(&self, class: InterfaceClass, listener: DestroyedListener) -> Option<String> {
        if !self.is_supported() {
            return None;
        }
        let (name, evicted) = {
            let mut state = self.inner.state();
            if state.faults.contains(&Fault::HalCreateIface) {
                return None;
            }
            let mut evicted = Vec::new();
            let name = if self.inner.profile == HardwareProfile::SingleInterface {
                if state.hal_ifaces.values().any(|iface| iface.class == class) {
                    tracing::debug!(
                        target: SIM_TARGET,
                        %class,
                        "single-interface hardware already holds this class"
                    );
                    return None;
                }
                let names: Vec<String> = state.hal_ifaces.keys().cloned().collect();
                for name in names {
                    if let Some(iface) = state.hal_ifaces.remove(&name) {
                        state.link_up.remove(&name);
                        evicted.push((name, iface.listener));
                    }
                }
                SINGLE_INTERFACE_NAME.to_owned()
            } else {
                (0..)
                    .map(|index| format!("wlan{index}"))
                    .find(|candidate| !state.hal_ifaces.contains_key(candidate))
                    .unwrap_or_default()
            };
            state
                .hal_ifaces
                .insert(name.clone(), HalIface { class, listener });
            (name, evicted)
        };
        for (old, listener) in evicted {
            self.inner.record(format!("vendor_hal.evict({old})"));
            listener.on_destroyed(&old);
        }
        Some(name)
    }

    fn remove(&self, name: &str) -> bool {
        let listener = {
            let mut state = self.inner.state();
            if state.faults.contains(&Fault::HalRemoveIface) {
                return false;
            }
            let Some(iface) = state.hal_ifaces.remove(name) else {
                return false;
            };
            state.link_up.remove(name);
            if state.deferred_removal {
                state
                    .pending_removals
                    .push((name.to_owned(), iface.listener));
                return true;
            }
            iface.listener
        };
        listener.on_destroyed(name);
        true
    }
}

impl VendorHal for SimVendorHal {
    fn initialize(&self, death: DeathNotifier) -> bool {
        self.inner.record("vendor_hal.initialize");
        let mut state = self.inner.state();
        if state.faults.contains(&Fault::HalInitialize) {
            return false;
        }
        state.hal_death = Some(death);
        true
    }

    fn register_radio_mode_change_handler(&self, handler: RadioModeChangeHandler) -> bool {
        self.inner
            .record("vendor_hal.register_radio_mode_change_handler");
        self.inner.state().radio_mode_handler = Some(handler);
        true
    }

    fn is_supported(&self) -> bool {
        self.inner.profile != HardwareProfile::Legacy
    }

    fn start(&self) -> bool {
        self.inner.record("vendor_hal.start");
        let mut state = self.inner.state();
        if state.faults.contains(&Fault::HalStart) {
            return false;
        }
        state.hal_started = true;
        true
    }

    fn stop(&self) -> bool {
        self.inner.record("vendor_hal.stop");
        self.inner.state().hal_started = false;
        true
    }

    fn create_sta_iface(&self, low_priority: bool, listener: DestroyedListener) -> Option<String> {
        self.inner
            .record(format!("vendor_hal.create_sta_iface({low_priority})"));
        self.create(InterfaceClass::Client, listener)
    }

    fn create_ap_iface(&self, listener: DestroyedListener) -> Option<String> {
        self.inner.record("vendor_hal.create_ap_iface");
        self.create(InterfaceClass::SoftAp, listener)
    }

    fn remove_sta_iface(&self, name: &str) -> bool {
        self.inner
            .record(format!("vendor_hal.remove_sta_iface({name})"));
        self.remove(name)
    }

    fn remove_ap_iface(&self, name: &str) -> bool {
        self.inner
            .record(format!("vendor_hal.remove_ap_iface({name})"));
        self.remove(name)
    }

    fn supported_feature_set(&self, name: &str) -> u64 {
        if self.inner.state().hal_ifaces.contains_key(name) {
            SIM_HAL_FEATURES
        } else {
            0
        }
    }
}

pub(super) struct SimRadioControl {
    inner: Arc<SimInner>,
}

impl SimRadioControl {
    pub(super) fn new(inner: Arc<SimInner>) -> Self {
        Self { inner }
    }

    fn bind(&self, name: &str, class: InterfaceClass) -> bool {
        let mut state = self.inner.state();
        if state.faults.contains(&Fault::RadioControlSetup) {
            return false;
        }
        state.radio_bindings.insert(name.to_owned(), class);
        true
    }

    fn unbind(&self, name: &str) -> bool {
        self.inner.state().radio_bindings.remove(name).is_some()
    }
}

impl RadioControl for SimRadioControl {
    fn initialize(&self, death: DeathNotifier) -> bool {
        self.inner.record("radio.initialize");
        let mut state = self.inner.state();
        if state.faults.contains(&Fault::RadioControlInitialize) {
            return false;
        }
        state.radio_death = Some(death);
        true
    }

    fn setup_interface_for_client_mode(&self, name: &str) -> bool {
        self.inner.record(format!("radio.setup_client({name})"));
        self.bind(name, InterfaceClass::Client)
    }

    fn setup_interface_for_soft_ap_mode(&self, name: &str) -> bool {
        self.inner.record(format!("radio.setup_soft_ap({name})"));
        self.bind(name, InterfaceClass::SoftAp)
    }

    fn tear_down_client_interface(&self, name: &str) -> bool {
        self.inner.record(format!("radio.tear_down_client({name})"));
        self.unbind(name)
    }

    fn tear_down_soft_ap_interface(&self, name: &str) -> bool {
        self.inner
            .record(format!("radio.tear_down_soft_ap({name})"));
        self.unbind(name)
    }

    fn tear_down_interfaces(&self) -> bool {
        self.inner.record("radio.tear_down_interfaces");
        self.inner.state().radio_bindings.clear();
        true
    }
}

/// Process handshake shared by both simulated daemons.
struct SimDaemon {
    inner: Arc<SimInner>,
    subsystem: Subsystem,
    start_fault: Fault,
}

impl SimDaemon {
    fn is_running(&self) -> bool {
        self.inner
            .state()
            .daemon(self.subsystem)
            .is_some_and(|daemon| daemon.running)
    }
}

impl ManagedDaemon for SimDaemon {
    fn is_initialization_started(&self) -> bool {
        self.inner
            .state()
            .daemon(self.subsystem)
            .is_some_and(|daemon| daemon.initialization_started)
    }

    fn initialize(&self) -> bool {
        self.inner.record(format!("{}.initialize", self.subsystem));
        if let Some(daemon) = self.inner.state().daemon(self.subsystem) {
            daemon.initialization_started = true;
        }
        true
    }

    fn start_daemon(&self) -> bool {
        self.inner.record(format!("{}.start_daemon", self.subsystem));
        let mut state = self.inner.state();
        if state.faults.contains(&self.start_fault) {
            return false;
        }
        let Some(daemon) = state.daemon(self.subsystem) else {
            return false;
        };
        daemon.running = true;
        true
    }

    fn is_initialization_complete(&self) -> bool {
        let mut state = self.inner.state();
        let stalled = self.subsystem == Subsystem::StaAuth
            && state.faults.contains(&Fault::StaAuthNeverReady);
        !stalled
            && state
                .daemon(self.subsystem)
                .is_some_and(|daemon| daemon.running)
    }

    fn register_death_handler(&self, death: DeathNotifier) -> bool {
        self.inner
            .record(format!("{}.register_death_handler", self.subsystem));
        if let Some(daemon) = self.inner.state().daemon(self.subsystem) {
            daemon.death = Some(death);
        }
        true
    }

    fn deregister_death_handler(&self) -> bool {
        self.inner
            .record(format!("{}.deregister_death_handler", self.subsystem));
        if let Some(daemon) = self.inner.state().daemon(self.subsystem) {
            daemon.death = None;
        }
        true
    }

    fn terminate(&self) {
        self.inner.record(format!("{}.terminate", self.subsystem));
        if let Some(daemon) = self.inner.state().daemon(self.subsystem) {
            daemon.running = false;
        }
    }
}

macro_rules! delegate_managed_daemon {
    ($facade:ty) => {
        impl ManagedDaemon for $facade {
            fn is_initialization_started(&self) -> bool {
                self.daemon.is_initialization_started()
            }

            fn initialize(&self) -> bool {
                self.daemon.initialize()
            }

            fn start_daemon(&self) -> bool {
                self.daemon.start_daemon()
            }

            fn is_initialization_complete(&self) -> bool {
                self.daemon.is_initialization_complete()
            }

            fn register_death_handler(&self, death: DeathNotifier) -> bool {
                self.daemon.register_death_handler(death)
            }

            fn deregister_death_handler(&self) -> bool {
                self.daemon.deregister_death_handler()
            }

            fn terminate(&self) {
                self.daemon.terminate();
            }
        }
    };
}

pub(super) struct SimStaAuth {
    daemon: SimDaemon,
}

impl SimStaAuth {
    pub(super) fn new(inner: Arc<SimInner>) -> Self {
        Self {
            daemon: SimDaemon {
                inner,
                subsystem: Subsystem::StaAuth,
                start_fault: Fault::StaAuthStart,
            },
        }
    }
}

delegate_managed_daemon!(SimStaAuth);

impl StaAuthDaemon for SimStaAuth {
    fn setup_iface(&self, name: &str) -> bool {
        let inner = &self.daemon.inner;
        inner.record(format!("sta_auth.setup_iface({name})"));
        if !self.daemon.is_running() {
            return false;
        }
        let mut state = inner.state();
        if state.faults.contains(&Fault::StaAuthSetupIface) {
            return false;
        }
        state.sta_auth_ifaces.insert(name.to_owned());
        true
    }

    fn teardown_iface(&self, name: &str) -> bool {
        let inner = &self.daemon.inner;
        inner.record(format!("sta_auth.teardown_iface({name})"));
        inner.state().sta_auth_ifaces.remove(name)
    }

    fn advanced_key_mgmt_capabilities(&self, name: &str) -> u64 {
        if self.daemon.inner.state().sta_auth_ifaces.contains(name) {
            SIM_KEY_MGMT_FEATURES
        } else {
            0
        }
    }
}

pub(super) struct SimApHost {
    daemon: SimDaemon,
}

impl SimApHost {
    pub(super) fn new(inner: Arc<SimInner>) -> Self {
        Self {
            daemon: SimDaemon {
                inner,
                subsystem: Subsystem::ApHost,
                start_fault: Fault::ApHostStart,
            },
        }
    }
}

delegate_managed_daemon!(SimApHost);

impl ApHostDaemon for SimApHost {
    fn add_access_point(&self, name: &str, config: &SoftApConfig) -> bool {
        let inner = &self.daemon.inner;
        inner.record(format!("ap_host.add_access_point({name})"));
        if !self.daemon.is_running() {
            return false;
        }
        let mut state = inner.state();
        if state.faults.contains(&Fault::AccessPointAdd) {
            return false;
        }
        state.access_points.insert(name.to_owned(), config.clone());
        true
    }

    fn remove_access_point(&self, name: &str) -> bool {
        let inner = &self.daemon.inner;
        inner.record(format!("ap_host.remove_access_point({name})"));
        inner.state().access_points.remove(name);
        true
    }
}

pub(super) struct SimStationMonitor {
    inner: Arc<SimInner>,
}

impl SimStationMonitor {
    pub(super) fn new(inner: Arc<SimInner>) -> Self {
        Self { inner }
    }
}

impl StationEventMonitor for SimStationMonitor {
    fn start_monitoring(&self, name: &str) {
        self.inner.record(format!("monitor.start({name})"));
        self.inner.state().monitored.insert(name.to_owned());
    }

    fn stop_monitoring(&self, name: &str) {
        self.inner.record(format!("monitor.stop({name})"));
        self.inner.state().monitored.remove(name);
    }
}

pub(super) struct SimLinkFacility {
    inner: Arc<SimInner>,
}

impl SimLinkFacility {
    pub(super) fn new(inner: Arc<SimInner>) -> Self {
        Self { inner }
    }
}

impl LinkFacility for SimLinkFacility {
    fn register_observer(&self, observer: LinkObserver) -> Result<ObserverHandle, LinkError> {
        self.inner
            .record(format!("link.register_observer({})", observer.name()));
        let mut state = self.inner.state();
        if state.faults.contains(&Fault::ObserverRegistration) {
            return Err(LinkError::Rejected {
                name: observer.name().to_owned(),
                reason: "observer registration fault armed".to_owned(),
            });
        }
        state.next_observer += 1;
        let token = state.next_observer;
        state.observers.insert(token, observer);
        Ok(ObserverHandle::new(token))
    }

    fn unregister_observer(&self, handle: ObserverHandle) {
        let removed = self.inner.state().observers.remove(&handle.get());
        match removed {
            Some(observer) => self
                .inner
                .record(format!("link.unregister_observer({})", observer.name())),
            None => tracing::debug!(
                target: SIM_TARGET,
                handle = handle.get(),
                "unknown observer handle"
            ),
        }
    }

    fn interface_config(&self, name: &str) -> Option<InterfaceConfig> {
        let state = self.inner.state();
        state.radio_bindings.contains_key(name).then(|| InterfaceConfig {
            up: state.link_up.get(name).copied().unwrap_or(false),
        })
    }

    fn clear_interface_addresses(&self, name: &str) -> bool {
        self.inner.record(format!("link.clear_addresses({name})"));
        true
    }

    fn set_ipv6_privacy_extensions(&self, name: &str, enabled: bool) -> bool {
        self.inner
            .record(format!("link.ipv6_privacy({name}, {enabled})"));
        true
    }

    fn disable_ipv6(&self, name: &str) -> bool {
        self.inner.record(format!("link.disable_ipv6({name})"));
        true
    }
}
