//! Interface lifecycle orchestrator.
//!
//! The orchestrator owns the [`Registry`] and sequences every call into the
//! subsystems. It is driven from exactly one thread: the lifecycle worker
//! started by [`spawn_service`](crate::spawn_service), or a test calling it
//! directly. Daemon and radio running state is never stored; it is derived
//! from the registry plus the interface type of the setup call currently in
//! flight.

mod daemons;
mod errors;
mod link_state;
mod recovery;
mod setup;
mod teardown;

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use wlanmgr_config::{
    Config, DEFAULT_DAEMON_CONNECT_INTERVAL_MS, DEFAULT_DAEMON_CONNECT_RETRIES,
    DEFAULT_LEGACY_INTERFACE_NAME,
};

use crate::callbacks::StatusListener;
use crate::death::{DeathNotifier, RadioModeChangeHandler};
use crate::health::HealthReporter;
use crate::iface::{Iface, IfaceId, IfaceType, InterfaceClass};
use crate::listeners::NestedDestroyScope;
use crate::metrics::Metrics;
use crate::queue::{Event, EventSender};
use crate::registry::Registry;
use crate::subsystems::{SoftApConfig, Subsystem, Subsystems, VendorHal};

use daemons::DeathHandlers;

pub use errors::{InitializeError, RecoveryError, SetupError, SoftApError};

const ORCHESTRATOR_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::orchestrator");

/// Tunables for the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorSettings {
    /// Name given to the single interface on hardware without a vendor HAL.
    pub legacy_interface_name: String,
    /// Extra readiness polls granted to a freshly started daemon.
    pub daemon_connect_retries: u32,
    /// Delay between readiness polls.
    pub daemon_connect_interval: Duration,
}

impl OrchestratorSettings {
    /// Extracts the orchestrator settings from the daemon configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            legacy_interface_name: config.legacy_interface_name().to_owned(),
            daemon_connect_retries: config.daemon_connect_retries(),
            daemon_connect_interval: config.daemon_connect_interval(),
        }
    }
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            legacy_interface_name: DEFAULT_LEGACY_INTERFACE_NAME.to_owned(),
            daemon_connect_retries: DEFAULT_DAEMON_CONNECT_RETRIES,
            daemon_connect_interval: Duration::from_millis(DEFAULT_DAEMON_CONNECT_INTERVAL_MS),
        }
    }
}

/// Lifecycle state machine for wireless interfaces.
pub struct Orchestrator {
    subsystems: Subsystems,
    settings: OrchestratorSettings,
    registry: Registry,
    events: EventSender,
    scope: Arc<NestedDestroyScope>,
    metrics: Arc<dyn Metrics>,
    reporter: Arc<dyn HealthReporter>,
    status_listeners: Vec<Arc<dyn StatusListener>>,
    in_flight: Option<IfaceType>,
    death_handlers: DeathHandlers,
    release_deferred: bool,
    /// Instances whose removal the vendor HAL accepted but has not confirmed.
    removal_requested: BTreeSet<IfaceId>,
    next_id: u64,
}

impl Orchestrator {
    /// Builds an orchestrator that queues its notifications on `events`.
    #[must_use]
    pub fn new(
        subsystems: Subsystems,
        settings: OrchestratorSettings,
        events: EventSender,
        metrics: Arc<dyn Metrics>,
        reporter: Arc<dyn HealthReporter>,
    ) -> Self {
        Self {
            subsystems,
            settings,
            registry: Registry::new(),
            events,
            scope: Arc::new(NestedDestroyScope::default()),
            metrics,
            reporter,
            status_listeners: Vec::new(),
            in_flight: None,
            death_handlers: DeathHandlers::default(),
            release_deferred: false,
            removal_requested: BTreeSet::new(),
            next_id: 0,
        }
    }

    /// Connects to the vendor HAL and the wireless control daemon.
    ///
    /// Must run once before any setup call.
    pub fn initialize(&mut self) -> Result<(), InitializeError> {
        let hal = Arc::clone(&self.subsystems.vendor_hal);
        if !hal.initialize(self.death_notifier(Subsystem::VendorHal)) {
            return Err(InitializeError {
                subsystem: Subsystem::VendorHal,
            });
        }
        if !self
            .subsystems
            .radio
            .initialize(self.death_notifier(Subsystem::RadioControl))
        {
            return Err(InitializeError {
                subsystem: Subsystem::RadioControl,
            });
        }
        let handler = RadioModeChangeHandler::new(Arc::clone(&self.metrics));
        if !hal.register_radio_mode_change_handler(handler) {
            tracing::warn!(
                target: ORCHESTRATOR_TARGET,
                "vendor HAL refused the radio mode change handler"
            );
        }
        tracing::info!(target: ORCHESTRATOR_TARGET, "orchestrator initialised");
        Ok(())
    }

    /// Handles one queued notification.
    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::InterfaceDestroyed(iface) => self.complete_destroy(iface),
            Event::LinkStateChanged { iface, name } => self.handle_link_state_changed(iface, &name),
            Event::SubsystemDied(subsystem) => self.handle_subsystem_death(subsystem),
        }
    }

    /// Adds an observer of global stack availability.
    pub fn register_status_listener(&mut self, listener: Arc<dyn StatusListener>) {
        self.status_listeners.push(listener);
    }

    /// Live interfaces.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Name of a live client interface, if any.
    #[must_use]
    pub fn client_interface_name(&self) -> Option<String> {
        self.registry
            .first_of_class(InterfaceClass::Client)
            .map(|iface| iface.name().to_owned())
    }

    /// Name of a live access point interface, if any.
    #[must_use]
    pub fn soft_ap_interface_name(&self) -> Option<String> {
        self.registry
            .first_of_class(InterfaceClass::SoftAp)
            .map(|iface| iface.name().to_owned())
    }

    /// Capability bits cached when the interface was set up.
    #[must_use]
    pub fn supported_feature_set(&self, name: &str) -> Option<u64> {
        self.registry.get(name).map(Iface::feature_set)
    }

    /// Starts serving an access point on a live access point interface.
    pub fn start_soft_ap(&mut self, name: &str, config: &SoftApConfig) -> Result<(), SoftApError> {
        let Some(iface) = self.registry.get(name) else {
            return Err(SoftApError::UnknownInterface {
                name: name.to_owned(),
            });
        };
        if iface.kind() != IfaceType::AccessPoint {
            return Err(SoftApError::NotAccessPoint {
                name: name.to_owned(),
                kind: iface.kind(),
            });
        }
        if !self.subsystems.ap_host.add_access_point(name, config) {
            return Err(SoftApError::Rejected {
                name: name.to_owned(),
            });
        }
        tracing::info!(
            target: ORCHESTRATOR_TARGET,
            name,
            ssid = config.ssid(),
            protected = config.is_protected(),
            "access point started"
        );
        Ok(())
    }

    pub(crate) fn event_sender(&self) -> EventSender {
        self.events.clone()
    }

    fn death_notifier(&self, subsystem: Subsystem) -> DeathNotifier {
        DeathNotifier::new(subsystem, self.events.clone())
    }

    fn allocate_id(&mut self) -> IfaceId {
        self.next_id += 1;
        IfaceId::new(self.next_id)
    }

    /// Registry membership widened by the setup call in flight.
    fn any_of_type(&self, kind: IfaceType) -> bool {
        self.in_flight == Some(kind) || self.registry.any_of_type(kind)
    }

    fn is_idle(&self) -> bool {
        self.in_flight.is_none() && self.registry.is_empty()
    }

    fn vendor_hal_supported(&self) -> bool {
        self.subsystems.vendor_hal.is_supported()
    }

    /// Runs a vendor HAL call that may synchronously fire destroy listeners.
    ///
    /// Listeners fired on this thread during `call` are completed here, inside
    /// the caller's stack and before the call's result is used.
    fn with_nested_destroy<T>(&mut self, call: impl FnOnce(&dyn VendorHal) -> T) -> T {
        let hal = Arc::clone(&self.subsystems.vendor_hal);
        self.scope.enter();
        let result = call(hal.as_ref());
        let evicted = self.scope.leave();
        for iface in evicted {
            self.complete_destroy(iface);
        }
        result
    }

    fn stop_stack(&self) {
        tracing::info!(
            target: ORCHESTRATOR_TARGET,
            "no interfaces remain; stopping radio stack"
        );
        if !self.subsystems.radio.tear_down_interfaces() {
            tracing::warn!(
                target: ORCHESTRATOR_TARGET,
                "wireless control daemon failed to tear down interfaces"
            );
        }
        let hal = &self.subsystems.vendor_hal;
        if hal.is_supported() && !hal.stop() {
            tracing::warn!(target: ORCHESTRATOR_TARGET, "vendor HAL failed to stop");
        }
    }

    fn unbind_radio(&self, name: &str, class: InterfaceClass) {
        let radio = &self.subsystems.radio;
        let released = match class {
            InterfaceClass::Client => radio.tear_down_client_interface(name),
            InterfaceClass::SoftAp => radio.tear_down_soft_ap_interface(name),
        };
        if !released {
            tracing::warn!(
                target: ORCHESTRATOR_TARGET,
                name,
                %class,
                "wireless control daemon failed to release interface"
            );
        }
    }

    fn notify_status(&self, ready: bool) {
        for listener in &self.status_listeners {
            listener.on_status_changed(ready);
        }
    }
}

impl fmt::Debug for Orchestrator {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Orchestrator")
            .field("settings", &self.settings)
            .field("registry", &self.registry)
            .field("in_flight", &self.in_flight)
            .field("death_handlers", &self.death_handlers)
            .field("removal_requested", &self.removal_requested)
            .finish_non_exhaustive()
    }
}

fn remove_from_hal(hal: &dyn VendorHal, class: InterfaceClass, name: &str) -> bool {
    match class {
        InterfaceClass::Client => hal.remove_sta_iface(name),
        InterfaceClass::SoftAp => hal.remove_ap_iface(name),
    }
}
