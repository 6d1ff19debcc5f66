//! Ordered interface setup with reverse-order rollback.

use std::sync::Arc;

use crate::callbacks::InterfaceCallback;
use crate::iface::{Iface, IfaceId, IfaceType, InterfaceClass};
use crate::listeners::{DestroyedListener, LinkObserver};
use crate::metrics::MetricKey;
use crate::registry::DuplicateNameError;
use crate::subsystems::ObserverHandle;

use super::daemons::DaemonKind;
use super::{ORCHESTRATOR_TARGET, Orchestrator, SetupError, remove_from_hal};

/// Side effects of a setup call that has not completed yet.
#[derive(Debug)]
enum Acquired {
    /// This call found the stack idle and brought it up.
    Stack,
    Daemon(DaemonKind),
    HalIface { name: String, class: InterfaceClass },
    RadioBinding { name: String, class: InterfaceClass },
    StaIface(String),
    Observer(ObserverHandle),
    Monitoring(String),
}

impl Orchestrator {
    /// Sets up a client interface able to associate with networks.
    pub fn setup_interface_for_client_in_connectivity_mode(
        &mut self,
        callback: Arc<dyn InterfaceCallback>,
    ) -> Result<String, SetupError> {
        self.setup_interface(IfaceType::StaConnectivity, callback)
    }

    /// Sets up a client interface restricted to scanning.
    pub fn setup_interface_for_client_in_scan_mode(
        &mut self,
        callback: Arc<dyn InterfaceCallback>,
    ) -> Result<String, SetupError> {
        self.setup_interface(IfaceType::StaScanOnly, callback)
    }

    /// Sets up an access point interface.
    pub fn setup_interface_for_soft_ap_mode(
        &mut self,
        callback: Arc<dyn InterfaceCallback>,
    ) -> Result<String, SetupError> {
        self.setup_interface(IfaceType::AccessPoint, callback)
    }

    fn setup_interface(
        &mut self,
        kind: IfaceType,
        callback: Arc<dyn InterfaceCallback>,
    ) -> Result<String, SetupError> {
        self.reporter.interface_setup_starting(kind);
        let mut acquired = Vec::new();
        let outcome = self.acquire_interface(kind, callback, &mut acquired);
        self.in_flight = None;
        match outcome {
            Ok(name) => {
                self.reporter.interface_ready(kind, &name);
                Ok(name)
            }
            Err(error) => {
                self.roll_back(acquired);
                self.metrics
                    .increment(MetricKey::SetupFailure(kind.class(), error.failure_reason()));
                self.reporter.interface_setup_failed(kind, &error);
                Err(error)
            }
        }
    }

    fn acquire_interface(
        &mut self,
        kind: IfaceType,
        callback: Arc<dyn InterfaceCallback>,
        acquired: &mut Vec<Acquired>,
    ) -> Result<String, SetupError> {
        if self.is_idle() {
            self.start_stack()?;
            acquired.push(Acquired::Stack);
        }
        self.in_flight = Some(kind);

        if let Some(daemon) = DaemonKind::for_iface(kind)
            && !self.registry.any_of_type(kind)
        {
            if !self.start_daemon(daemon) {
                return Err(daemon.start_failure());
            }
            acquired.push(Acquired::Daemon(daemon));
        }

        let id = self.allocate_id();
        let class = kind.class();
        let name = if self.vendor_hal_supported() {
            let name = self.create_vendor_iface(id, kind)?;
            acquired.push(Acquired::HalIface {
                name: name.clone(),
                class,
            });
            self.claim_name(&name)?;
            name
        } else {
            self.evict_for_legacy_hardware();
            self.settings.legacy_interface_name.clone()
        };

        let radio = &self.subsystems.radio;
        let bound = match class {
            InterfaceClass::Client => radio.setup_interface_for_client_mode(&name),
            InterfaceClass::SoftAp => radio.setup_interface_for_soft_ap_mode(&name),
        };
        if !bound {
            return Err(SetupError::WificondSetupFailure { name });
        }
        acquired.push(Acquired::RadioBinding {
            name: name.clone(),
            class,
        });

        if kind == IfaceType::StaConnectivity {
            if !self.subsystems.sta_auth.setup_iface(&name) {
                return Err(SetupError::SupplicantIfaceFailure { name });
            }
            acquired.push(Acquired::StaIface(name.clone()));
        }

        let observer = LinkObserver::new(id, name.clone(), self.events.clone());
        let handle = self
            .subsystems
            .link
            .register_observer(observer)
            .map_err(|source| SetupError::ObserverRegistrationFailure {
                name: name.clone(),
                source,
            })?;
        acquired.push(Acquired::Observer(handle));
        if kind.is_client() {
            self.subsystems.monitor.start_monitoring(&name);
            acquired.push(Acquired::Monitoring(name.clone()));
        }
        let up = self.read_link_up(&name);
        if kind == IfaceType::StaConnectivity {
            self.reset_ip_configuration(&name);
        }
        let feature_set = self.query_feature_set(kind, &name);

        self.registry.put(Iface {
            id,
            name: name.clone(),
            kind,
            callback,
            observer: Some(handle),
            last_known_up: false,
            feature_set,
        })?;
        tracing::info!(
            target: ORCHESTRATOR_TARGET,
            %id,
            name = %name,
            %kind,
            "interface registered"
        );
        self.apply_link_state(&name, up);
        Ok(name)
    }

    fn start_stack(&self) -> Result<(), SetupError> {
        let hal = &self.subsystems.vendor_hal;
        if !hal.is_supported() {
            return Ok(());
        }
        if hal.start() {
            Ok(())
        } else {
            Err(SetupError::HalStartFailure)
        }
    }

    fn create_vendor_iface(&mut self, id: IfaceId, kind: IfaceType) -> Result<String, SetupError> {
        let listener = DestroyedListener::new(id, Arc::clone(&self.scope), self.events.clone());
        // The HAL may evict an existing interface during this call; its
        // destroyed path completes before the new name is inspected.
        let created = self.with_nested_destroy(|hal| match kind {
            IfaceType::StaConnectivity => hal.create_sta_iface(false, listener),
            IfaceType::StaScanOnly => hal.create_sta_iface(true, listener),
            IfaceType::AccessPoint => hal.create_ap_iface(listener),
        });
        created.ok_or(SetupError::HalCreateIfaceFailure { kind })
    }

    /// Makes room in the registry for a name the vendor HAL just handed out.
    ///
    /// A HAL reusing the name of an instance whose removal it already accepted
    /// has dropped that instance, so its destroyed path completes now. Any
    /// other live holder of the name is a duplicate.
    fn claim_name(&mut self, name: &str) -> Result<(), SetupError> {
        let Some(previous) = self.registry.get(name).map(Iface::id) else {
            return Ok(());
        };
        if !self.removal_requested.contains(&previous) {
            return Err(DuplicateNameError::new(name).into());
        }
        tracing::info!(
            target: ORCHESTRATOR_TARGET,
            name,
            %previous,
            "vendor HAL reused the name of an interface pending removal"
        );
        self.complete_destroy(previous);
        Ok(())
    }

    /// Hardware without a vendor HAL carries a single interface.
    fn evict_for_legacy_hardware(&mut self) {
        let live: Vec<IfaceId> = self.registry.iter().map(Iface::id).collect();
        for iface in live {
            tracing::info!(
                target: ORCHESTRATOR_TARGET,
                %iface,
                "legacy hardware holds one interface; destroying the existing one"
            );
            self.complete_destroy(iface);
        }
    }

    fn reset_ip_configuration(&self, name: &str) {
        let link = &self.subsystems.link;
        if !link.clear_interface_addresses(name) {
            tracing::warn!(target: ORCHESTRATOR_TARGET, name, "failed to clear addresses");
        }
        if !link.set_ipv6_privacy_extensions(name, true) {
            tracing::warn!(
                target: ORCHESTRATOR_TARGET,
                name,
                "failed to enable IPv6 privacy extensions"
            );
        }
        if !link.disable_ipv6(name) {
            tracing::warn!(target: ORCHESTRATOR_TARGET, name, "failed to disable IPv6");
        }
    }

    fn query_feature_set(&self, kind: IfaceType, name: &str) -> u64 {
        let hal = &self.subsystems.vendor_hal;
        let mut features = if hal.is_supported() {
            hal.supported_feature_set(name)
        } else {
            0
        };
        if kind == IfaceType::StaConnectivity {
            features |= self.subsystems.sta_auth.advanced_key_mgmt_capabilities(name);
        }
        features
    }

    fn roll_back(&mut self, acquired: Vec<Acquired>) {
        if acquired.is_empty() {
            return;
        }
        for step in acquired.into_iter().rev() {
            tracing::debug!(target: ORCHESTRATOR_TARGET, ?step, "rolling back");
            match step {
                Acquired::Monitoring(name) => self.subsystems.monitor.stop_monitoring(&name),
                Acquired::Observer(handle) => self.subsystems.link.unregister_observer(handle),
                Acquired::StaIface(name) => {
                    if !self.subsystems.sta_auth.teardown_iface(&name) {
                        tracing::warn!(
                            target: ORCHESTRATOR_TARGET,
                            name,
                            "station authentication daemon failed to detach"
                        );
                    }
                }
                Acquired::RadioBinding { name, class } => self.unbind_radio(&name, class),
                Acquired::HalIface { name, class } => {
                    let removed = self.with_nested_destroy(|hal| remove_from_hal(hal, class, &name));
                    if !removed {
                        tracing::warn!(
                            target: ORCHESTRATOR_TARGET,
                            name,
                            "vendor HAL refused to remove abandoned interface"
                        );
                    }
                }
                Acquired::Daemon(daemon) => self.release_daemon_if_unused(daemon),
                Acquired::Stack => {}
            }
        }
        if self.is_idle() {
            self.stop_stack();
        }
    }
}
