//! Teardown requests and the shared destroyed path.

use crate::iface::{Iface, IfaceId, IfaceType};

use super::daemons::DaemonKind;
use super::{ORCHESTRATOR_TARGET, Orchestrator, remove_from_hal};

impl Orchestrator {
    /// Requests removal of the named interface. Unknown names are ignored.
    ///
    /// Completion, including the owner's `on_destroyed`, follows the vendor
    /// HAL's destroy notification. A HAL that refuses the request has the
    /// destroyed path completed locally so the registry stays consistent.
    /// Repeating the request while the HAL has not confirmed it does nothing.
    pub fn teardown_interface(&mut self, name: &str) {
        let Some(iface) = self.registry.get(name) else {
            tracing::debug!(
                target: ORCHESTRATOR_TARGET,
                name,
                "teardown requested for unknown interface"
            );
            return;
        };
        let (id, kind) = (iface.id(), iface.kind());
        if self.removal_requested.contains(&id) {
            tracing::debug!(
                target: ORCHESTRATOR_TARGET,
                name,
                "removal already requested; waiting for the vendor HAL"
            );
            return;
        }
        self.request_removal(id, kind, name);
    }

    /// Removes every live interface, then releases daemons and the radio stack
    /// once instead of per interface.
    pub fn teardown_all_interfaces(&mut self) {
        let targets: Vec<(IfaceId, IfaceType, String)> = self
            .registry
            .iter()
            .map(|iface| (iface.id(), iface.kind(), iface.name().to_owned()))
            .collect();
        if targets.is_empty() {
            return;
        }
        self.release_deferred = true;
        for (id, kind, name) in &targets {
            self.request_removal(*id, *kind, name);
        }
        self.release_deferred = false;

        for daemon in [DaemonKind::StaAuth, DaemonKind::ApHost] {
            if targets.iter().any(|(_, kind, _)| *kind == daemon.iface_type()) {
                self.release_daemon_if_unused(daemon);
            }
        }
        if self.is_idle() {
            self.stop_stack();
        }
    }

    fn request_removal(&mut self, id: IfaceId, kind: IfaceType, name: &str) {
        if !self.vendor_hal_supported() {
            self.complete_destroy(id);
            return;
        }
        self.removal_requested.insert(id);
        let removed = self.with_nested_destroy(|hal| remove_from_hal(hal, kind.class(), name));
        if !removed {
            tracing::warn!(
                target: ORCHESTRATOR_TARGET,
                name,
                "vendor HAL refused removal; completing teardown locally"
            );
            self.complete_destroy(id);
        }
    }

    /// Destroyed path shared by teardown, eviction, and legacy replacement.
    ///
    /// Ids that are no longer registered are stale notifications and ignored.
    pub(crate) fn complete_destroy(&mut self, id: IfaceId) {
        let Some(iface) = self.registry.remove_by_id(id) else {
            tracing::debug!(
                target: ORCHESTRATOR_TARGET,
                iface = %id,
                "ignoring destroy notification for unregistered interface"
            );
            return;
        };
        self.removal_requested.remove(&id);
        let Iface {
            name,
            kind,
            callback,
            observer,
            ..
        } = iface;
        tracing::info!(target: ORCHESTRATOR_TARGET, iface = %id, name = %name, %kind, "interface destroyed");

        if kind.is_client() {
            self.subsystems.monitor.stop_monitoring(&name);
        }
        if let Some(handle) = observer {
            self.subsystems.link.unregister_observer(handle);
        }
        let detached = match kind {
            IfaceType::StaConnectivity => self.subsystems.sta_auth.teardown_iface(&name),
            IfaceType::AccessPoint => self.subsystems.ap_host.remove_access_point(&name),
            IfaceType::StaScanOnly => true,
        };
        if !detached {
            tracing::warn!(
                target: ORCHESTRATOR_TARGET,
                name = %name,
                "daemon failed to detach from interface"
            );
        }
        self.unbind_radio(&name, kind.class());

        if !self.release_deferred {
            if let Some(daemon) = DaemonKind::for_iface(kind) {
                self.release_daemon_if_unused(daemon);
            }
            if self.is_idle() {
                self.stop_stack();
            }
        }

        callback.on_destroyed(&name);
        self.reporter.interface_destroyed(kind, &name);
    }
}
