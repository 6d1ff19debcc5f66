//! Link state reads and up/down transitions for live interfaces.

use std::sync::Arc;

use crate::iface::{Iface, IfaceId};
use crate::metrics::MetricKey;

use super::{ORCHESTRATOR_TARGET, Orchestrator};

impl Orchestrator {
    /// Reads the link state directly from the link facility.
    ///
    /// `false` when the configuration cannot be read.
    #[must_use]
    pub fn is_interface_up(&self, name: &str) -> bool {
        self.read_link_up(name)
    }

    pub(super) fn read_link_up(&self, name: &str) -> bool {
        self.subsystems
            .link
            .interface_config(name)
            .is_some_and(|config| config.up)
    }

    pub(super) fn handle_link_state_changed(&mut self, iface: IfaceId, name: &str) {
        if self.registry.get(name).map(Iface::id) != Some(iface) {
            tracing::debug!(
                target: ORCHESTRATOR_TARGET,
                %iface,
                name,
                "ignoring link event for an interface that is gone"
            );
            return;
        }
        let up = self.read_link_up(name);
        self.apply_link_state(name, up);
    }

    /// Delivers `on_up`/`on_down` only on an actual transition.
    pub(super) fn apply_link_state(&mut self, name: &str, up: bool) {
        let Some(iface) = self.registry.get_mut(name) else {
            return;
        };
        if iface.last_known_up == up {
            return;
        }
        iface.last_known_up = up;
        let callback = Arc::clone(&iface.callback);
        let class = iface.kind.class();
        tracing::info!(target: ORCHESTRATOR_TARGET, name, up, "link state changed");
        if up {
            callback.on_up(name);
        } else {
            self.metrics.increment(MetricKey::InterfaceDown(class));
            callback.on_down(name);
        }
    }
}
