//! Per-interface listeners handed to the vendor HAL and the link facility.

use std::mem;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, ThreadId};

use crate::iface::IfaceId;
use crate::queue::{Event, EventSender};

const LISTENER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::listeners");

/// Captures destroy notifications raised synchronously inside a vendor HAL
/// call made by the orchestrator.
///
/// While a scope is open, a listener fired on the owning thread is recorded
/// here instead of being queued; the orchestrator completes those destroyed
/// paths as soon as the HAL call returns, still inside the creating call.
#[derive(Debug, Default)]
pub(crate) struct NestedDestroyScope {
    state: Mutex<ScopeState>,
}

#[derive(Debug, Default)]
struct ScopeState {
    owner: Option<ThreadId>,
    captured: Vec<IfaceId>,
}

impl NestedDestroyScope {
    pub(crate) fn enter(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.owner = Some(thread::current().id());
    }

    pub(crate) fn leave(&self) -> Vec<IfaceId> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.owner = None;
        mem::take(&mut state.captured)
    }

    fn capture(&self, iface: IfaceId) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.owner == Some(thread::current().id()) {
            state.captured.push(iface);
            true
        } else {
            false
        }
    }
}

/// Destroy notification handle registered with the vendor HAL at creation.
///
/// Fires at most once; clones share the same latch.
#[derive(Debug, Clone)]
pub struct DestroyedListener {
    iface: IfaceId,
    scope: Arc<NestedDestroyScope>,
    events: EventSender,
    fired: Arc<AtomicBool>,
}

impl DestroyedListener {
    pub(crate) fn new(iface: IfaceId, scope: Arc<NestedDestroyScope>, events: EventSender) -> Self {
        Self {
            iface,
            scope,
            events,
            fired: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Instance this listener belongs to.
    #[must_use]
    pub fn iface(&self) -> IfaceId {
        self.iface
    }

    /// The hardware interface `name` has been removed.
    pub fn on_destroyed(&self, name: &str) {
        if self.fired.swap(true, Ordering::AcqRel) {
            tracing::debug!(
                target: LISTENER_TARGET,
                iface = %self.iface,
                name,
                "ignoring repeated destroy notification"
            );
            return;
        }
        if self.scope.capture(self.iface) {
            tracing::debug!(
                target: LISTENER_TARGET,
                iface = %self.iface,
                name,
                "destroy notification raised inside vendor HAL call"
            );
            return;
        }
        self.events.send(Event::InterfaceDestroyed(self.iface));
    }
}

/// Link observer registered for one interface instance.
#[derive(Debug, Clone)]
pub struct LinkObserver {
    iface: IfaceId,
    name: String,
    events: EventSender,
}

impl LinkObserver {
    pub(crate) fn new(iface: IfaceId, name: impl Into<String>, events: EventSender) -> Self {
        Self {
            iface,
            name: name.into(),
            events,
        }
    }

    /// Interface this observer watches.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Link state changed on `name`.
    ///
    /// The reported state is advisory; the orchestrator re-reads the link
    /// configuration before acting. Notifications for other interfaces are
    /// ignored.
    pub fn interface_link_state_changed(&self, name: &str, link_up: bool) {
        if name != self.name {
            return;
        }
        tracing::trace!(
            target: LISTENER_TARGET,
            iface = %self.iface,
            name,
            link_up,
            "link state notification"
        );
        self.events.send(Event::LinkStateChanged {
            iface: self.iface,
            name: self.name.clone(),
        });
    }
}
