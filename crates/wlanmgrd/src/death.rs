//! Death dispatch from subsystem handlers into the lifecycle queue.

use std::fmt;
use std::sync::Arc;

use crate::metrics::{MetricKey, Metrics, RadioMode};
use crate::queue::{Event, EventSender};
use crate::subsystems::Subsystem;

const DEATH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::death");

/// Death handler given to one subsystem.
///
/// May be invoked from any thread. The notification is always queued, never
/// handled inline, so it is processed after whatever lifecycle operation is in
/// flight.
#[derive(Debug, Clone)]
pub struct DeathNotifier {
    subsystem: Subsystem,
    events: EventSender,
}

impl DeathNotifier {
    /// Binds a handler for `subsystem` to the lifecycle queue.
    #[must_use]
    pub fn new(subsystem: Subsystem, events: EventSender) -> Self {
        Self { subsystem, events }
    }

    /// Subsystem this handler was issued to.
    #[must_use]
    pub fn subsystem(&self) -> Subsystem {
        self.subsystem
    }

    /// Reports that the subsystem process died.
    pub fn notify_death(&self) {
        tracing::warn!(
            target: DEATH_TARGET,
            subsystem = %self.subsystem,
            "subsystem death reported"
        );
        self.events.send(Event::SubsystemDied(self.subsystem));
    }
}

/// Receiver of vendor HAL radio-mode notifications.
///
/// These only feed counters and carry no lifecycle effect, so they bypass the
/// queue.
#[derive(Clone)]
pub struct RadioModeChangeHandler {
    metrics: Arc<dyn Metrics>,
}

impl RadioModeChangeHandler {
    /// Builds a handler feeding the supplied counters.
    #[must_use]
    pub fn new(metrics: Arc<dyn Metrics>) -> Self {
        Self { metrics }
    }

    /// The radio entered `mode`.
    pub fn on_radio_mode_change(&self, mode: RadioMode) {
        tracing::debug!(target: DEATH_TARGET, ?mode, "radio mode changed");
        self.metrics.increment(MetricKey::RadioModeChange(mode));
    }
}

impl fmt::Debug for RadioModeChangeHandler {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("RadioModeChangeHandler")
            .finish_non_exhaustive()
    }
}
