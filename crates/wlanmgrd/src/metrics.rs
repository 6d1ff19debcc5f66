//! Counters reported to the metrics collaborator.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Mutex, PoisonError};

use crate::iface::InterfaceClass;
use crate::subsystems::Subsystem;

/// Component blamed for a failed interface setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FailureReason {
    /// Vendor HAL refused to start or create the interface.
    Hal,
    /// Station authentication daemon refused to start or attach.
    Supplicant,
    /// Access point host daemon refused to start.
    Hostapd,
    /// Wireless control daemon refused to bind the interface.
    Wificond,
    /// The link facility refused the interface's observer.
    LinkObserver,
    /// The vendor HAL handed out a name that is still live.
    DuplicateName,
}

/// Radio concurrency modes reported by the vendor HAL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RadioMode {
    /// Multi-channel concurrency.
    Mcc,
    /// Single-channel concurrency.
    Scc,
    /// Single-band simultaneous operation.
    Sbs,
    /// Dual-band simultaneous operation.
    Dbs,
}

/// Identity of one counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetricKey {
    /// A subsystem died.
    Crash(Subsystem),
    /// An interface setup failed.
    SetupFailure(InterfaceClass, FailureReason),
    /// An interface transitioned from up to down.
    InterfaceDown(InterfaceClass),
    /// The radio switched concurrency mode.
    RadioModeChange(RadioMode),
}

impl fmt::Display for MetricKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Crash(subsystem) => write!(formatter, "crash.{subsystem}"),
            Self::SetupFailure(class, reason) => {
                write!(formatter, "setup_failure.{class}.{reason:?}")
            }
            Self::InterfaceDown(class) => write!(formatter, "interface_down.{class}"),
            Self::RadioModeChange(mode) => write!(formatter, "radio_mode.{mode:?}"),
        }
    }
}

/// Sink for lifecycle counters.
pub trait Metrics: Send + Sync {
    /// Adds one to the counter.
    fn increment(&self, key: MetricKey);
}

/// In-memory counters.
#[derive(Debug, Default)]
pub struct CountingMetrics {
    counts: Mutex<BTreeMap<MetricKey, u64>>,
}

impl CountingMetrics {
    /// Builds an empty counter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of a counter.
    #[must_use]
    pub fn count(&self, key: MetricKey) -> u64 {
        self.counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .copied()
            .unwrap_or(0)
    }

    /// Copy of every non-zero counter.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<MetricKey, u64> {
        self.counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Metrics for CountingMetrics {
    fn increment(&self, key: MetricKey) {
        let mut counts = self.counts.lock().unwrap_or_else(PoisonError::into_inner);
        *counts.entry(key).or_insert(0) += 1;
    }
}
