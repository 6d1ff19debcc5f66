//! Wireless interface lifecycle daemon.
//!
//! The daemon creates, tracks, and destroys logical wireless interfaces on
//! top of a set of external subsystems: the vendor HAL, the wireless control
//! daemon, the station authentication daemon, and the access point host
//! daemon. Each subsystem sits behind a trait in [`subsystems`], so the
//! [`Orchestrator`] can be driven against real integrations or the in-memory
//! stack in [`sim`].
//!
//! All lifecycle work happens on one worker thread. Subsystem deaths, destroy
//! notifications, link changes, and caller requests travel through a single
//! queue and are handled strictly in arrival order. [`InterfaceManager`] is
//! the thread-safe front end that marshals calls onto that worker.
//!
//! Interface setup is a fixed sequence: power up the radio stack, start the
//! daemon the interface needs, create the interface in the vendor HAL, bind it
//! in the wireless control daemon, attach the daemon, then register for link
//! events. Any failure unwinds the completed steps in reverse order, so a
//! failed setup leaves no trace. Whether the radio stack and each daemon are
//! running is never stored: it is derived from the live interfaces, and the
//! last interface to go takes its dependencies down with it.
//!
//! On single-interface hardware, creating an interface of one class may evict
//! an interface of the other. The evicted interface is fully destroyed,
//! including its owner's `on_destroyed`, before the creating call returns.

mod bootstrap;
mod callbacks;
mod death;
mod health;
mod iface;
mod listeners;
mod metrics;
mod orchestrator;
mod process;
mod queue;
mod registry;
mod service;
pub mod sim;
pub mod subsystems;
mod telemetry;

pub use bootstrap::{
    BootstrapError, ConfigLoader, Daemon, StaticConfigLoader, SystemConfigLoader, bootstrap_with,
};
pub use callbacks::{InterfaceCallback, StatusListener};
pub use death::{DeathNotifier, RadioModeChangeHandler};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use iface::{Iface, IfaceId, IfaceType, InterfaceClass};
pub use listeners::{DestroyedListener, LinkObserver};
pub use metrics::{CountingMetrics, FailureReason, MetricKey, Metrics, RadioMode};
pub use orchestrator::{
    InitializeError, Orchestrator, OrchestratorSettings, RecoveryError, SetupError, SoftApError,
};
pub use process::{
    LaunchError, LoggingInterfaceCallback, ShutdownError, ShutdownSignal, SystemShutdownSignal,
    bring_up, run_daemon,
};
pub use queue::{Event, EventSender, Looper, channel};
pub use registry::{DuplicateNameError, Registry};
pub use service::{InterfaceManager, ManagerError, ServiceError, ServiceHandle, spawn_service};
pub use telemetry::{TelemetryError, TelemetryHandle};

#[cfg(test)]
mod tests;
