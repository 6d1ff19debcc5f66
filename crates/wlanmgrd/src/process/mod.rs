//! Process-level launch and supervision of the lifecycle daemon.

mod errors;
mod launch;
pub(crate) mod shutdown;

pub use errors::LaunchError;
pub use launch::{LoggingInterfaceCallback, bring_up, run_daemon};
pub use shutdown::{ShutdownError, ShutdownSignal, SystemShutdownSignal};

#[cfg(test)]
pub(crate) use launch::{LaunchPlan, run_daemon_with};

pub(crate) const PROCESS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::process");
