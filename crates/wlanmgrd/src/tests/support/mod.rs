//! Shared doubles and harnesses for the daemon test suites.

mod callbacks;
mod config_loader;
mod harness;
mod reporter;
mod world;

pub use callbacks::{MockListener, MockOwner, RecordingCallback, RecordingStatusListener};
pub use config_loader::{FailingConfigLoader, TestConfigLoader, test_config};
pub use harness::{Harness, test_settings};
pub use reporter::{HealthEvent, RecordingHealthReporter};
pub use world::{TestWorld, world};
