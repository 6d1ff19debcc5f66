//! Shared configuration for the wireless interface lifecycle daemon.
//!
//! Values are layered by `ortho_config`: built-in defaults, then an optional
//! configuration file (`--config-path`), then `WLANMGR_*` environment
//! variables, then command-line flags.

mod defaults;
mod hardware;
mod logging;

use std::ffi::OsString;
use std::sync::Arc;
use std::time::Duration;

use ortho_config::{OrthoConfig, OrthoError};
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_DAEMON_CONNECT_INTERVAL_MS, DEFAULT_DAEMON_CONNECT_RETRIES,
    DEFAULT_LEGACY_INTERFACE_NAME, DEFAULT_LOG_FILTER, DEFAULT_SOFT_AP_SSID,
    default_hardware_profile, default_legacy_interface_name, default_log_filter,
    default_log_filter_string, default_log_format, default_soft_ap_ssid, default_startup_mode,
};
pub use hardware::{HardwareParseError, HardwareProfile, StartupMode};
pub use logging::{LogFormat, LogFormatParseError};

/// Resolved daemon configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "WLANMGR")]
#[serde(default)]
pub struct Config {
    /// `tracing` filter expression applied to daemon output.
    pub log_filter: String,
    /// Output format of the log sink.
    pub log_format: LogFormat,
    /// Interface concurrency offered by the hardware.
    pub hardware_profile: HardwareProfile,
    /// Interface name used when no vendor HAL is present.
    pub legacy_interface_name: String,
    /// Extra readiness polls granted to a freshly started daemon.
    pub daemon_connect_retries: u32,
    /// Delay between readiness polls, in milliseconds.
    pub daemon_connect_interval_ms: u64,
    /// Interface brought up at launch.
    pub startup_mode: StartupMode,
    /// SSID used when the daemon starts in soft AP mode.
    pub soft_ap_ssid: String,
    /// Optional WPA2 passphrase for the launch-time access point.
    pub soft_ap_passphrase: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            hardware_profile: default_hardware_profile(),
            legacy_interface_name: default_legacy_interface_name(),
            daemon_connect_retries: defaults::default_daemon_connect_retries(),
            daemon_connect_interval_ms: defaults::default_daemon_connect_interval_ms(),
            startup_mode: default_startup_mode(),
            soft_ap_ssid: default_soft_ap_ssid(),
            soft_ap_passphrase: None,
        }
    }
}

impl Config {
    /// Loads configuration from the process arguments and environment.
    pub fn load() -> Result<Self, Arc<OrthoError>> {
        <Self as OrthoConfig>::load_from_iter(std::env::args_os())
    }

    /// Loads configuration from an explicit argument list.
    ///
    /// The first item is treated as the program name.
    pub fn load_from_iter<I, T>(args: I) -> Result<Self, Arc<OrthoError>>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as OrthoConfig>::load_from_iter(args)
    }

    /// Filter expression for the log sink.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Output format of the log sink.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Interface concurrency offered by the hardware.
    #[must_use]
    pub fn hardware_profile(&self) -> HardwareProfile {
        self.hardware_profile
    }

    /// Interface name used when no vendor HAL is present.
    #[must_use]
    pub fn legacy_interface_name(&self) -> &str {
        self.legacy_interface_name.as_str()
    }

    /// Extra readiness polls granted to a freshly started daemon.
    #[must_use]
    pub fn daemon_connect_retries(&self) -> u32 {
        self.daemon_connect_retries
    }

    /// Delay between readiness polls.
    #[must_use]
    pub fn daemon_connect_interval(&self) -> Duration {
        Duration::from_millis(self.daemon_connect_interval_ms)
    }

    /// Interface brought up at launch.
    #[must_use]
    pub fn startup_mode(&self) -> StartupMode {
        self.startup_mode
    }

    /// SSID used when the daemon starts in soft AP mode.
    #[must_use]
    pub fn soft_ap_ssid(&self) -> &str {
        self.soft_ap_ssid.as_str()
    }

    /// Passphrase for the launch-time access point, if any.
    #[must_use]
    pub fn soft_ap_passphrase(&self) -> Option<&str> {
        self.soft_ap_passphrase.as_deref()
    }
}
