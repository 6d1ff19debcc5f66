use crate::hardware::{HardwareProfile, StartupMode};
use crate::logging::LogFormat;

/// Default log filter expression used by the daemon.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Interface name used when the hardware has no vendor HAL.
pub const DEFAULT_LEGACY_INTERFACE_NAME: &str = "wlan0";

/// Extra readiness polls granted to a freshly started daemon.
pub const DEFAULT_DAEMON_CONNECT_RETRIES: u32 = 50;

/// Delay between readiness polls, in milliseconds.
pub const DEFAULT_DAEMON_CONNECT_INTERVAL_MS: u64 = 100;

/// SSID advertised when the daemon starts in soft AP mode.
pub const DEFAULT_SOFT_AP_SSID: &str = "wlanmgrd";

/// Default log filter expression used by the daemon.
#[must_use]
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the daemon.
#[must_use]
pub fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Default hardware profile.
#[must_use]
pub fn default_hardware_profile() -> HardwareProfile {
    HardwareProfile::Concurrent
}

/// Default interface brought up at launch.
#[must_use]
pub fn default_startup_mode() -> StartupMode {
    StartupMode::Idle
}

/// Owned legacy interface name.
#[must_use]
pub fn default_legacy_interface_name() -> String {
    DEFAULT_LEGACY_INTERFACE_NAME.to_owned()
}

/// Owned soft AP SSID.
#[must_use]
pub fn default_soft_ap_ssid() -> String {
    DEFAULT_SOFT_AP_SSID.to_owned()
}

pub(crate) fn default_daemon_connect_retries() -> u32 {
    DEFAULT_DAEMON_CONNECT_RETRIES
}

pub(crate) fn default_daemon_connect_interval_ms() -> u64 {
    DEFAULT_DAEMON_CONNECT_INTERVAL_MS
}
