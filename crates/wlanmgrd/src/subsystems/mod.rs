//! Boundary contracts of the external subsystems.
//!
//! Every call is blocking and executes on the lifecycle worker. Failures are
//! reported as `false`/`None`; the orchestrator translates them into
//! [`SetupError`](crate::SetupError) variants.

mod kind;

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::death::{DeathNotifier, RadioModeChangeHandler};
use crate::listeners::{DestroyedListener, LinkObserver};

pub use kind::{Subsystem, SubsystemParseError};

/// Vendor hardware abstraction daemon.
pub trait VendorHal: Send + Sync {
    /// Connects to the HAL and installs its death handler.
    fn initialize(&self, death: DeathNotifier) -> bool;

    /// Installs the radio-mode-change side channel.
    fn register_radio_mode_change_handler(&self, handler: RadioModeChangeHandler) -> bool;

    /// Returns `false` on hardware without a vendor HAL.
    fn is_supported(&self) -> bool;

    /// Powers up the radio.
    fn start(&self) -> bool;

    /// Powers down the radio.
    fn stop(&self) -> bool;

    /// Creates a client interface.
    ///
    /// `listener` must be retained and invoked once the interface is removed.
    /// On single-interface hardware the HAL may remove an interface of the
    /// other class, invoking that interface's listener, before returning.
    fn create_sta_iface(&self, low_priority: bool, listener: DestroyedListener) -> Option<String>;

    /// Creates an access point interface. Eviction rules match
    /// [`VendorHal::create_sta_iface`].
    fn create_ap_iface(&self, listener: DestroyedListener) -> Option<String>;

    /// Requests removal of a client interface.
    fn remove_sta_iface(&self, name: &str) -> bool;

    /// Requests removal of an access point interface.
    fn remove_ap_iface(&self, name: &str) -> bool;

    /// Capability bits of the named interface.
    fn supported_feature_set(&self, name: &str) -> u64;
}

/// Wireless control daemon.
pub trait RadioControl: Send + Sync {
    /// Connects to the daemon and installs its death handler.
    fn initialize(&self, death: DeathNotifier) -> bool;

    /// Binds a netdev in client mode.
    fn setup_interface_for_client_mode(&self, name: &str) -> bool;

    /// Binds a netdev in soft AP mode.
    fn setup_interface_for_soft_ap_mode(&self, name: &str) -> bool;

    /// Releases a client binding.
    fn tear_down_client_interface(&self, name: &str) -> bool;

    /// Releases a soft AP binding.
    fn tear_down_soft_ap_interface(&self, name: &str) -> bool;

    /// Releases every binding.
    fn tear_down_interfaces(&self) -> bool;
}

/// Start handshake shared by the per-interface daemons.
pub trait ManagedDaemon: Send + Sync {
    /// Whether the service registration handshake has begun.
    fn is_initialization_started(&self) -> bool;

    /// Begins the service registration handshake.
    fn initialize(&self) -> bool;

    /// Launches the daemon process.
    fn start_daemon(&self) -> bool;

    /// Whether the daemon finished initialising after [`ManagedDaemon::start_daemon`].
    fn is_initialization_complete(&self) -> bool;

    /// Installs the death handler.
    fn register_death_handler(&self, death: DeathNotifier) -> bool;

    /// Removes the death handler.
    fn deregister_death_handler(&self) -> bool;

    /// Stops the daemon process.
    fn terminate(&self);
}

/// Station authentication daemon.
pub trait StaAuthDaemon: ManagedDaemon {
    /// Attaches the daemon to an interface.
    fn setup_iface(&self, name: &str) -> bool;

    /// Detaches the daemon from an interface.
    fn teardown_iface(&self, name: &str) -> bool;

    /// Key-management capability bits for the interface.
    fn advanced_key_mgmt_capabilities(&self, name: &str) -> u64;
}

/// Access point host daemon.
pub trait ApHostDaemon: ManagedDaemon {
    /// Starts serving an access point on the interface.
    fn add_access_point(&self, name: &str, config: &SoftApConfig) -> bool;

    /// Stops serving the access point on the interface.
    fn remove_access_point(&self, name: &str) -> bool;
}

/// Per-interface station event monitoring.
pub trait StationEventMonitor: Send + Sync {
    /// Starts delivering station events for the interface.
    fn start_monitoring(&self, name: &str);

    /// Stops delivering station events for the interface.
    fn stop_monitoring(&self, name: &str);
}

/// OS network-link facility.
pub trait LinkFacility: Send + Sync {
    /// Registers an observer for link events.
    fn register_observer(&self, observer: LinkObserver) -> Result<ObserverHandle, LinkError>;

    /// Removes a previously registered observer.
    fn unregister_observer(&self, handle: ObserverHandle);

    /// Reads the current link configuration; `None` when unreadable.
    fn interface_config(&self, name: &str) -> Option<InterfaceConfig>;

    /// Flushes every address on the interface.
    fn clear_interface_addresses(&self, name: &str) -> bool;

    /// Toggles IPv6 privacy extensions.
    fn set_ipv6_privacy_extensions(&self, name: &str, enabled: bool) -> bool;

    /// Disables IPv6 on the interface.
    fn disable_ipv6(&self, name: &str) -> bool;
}

/// Link configuration snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterfaceConfig {
    /// Administrative and operational state is up.
    pub up: bool,
}

/// Token returned by [`LinkFacility::register_observer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverHandle(u64);

impl ObserverHandle {
    /// Wraps a facility-specific token.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw token value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Errors reported by the link facility.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// The facility refused the observer.
    #[error("link facility rejected observer for {name}: {reason}")]
    Rejected {
        /// Interface the observer was meant for.
        name: String,
        /// Facility-provided reason.
        reason: String,
    },
    /// The facility is not reachable.
    #[error("link facility unavailable")]
    Unavailable,
}

/// Radio band of an access point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Band {
    /// 2.4 GHz.
    #[default]
    TwoGhz,
    /// 5 GHz.
    FiveGhz,
    /// 6 GHz.
    SixGhz,
}

/// Parameters of an access point served by the host daemon.
#[derive(Clone, PartialEq, Eq)]
pub struct SoftApConfig {
    ssid: String,
    passphrase: Option<String>,
    band: Band,
    channel: u16,
    hidden: bool,
}

impl SoftApConfig {
    /// Open network on the default band with automatic channel selection.
    #[must_use]
    pub fn open(ssid: impl Into<String>) -> Self {
        Self {
            ssid: ssid.into(),
            passphrase: None,
            band: Band::default(),
            channel: 0,
            hidden: false,
        }
    }

    /// Protects the network with a passphrase.
    #[must_use]
    pub fn with_passphrase(mut self, passphrase: impl Into<String>) -> Self {
        self.passphrase = Some(passphrase.into());
        self
    }

    /// Selects the band and channel; channel `0` requests automatic selection.
    #[must_use]
    pub fn on_channel(mut self, band: Band, channel: u16) -> Self {
        self.band = band;
        self.channel = channel;
        self
    }

    /// Suppresses the SSID from beacons.
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Network name.
    #[must_use]
    pub fn ssid(&self) -> &str {
        self.ssid.as_str()
    }

    /// Whether a passphrase is configured.
    #[must_use]
    pub fn is_protected(&self) -> bool {
        self.passphrase.is_some()
    }

    /// Configured passphrase.
    #[must_use]
    pub fn passphrase(&self) -> Option<&str> {
        self.passphrase.as_deref()
    }

    /// Radio band.
    #[must_use]
    pub fn band(&self) -> Band {
        self.band
    }

    /// Channel number, `0` for automatic.
    #[must_use]
    pub fn channel(&self) -> u16 {
        self.channel
    }

    /// Whether the SSID is hidden.
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }
}

impl fmt::Debug for SoftApConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("SoftApConfig")
            .field("ssid", &self.ssid)
            .field("protected", &self.passphrase.is_some())
            .field("band", &self.band)
            .field("channel", &self.channel)
            .field("hidden", &self.hidden)
            .finish()
    }
}

/// Handles to every external collaborator the orchestrator drives.
#[derive(Clone)]
pub struct Subsystems {
    /// Vendor HAL.
    pub vendor_hal: Arc<dyn VendorHal>,
    /// Wireless control daemon.
    pub radio: Arc<dyn RadioControl>,
    /// Station authentication daemon.
    pub sta_auth: Arc<dyn StaAuthDaemon>,
    /// Access point host daemon.
    pub ap_host: Arc<dyn ApHostDaemon>,
    /// Station event monitor.
    pub monitor: Arc<dyn StationEventMonitor>,
    /// OS link facility.
    pub link: Arc<dyn LinkFacility>,
}

impl fmt::Debug for Subsystems {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_struct("Subsystems").finish_non_exhaustive()
    }
}
