//! Logical interface records held by the registry.

use std::fmt;
use std::sync::Arc;

use crate::callbacks::InterfaceCallback;
use crate::subsystems::ObserverHandle;

/// Role of a logical interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IfaceType {
    /// Client interface that associates with networks.
    StaConnectivity,
    /// Client interface restricted to scanning.
    StaScanOnly,
    /// Access point interface.
    AccessPoint,
}

impl IfaceType {
    /// Class used for radio binding, metrics, and eviction decisions.
    #[must_use]
    pub const fn class(self) -> InterfaceClass {
        match self {
            Self::StaConnectivity | Self::StaScanOnly => InterfaceClass::Client,
            Self::AccessPoint => InterfaceClass::SoftAp,
        }
    }

    /// Returns `true` for both client flavours.
    #[must_use]
    pub const fn is_client(self) -> bool {
        matches!(self.class(), InterfaceClass::Client)
    }
}

impl fmt::Display for IfaceType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::StaConnectivity => "sta_connectivity",
            Self::StaScanOnly => "sta_scan_only",
            Self::AccessPoint => "access_point",
        };
        formatter.write_str(label)
    }
}

/// Coarse interface class: client or soft AP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InterfaceClass {
    /// Station mode.
    Client,
    /// Access point mode.
    SoftAp,
}

impl fmt::Display for InterfaceClass {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Client => "client",
            Self::SoftAp => "soft_ap",
        };
        formatter.write_str(label)
    }
}

/// Identity of one interface instance.
///
/// Names are reused by the hardware after eviction, so notifications carry the
/// instance id and are matched against the registry before they take effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IfaceId(u64);

impl IfaceId {
    pub(crate) const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for IfaceId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "iface#{}", self.0)
    }
}

/// A live interface owned by the orchestrator.
pub struct Iface {
    pub(crate) id: IfaceId,
    pub(crate) name: String,
    pub(crate) kind: IfaceType,
    pub(crate) callback: Arc<dyn InterfaceCallback>,
    pub(crate) observer: Option<ObserverHandle>,
    pub(crate) last_known_up: bool,
    pub(crate) feature_set: u64,
}

impl Iface {
    /// Instance identity.
    #[must_use]
    pub fn id(&self) -> IfaceId {
        self.id
    }

    /// Name assigned by the hardware.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Role of the interface.
    #[must_use]
    pub fn kind(&self) -> IfaceType {
        self.kind
    }

    /// Last link state delivered to the owner.
    #[must_use]
    pub fn is_up(&self) -> bool {
        self.last_known_up
    }

    /// Capability bits reported when the interface was created.
    #[must_use]
    pub fn feature_set(&self) -> u64 {
        self.feature_set
    }
}

impl fmt::Debug for Iface {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Iface")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("observer", &self.observer)
            .field("last_known_up", &self.last_known_up)
            .field("feature_set", &self.feature_set)
            .finish_non_exhaustive()
    }
}
