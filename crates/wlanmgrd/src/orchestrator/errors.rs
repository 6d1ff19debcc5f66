use thiserror::Error;

use crate::iface::IfaceType;
use crate::metrics::FailureReason;
use crate::registry::DuplicateNameError;
use crate::subsystems::{LinkError, Subsystem};

/// Reasons an interface setup call failed. Every variant leaves no trace in
/// the registry or in the subsystems.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SetupError {
    /// The vendor HAL refused to start.
    #[error("vendor HAL failed to start")]
    HalStartFailure,
    /// The station authentication daemon did not come up.
    #[error("station authentication daemon failed to start")]
    SupplicantStartFailure,
    /// The access point host daemon did not come up.
    #[error("access point host daemon failed to start")]
    HostapdStartFailure,
    /// The vendor HAL did not create an interface.
    #[error("vendor HAL failed to create a {kind} interface")]
    HalCreateIfaceFailure {
        /// Requested interface type.
        kind: IfaceType,
    },
    /// The wireless control daemon did not bind the interface.
    #[error("wireless control daemon failed to set up {name}")]
    WificondSetupFailure {
        /// Interface being set up.
        name: String,
    },
    /// The station authentication daemon did not attach to the interface.
    #[error("station authentication daemon failed to set up {name}")]
    SupplicantIfaceFailure {
        /// Interface being set up.
        name: String,
    },
    /// The link facility refused the observer.
    #[error("failed to register link observer for {name}: {source}")]
    ObserverRegistrationFailure {
        /// Interface being set up.
        name: String,
        /// Facility error.
        #[source]
        source: LinkError,
    },
    /// The vendor HAL returned a name that is already live.
    #[error(transparent)]
    DuplicateName(#[from] DuplicateNameError),
}

impl SetupError {
    /// Component charged with the failure in setup-failure counters.
    #[must_use]
    pub const fn failure_reason(&self) -> FailureReason {
        match self {
            Self::HalStartFailure | Self::HalCreateIfaceFailure { .. } => FailureReason::Hal,
            Self::SupplicantStartFailure | Self::SupplicantIfaceFailure { .. } => {
                FailureReason::Supplicant
            }
            Self::HostapdStartFailure => FailureReason::Hostapd,
            Self::WificondSetupFailure { .. } => FailureReason::Wificond,
            Self::ObserverRegistrationFailure { .. } => FailureReason::LinkObserver,
            Self::DuplicateName(_) => FailureReason::DuplicateName,
        }
    }
}

/// A subsystem refused initialisation.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("{subsystem} failed to initialise")]
pub struct InitializeError {
    /// Subsystem that refused.
    pub subsystem: Subsystem,
}

/// A crashed subsystem could not be restarted.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("{subsystem} could not be recovered: {stage} failed")]
pub struct RecoveryError {
    /// Subsystem being recovered.
    pub subsystem: Subsystem,
    /// Step that failed.
    pub stage: &'static str,
}

/// Errors starting an access point on an existing interface.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SoftApError {
    /// No live interface has this name.
    #[error("no interface named {name}")]
    UnknownInterface {
        /// Requested interface.
        name: String,
    },
    /// The interface is not an access point interface.
    #[error("{name} is a {kind} interface, not an access point")]
    NotAccessPoint {
        /// Requested interface.
        name: String,
        /// Actual type.
        kind: IfaceType,
    },
    /// The host daemon refused the configuration.
    #[error("access point host daemon rejected the configuration for {name}")]
    Rejected {
        /// Requested interface.
        name: String,
    },
}
