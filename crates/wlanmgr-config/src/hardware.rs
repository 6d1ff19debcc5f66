//! Hardware description and launch-time interface selection.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Interface concurrency offered by the radio hardware.
///
/// The daemon binary uses the profile to choose how the simulated vendor HAL
/// behaves; production integrations replace the simulation entirely.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum HardwareProfile {
    /// Client and access point interfaces may coexist.
    #[default]
    Concurrent,
    /// Only one interface at a time; creating an interface of the other class
    /// evicts the current one and reuses its name.
    SingleInterface,
    /// No vendor HAL; a single interface with a fixed name.
    Legacy,
}

/// Interface the daemon brings up immediately after bootstrap.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum StartupMode {
    /// Start with no interfaces.
    #[default]
    #[serde(rename = "none")]
    #[strum(serialize = "none")]
    Idle,
    /// A client interface in connectivity mode.
    Client,
    /// A client interface restricted to scanning.
    ScanOnly,
    /// An access point interface.
    SoftAp,
}

/// Errors encountered while parsing hardware enums from text.
pub type HardwareParseError = strum::ParseError;
