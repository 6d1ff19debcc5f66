use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Crash-prone subsystems the orchestrator coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Subsystem {
    /// Vendor hardware abstraction daemon.
    VendorHal,
    /// Wireless control daemon binding interfaces to kernel netdevs.
    RadioControl,
    /// Station authentication daemon.
    StaAuth,
    /// Access point host daemon.
    ApHost,
}

impl Subsystem {
    /// Every subsystem, in bring-up order.
    pub const ALL: [Self; 4] = [Self::VendorHal, Self::RadioControl, Self::StaAuth, Self::ApHost];
}

impl fmt::Display for Subsystem {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::VendorHal => "vendor_hal",
            Self::RadioControl => "radio_control",
            Self::StaAuth => "sta_auth",
            Self::ApHost => "ap_host",
        };
        formatter.write_str(label)
    }
}

/// Error returned when parsing a subsystem name fails.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown subsystem: {0}")]
pub struct SubsystemParseError(String);

impl SubsystemParseError {
    /// Creates a parse error describing the unsupported value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the offending value.
    #[must_use]
    pub fn value(&self) -> &str {
        self.0.as_str()
    }
}

impl FromStr for Subsystem {
    type Err = SubsystemParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "vendor_hal" | "hal" => Ok(Self::VendorHal),
            "radio_control" | "wificond" => Ok(Self::RadioControl),
            "sta_auth" | "supplicant" => Ok(Self::StaAuth),
            "ap_host" | "hostapd" => Ok(Self::ApHost),
            other => Err(SubsystemParseError::new(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("vendor_hal", Subsystem::VendorHal)]
    #[case(" Wificond ", Subsystem::RadioControl)]
    #[case("supplicant", Subsystem::StaAuth)]
    #[case("HOSTAPD", Subsystem::ApHost)]
    fn parses_names_and_aliases(#[case] input: &str, #[case] expected: Subsystem) {
        assert_eq!(input.parse::<Subsystem>(), Ok(expected));
    }

    #[rstest]
    fn display_round_trips() {
        for subsystem in Subsystem::ALL {
            assert_eq!(subsystem.to_string().parse::<Subsystem>(), Ok(subsystem));
        }
    }

    #[rstest]
    fn rejects_unknown_names() {
        let error = "modem".parse::<Subsystem>().expect_err("unknown subsystem");
        assert_eq!(error.value(), "modem");
    }
}
