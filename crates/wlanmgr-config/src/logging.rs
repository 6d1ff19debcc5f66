//! Log sink formats for the lifecycle daemon.
//!
//! The daemon logs under per-component targets (`wlanmgrd::orchestrator`,
//! `wlanmgrd::recovery`, `wlanmgrd::health`, ...), so a filter such as
//! `info,wlanmgrd::recovery=debug` narrows output to crash handling.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Output formats understood by the daemon's log sink.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// One JSON object per event, with event fields flattened to the top
    /// level so `event = "interface_ready"` can be matched directly.
    #[default]
    Json,
    /// Single-line text for an operator watching interfaces come and go.
    Compact,
}

impl LogFormat {
    /// Whether colour escapes belong in the output.
    ///
    /// JSON lines are parsed by collectors and never carry escapes; compact
    /// output is coloured only on a terminal.
    #[must_use]
    pub const fn uses_ansi(self, terminal: bool) -> bool {
        match self {
            Self::Json => false,
            Self::Compact => terminal,
        }
    }
}

/// Errors encountered while parsing a [`LogFormat`] from text.
pub type LogFormatParseError = strum::ParseError;
