//! Structured telemetry initialisation for the lifecycle daemon.
//!
//! Every component logs under its own target, and health events carry an
//! `event` field. With the JSON format, a client interface coming up on the
//! lifecycle worker is written as:
//!
//! ```text
//! {"timestamp":"2026-10-17T09:14:02.118Z","level":"INFO",
//!  "threadName":"wlanmgr-lifecycle","target":"wlanmgrd::health",
//!  "event":"interface_ready","kind":"sta_connectivity","name":"wlan0",
//!  "message":"interface ready"}
//! ```
//!
//! The compact format prints the same fields on one line, coloured when
//! stderr is a terminal.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use tracing::{Subscriber, subscriber::SetGlobalDefaultError};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

use wlanmgr_config::{Config, LogFormat};

static TELEMETRY_GUARD: OnceCell<()> = OnceCell::new();

/// Handle returned when telemetry has been initialised.
#[derive(Debug, Default, Clone, Copy)]
pub struct TelemetryHandle;

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// Failed to parse the configured log filter expression.
    #[error("invalid log filter: {0}")]
    Filter(String),
    /// Failed to install the tracing subscriber.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(SetGlobalDefaultError),
}

/// Installs the global tracing subscriber on first use.
///
/// Bootstrap calls this before the orchestrator touches any subsystem, so
/// initialisation failures of the vendor HAL are already captured. Later
/// calls return a fresh [`TelemetryHandle`] without touching the global
/// subscriber, even when their configuration differs.
pub fn initialise(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    TELEMETRY_GUARD
        .get_or_try_init(|| install_subscriber(config))
        .map(|_| TelemetryHandle)
}

fn lifecycle_filter(config: &Config) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(config.log_filter()).map_err(|error| {
        TelemetryError::Filter(format!("{}: {error}", config.log_filter()))
    })
}

fn install_subscriber(config: &Config) -> Result<(), TelemetryError> {
    let filter = lifecycle_filter(config)?;
    let format = config.log_format();
    let ansi = format.uses_ansi(io::stderr().is_terminal());

    let builder = |filter: EnvFilter| {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_level(true)
            // Interface callbacks and recovery all run on the lifecycle worker.
            .with_thread_names(true)
            .with_writer(io::stderr)
            .with_ansi(ansi)
            .with_timer(fmt::time::UtcTime::rfc_3339())
    };

    let subscriber: Box<dyn Subscriber + Send + Sync> = match format {
        LogFormat::Json => Box::new(builder(filter).json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(builder(filter).compact().finish()),
    };

    tracing::subscriber::set_global_default(subscriber).map_err(TelemetryError::Subscriber)
}
