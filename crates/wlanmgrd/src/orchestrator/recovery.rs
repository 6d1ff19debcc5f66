//! Crash handling for the four subsystems.
//!
//! The registry is left untouched: interfaces bound to a crashed subsystem
//! stay registered until their owner tears them down, even though operations
//! against them fail in the meantime.

use std::sync::Arc;

use crate::death::RadioModeChangeHandler;
use crate::metrics::MetricKey;
use crate::subsystems::Subsystem;

use super::daemons::DaemonKind;
use super::{Orchestrator, RecoveryError};

const RECOVERY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::recovery");

impl Orchestrator {
    pub(super) fn handle_subsystem_death(&mut self, subsystem: Subsystem) {
        self.metrics.increment(MetricKey::Crash(subsystem));
        self.reporter.subsystem_died(subsystem);
        self.notify_status(false);

        match self.recover(subsystem) {
            Ok(()) => {
                self.reporter.subsystem_recovered(subsystem);
                self.notify_status(true);
            }
            Err(error) => self.reporter.subsystem_recovery_failed(&error),
        }
    }

    fn recover(&mut self, subsystem: Subsystem) -> Result<(), RecoveryError> {
        match subsystem {
            Subsystem::VendorHal => self.recover_vendor_hal(),
            Subsystem::RadioControl => {
                if self
                    .subsystems
                    .radio
                    .initialize(self.death_notifier(Subsystem::RadioControl))
                {
                    Ok(())
                } else {
                    Err(RecoveryError {
                        subsystem,
                        stage: "initialize",
                    })
                }
            }
            Subsystem::StaAuth => self.recover_daemon(DaemonKind::StaAuth),
            Subsystem::ApHost => self.recover_daemon(DaemonKind::ApHost),
        }
    }

    fn recover_vendor_hal(&mut self) -> Result<(), RecoveryError> {
        let subsystem = Subsystem::VendorHal;
        let hal = Arc::clone(&self.subsystems.vendor_hal);
        if !hal.initialize(self.death_notifier(subsystem)) {
            return Err(RecoveryError {
                subsystem,
                stage: "initialize",
            });
        }
        if !hal.register_radio_mode_change_handler(RadioModeChangeHandler::new(Arc::clone(
            &self.metrics,
        ))) {
            tracing::warn!(
                target: RECOVERY_TARGET,
                "vendor HAL refused the radio mode change handler"
            );
        }
        if !self.registry.is_empty() && hal.is_supported() && !hal.start() {
            return Err(RecoveryError {
                subsystem,
                stage: "start",
            });
        }
        Ok(())
    }

    fn recover_daemon(&mut self, daemon: DaemonKind) -> Result<(), RecoveryError> {
        // The handler died with the process.
        *self.death_handlers.slot(daemon) = false;
        if !self.registry.any_of_type(daemon.iface_type()) {
            tracing::info!(
                target: RECOVERY_TARGET,
                subsystem = %daemon.subsystem(),
                "no interface uses the daemon; leaving it stopped"
            );
            return Ok(());
        }
        if self.start_daemon(daemon) {
            Ok(())
        } else {
            Err(RecoveryError {
                subsystem: daemon.subsystem(),
                stage: "start",
            })
        }
    }
}
