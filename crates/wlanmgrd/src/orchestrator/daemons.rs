//! Start and release of the per-interface daemons.

use std::sync::Arc;
use std::thread;

use crate::iface::IfaceType;
use crate::subsystems::{ManagedDaemon, Subsystem};

use super::{ORCHESTRATOR_TARGET, Orchestrator, OrchestratorSettings, SetupError};

/// Daemons whose lifetime follows the interfaces that use them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum DaemonKind {
    StaAuth,
    ApHost,
}

impl DaemonKind {
    /// Daemon backing an interface type. Scan-only clients need none.
    pub(super) const fn for_iface(kind: IfaceType) -> Option<Self> {
        match kind {
            IfaceType::StaConnectivity => Some(Self::StaAuth),
            IfaceType::AccessPoint => Some(Self::ApHost),
            IfaceType::StaScanOnly => None,
        }
    }

    pub(super) const fn iface_type(self) -> IfaceType {
        match self {
            Self::StaAuth => IfaceType::StaConnectivity,
            Self::ApHost => IfaceType::AccessPoint,
        }
    }

    pub(super) const fn subsystem(self) -> Subsystem {
        match self {
            Self::StaAuth => Subsystem::StaAuth,
            Self::ApHost => Subsystem::ApHost,
        }
    }

    pub(super) const fn start_failure(self) -> SetupError {
        match self {
            Self::StaAuth => SetupError::SupplicantStartFailure,
            Self::ApHost => SetupError::HostapdStartFailure,
        }
    }
}

/// Whether each daemon currently holds our death handler.
#[derive(Debug, Default, Clone, Copy)]
pub(super) struct DeathHandlers {
    sta_auth: bool,
    ap_host: bool,
}

impl DeathHandlers {
    pub(super) fn slot(&mut self, daemon: DaemonKind) -> &mut bool {
        match daemon {
            DaemonKind::StaAuth => &mut self.sta_auth,
            DaemonKind::ApHost => &mut self.ap_host,
        }
    }
}

impl Orchestrator {
    pub(super) fn daemon_handle(&self, daemon: DaemonKind) -> Arc<dyn ManagedDaemon> {
        match daemon {
            DaemonKind::StaAuth => Arc::clone(&self.subsystems.sta_auth) as Arc<dyn ManagedDaemon>,
            DaemonKind::ApHost => Arc::clone(&self.subsystems.ap_host) as Arc<dyn ManagedDaemon>,
        }
    }

    /// Starts a daemon and installs its death handler if not yet installed.
    ///
    /// A daemon that launched but never became ready is terminated before
    /// returning `false`.
    pub(super) fn start_daemon(&mut self, daemon: DaemonKind) -> bool {
        let handle = self.daemon_handle(daemon);
        let subsystem = daemon.subsystem();
        if !handle.is_initialization_started() && !handle.initialize() {
            tracing::warn!(target: ORCHESTRATOR_TARGET, %subsystem, "daemon initialisation refused");
            return false;
        }
        if !handle.start_daemon() {
            tracing::warn!(target: ORCHESTRATOR_TARGET, %subsystem, "daemon failed to start");
            return false;
        }
        if !wait_until_ready(handle.as_ref(), &self.settings) {
            tracing::warn!(
                target: ORCHESTRATOR_TARGET,
                %subsystem,
                retries = self.settings.daemon_connect_retries,
                "daemon never finished initialising"
            );
            handle.terminate();
            return false;
        }
        let notifier = self.death_notifier(subsystem);
        let registered = self.death_handlers.slot(daemon);
        if !*registered {
            if !handle.register_death_handler(notifier) {
                tracing::warn!(
                    target: ORCHESTRATOR_TARGET,
                    %subsystem,
                    "daemon refused the death handler"
                );
                handle.terminate();
                return false;
            }
            *registered = true;
        }
        tracing::info!(target: ORCHESTRATOR_TARGET, %subsystem, "daemon started");
        true
    }

    /// Stops a daemon once no interface of its type remains.
    pub(super) fn release_daemon_if_unused(&mut self, daemon: DaemonKind) {
        if self.any_of_type(daemon.iface_type()) {
            return;
        }
        let handle = self.daemon_handle(daemon);
        let registered = self.death_handlers.slot(daemon);
        if *registered {
            if !handle.deregister_death_handler() {
                tracing::warn!(
                    target: ORCHESTRATOR_TARGET,
                    subsystem = %daemon.subsystem(),
                    "daemon refused to drop the death handler"
                );
            }
            *registered = false;
        }
        handle.terminate();
        tracing::info!(
            target: ORCHESTRATOR_TARGET,
            subsystem = %daemon.subsystem(),
            "daemon stopped; no interfaces use it"
        );
    }
}

fn wait_until_ready(daemon: &dyn ManagedDaemon, settings: &OrchestratorSettings) -> bool {
    if daemon.is_initialization_complete() {
        return true;
    }
    for _ in 0..settings.daemon_connect_retries {
        thread::sleep(settings.daemon_connect_interval);
        if daemon.is_initialization_complete() {
            return true;
        }
    }
    false
}
