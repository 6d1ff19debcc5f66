//! Thread-safe front end marshalling calls onto the lifecycle worker.

use std::io;
use std::sync::Arc;
use std::sync::mpsc;
use std::thread::{self, JoinHandle, ThreadId};

use thiserror::Error;

use crate::callbacks::{InterfaceCallback, StatusListener};
use crate::orchestrator::{Orchestrator, SetupError, SoftApError};
use crate::queue::{EventSender, Looper, QueueClosed};
use crate::subsystems::SoftApConfig;

const SERVICE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::service");
const WORKER_NAME: &str = "wlanmgr-lifecycle";

/// Errors surfaced by [`InterfaceManager`] calls.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ManagerError {
    /// Interface setup failed and was rolled back.
    #[error(transparent)]
    Setup(#[from] SetupError),
    /// The access point could not be started.
    #[error(transparent)]
    SoftAp(#[from] SoftApError),
    /// The lifecycle worker has stopped.
    #[error("lifecycle worker is not running")]
    WorkerUnavailable,
    /// Called from an owner callback or status listener running on the
    /// lifecycle worker, which cannot wait on itself.
    #[error("manager called from the lifecycle worker")]
    ReentrantCall,
}

impl From<QueueClosed> for ManagerError {
    fn from(_: QueueClosed) -> Self {
        Self::WorkerUnavailable
    }
}

/// Errors starting or stopping the lifecycle worker.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The worker thread could not be spawned.
    #[error("failed to spawn lifecycle worker: {source}")]
    Spawn {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The worker thread panicked.
    #[error("lifecycle worker panicked")]
    Panicked,
}

/// Cloneable handle to the orchestrator running on the lifecycle worker.
///
/// Every method blocks until the worker has executed the request, so calls
/// from any number of threads are totally ordered. Calls made on the worker
/// itself, from inside a callback, fail with [`ManagerError::ReentrantCall`].
#[derive(Debug, Clone)]
pub struct InterfaceManager {
    queue: EventSender,
    worker: ThreadId,
}

impl InterfaceManager {
    fn call<T, F>(&self, operation: F) -> Result<T, ManagerError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Orchestrator) -> T + Send + 'static,
    {
        if thread::current().id() == self.worker {
            tracing::warn!(
                target: SERVICE_TARGET,
                "refusing manager call from the lifecycle worker"
            );
            return Err(ManagerError::ReentrantCall);
        }
        let (reply, response) = mpsc::sync_channel(1);
        self.queue.submit(Box::new(move |orchestrator| {
            if reply.send(operation(orchestrator)).is_err() {
                tracing::debug!(target: SERVICE_TARGET, "caller went away before the reply");
            }
        }))?;
        response.recv().map_err(|_| ManagerError::WorkerUnavailable)
    }

    /// See [`Orchestrator::setup_interface_for_client_in_connectivity_mode`].
    pub fn setup_interface_for_client_in_connectivity_mode(
        &self,
        callback: Arc<dyn InterfaceCallback>,
    ) -> Result<String, ManagerError> {
        self.call(move |orchestrator| {
            orchestrator.setup_interface_for_client_in_connectivity_mode(callback)
        })?
        .map_err(ManagerError::from)
    }

    /// See [`Orchestrator::setup_interface_for_client_in_scan_mode`].
    pub fn setup_interface_for_client_in_scan_mode(
        &self,
        callback: Arc<dyn InterfaceCallback>,
    ) -> Result<String, ManagerError> {
        self.call(move |orchestrator| orchestrator.setup_interface_for_client_in_scan_mode(callback))?
            .map_err(ManagerError::from)
    }

    /// See [`Orchestrator::setup_interface_for_soft_ap_mode`].
    pub fn setup_interface_for_soft_ap_mode(
        &self,
        callback: Arc<dyn InterfaceCallback>,
    ) -> Result<String, ManagerError> {
        self.call(move |orchestrator| orchestrator.setup_interface_for_soft_ap_mode(callback))?
            .map_err(ManagerError::from)
    }

    /// See [`Orchestrator::teardown_interface`].
    pub fn teardown_interface(&self, name: &str) -> Result<(), ManagerError> {
        let name = name.to_owned();
        self.call(move |orchestrator| orchestrator.teardown_interface(&name))
    }

    /// See [`Orchestrator::teardown_all_interfaces`].
    pub fn teardown_all_interfaces(&self) -> Result<(), ManagerError> {
        self.call(Orchestrator::teardown_all_interfaces)
    }

    /// See [`Orchestrator::client_interface_name`].
    pub fn client_interface_name(&self) -> Result<Option<String>, ManagerError> {
        self.call(|orchestrator| orchestrator.client_interface_name())
    }

    /// See [`Orchestrator::soft_ap_interface_name`].
    pub fn soft_ap_interface_name(&self) -> Result<Option<String>, ManagerError> {
        self.call(|orchestrator| orchestrator.soft_ap_interface_name())
    }

    /// See [`Orchestrator::is_interface_up`].
    pub fn is_interface_up(&self, name: &str) -> Result<bool, ManagerError> {
        let name = name.to_owned();
        self.call(move |orchestrator| orchestrator.is_interface_up(&name))
    }

    /// See [`Orchestrator::supported_feature_set`].
    pub fn supported_feature_set(&self, name: &str) -> Result<Option<u64>, ManagerError> {
        let name = name.to_owned();
        self.call(move |orchestrator| orchestrator.supported_feature_set(&name))
    }

    /// See [`Orchestrator::start_soft_ap`].
    pub fn start_soft_ap(&self, name: &str, config: SoftApConfig) -> Result<(), ManagerError> {
        let name = name.to_owned();
        self.call(move |orchestrator| orchestrator.start_soft_ap(&name, &config))?
            .map_err(ManagerError::from)
    }

    /// See [`Orchestrator::register_status_listener`].
    pub fn register_status_listener(
        &self,
        listener: Arc<dyn StatusListener>,
    ) -> Result<(), ManagerError> {
        self.call(move |orchestrator| orchestrator.register_status_listener(listener))
    }

    /// Returns once every notification queued before this call was handled.
    pub fn sync(&self) -> Result<(), ManagerError> {
        self.call(|_| ())
    }
}

/// Ownership of the lifecycle worker thread.
#[derive(Debug)]
pub struct ServiceHandle {
    queue: EventSender,
    worker: JoinHandle<()>,
}

impl ServiceHandle {
    /// Stops the worker after already queued messages and waits for it.
    pub fn shutdown(self) -> Result<(), ServiceError> {
        if self.queue.request_shutdown().is_err() {
            tracing::debug!(target: SERVICE_TARGET, "lifecycle worker already stopped");
        }
        self.worker.join().map_err(|_| ServiceError::Panicked)
    }
}

/// Moves the orchestrator onto a dedicated worker draining `looper`.
///
/// `looper` must be the receiver paired with the sender the orchestrator was
/// built with.
pub fn spawn_service(
    orchestrator: Orchestrator,
    looper: Looper,
) -> Result<(InterfaceManager, ServiceHandle), ServiceError> {
    let queue = orchestrator.event_sender();
    let worker = thread::Builder::new()
        .name(WORKER_NAME.to_owned())
        .spawn(move || looper.run(orchestrator))
        .map_err(|source| ServiceError::Spawn { source })?;
    tracing::debug!(target: SERVICE_TARGET, worker = WORKER_NAME, "lifecycle worker started");
    Ok((
        InterfaceManager {
            queue: queue.clone(),
            worker: worker.thread().id(),
        },
        ServiceHandle { queue, worker },
    ))
}
