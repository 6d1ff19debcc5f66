//! Single serialized lifecycle queue.
//!
//! Death, destroy, and link notifications plus marshalled caller requests all
//! travel through one channel and are handled strictly in arrival order by the
//! single worker that owns the [`Orchestrator`].

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use crate::iface::IfaceId;
use crate::orchestrator::Orchestrator;
use crate::subsystems::Subsystem;

const QUEUE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::queue");

/// Asynchronous notification handled on the lifecycle worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The hardware finished removing an interface instance.
    InterfaceDestroyed(IfaceId),
    /// The link facility reported a change on an interface.
    LinkStateChanged {
        /// Instance the observer was registered for.
        iface: IfaceId,
        /// Interface name carried by the notification.
        name: String,
    },
    /// A subsystem process died.
    SubsystemDied(Subsystem),
}

pub(crate) type Task = Box<dyn FnOnce(&mut Orchestrator) + Send>;

pub(crate) enum Message {
    Event(Event),
    Task(Task),
    Shutdown,
}

/// Producer side of the lifecycle queue.
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: Sender<Message>,
}

impl EventSender {
    /// Enqueues a notification. Dropped silently once the worker has exited.
    pub fn send(&self, event: Event) {
        if let Err(mpsc::SendError(Message::Event(event))) = self.sender.send(Message::Event(event))
        {
            tracing::debug!(
                target: QUEUE_TARGET,
                ?event,
                "lifecycle worker gone; dropping event"
            );
        }
    }

    pub(crate) fn submit(&self, task: Task) -> Result<(), QueueClosed> {
        self.sender
            .send(Message::Task(task))
            .map_err(|_| QueueClosed)
    }

    pub(crate) fn request_shutdown(&self) -> Result<(), QueueClosed> {
        self.sender
            .send(Message::Shutdown)
            .map_err(|_| QueueClosed)
    }
}

/// The worker has stopped consuming messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct QueueClosed;

/// Consumer side of the lifecycle queue.
#[derive(Debug)]
pub struct Looper {
    receiver: Receiver<Message>,
}

/// Creates a connected sender and looper.
#[must_use]
pub fn channel() -> (EventSender, Looper) {
    let (sender, receiver) = mpsc::channel();
    (EventSender { sender }, Looper { receiver })
}

impl Looper {
    /// Handles every queued message without blocking.
    ///
    /// Returns the number of messages handled. Stops early at a shutdown
    /// request.
    pub fn dispatch_pending(&self, orchestrator: &mut Orchestrator) -> usize {
        let mut handled = 0;
        loop {
            match self.receiver.try_recv() {
                Ok(Message::Shutdown) | Err(TryRecvError::Empty | TryRecvError::Disconnected) => {
                    return handled;
                }
                Ok(message) => {
                    Self::handle(orchestrator, message);
                    handled += 1;
                }
            }
        }
    }

    /// Blocks handling messages until shutdown is requested.
    pub(crate) fn run(self, mut orchestrator: Orchestrator) {
        while let Ok(message) = self.receiver.recv() {
            if matches!(message, Message::Shutdown) {
                break;
            }
            Self::handle(&mut orchestrator, message);
        }
        tracing::debug!(target: QUEUE_TARGET, "lifecycle worker stopped");
    }

    fn handle(orchestrator: &mut Orchestrator, message: Message) {
        match message {
            Message::Event(event) => orchestrator.handle_event(event),
            Message::Task(task) => task(orchestrator),
            Message::Shutdown => {}
        }
    }
}

#[cfg(test)]
impl Looper {
    /// Drains queued notifications without handling them.
    pub(crate) fn pending_events(&self) -> Vec<Event> {
        self.receiver
            .try_iter()
            .filter_map(|message| match message {
                Message::Event(event) => Some(event),
                Message::Task(_) | Message::Shutdown => None,
            })
            .collect()
    }
}
