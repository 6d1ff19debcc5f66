//! Callbacks exposed to interface owners and stack observers.

/// Notifications delivered to the owner of one interface.
///
/// Callbacks run on the lifecycle worker. Calls into
/// [`InterfaceManager`](crate::InterfaceManager) made from a callback return
/// [`ManagerError::ReentrantCall`](crate::ManagerError::ReentrantCall); hand
/// follow-up work to another thread instead.
pub trait InterfaceCallback: Send + Sync {
    /// The interface link came up.
    fn on_up(&self, name: &str);

    /// The interface link went down.
    fn on_down(&self, name: &str);

    /// The interface no longer exists. Delivered exactly once per interface.
    fn on_destroyed(&self, name: &str);
}

/// Observer of global stack availability.
///
/// Runs on the lifecycle worker, under the same restriction on
/// [`InterfaceManager`](crate::InterfaceManager) calls as
/// [`InterfaceCallback`].
pub trait StatusListener: Send + Sync {
    /// `false` when a subsystem died, `true` once recovery completed.
    fn on_status_changed(&self, ready: bool);
}
