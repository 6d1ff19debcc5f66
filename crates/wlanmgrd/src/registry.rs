//! Authoritative table of live interfaces.
//!
//! The registry has no locking of its own: it is owned by the orchestrator and
//! only touched from the lifecycle worker. Daemon and global running state are
//! never stored; they are derived from the entries on demand.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::iface::{Iface, IfaceId, IfaceType, InterfaceClass};

/// Returned when inserting an interface whose name is already live.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("interface {0} is already registered")]
pub struct DuplicateNameError(String);

impl DuplicateNameError {
    /// Creates an error for the conflicting name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Name that was already present.
    #[must_use]
    pub fn name(&self) -> &str {
        self.0.as_str()
    }
}

/// Live interfaces keyed by name.
#[derive(Debug, Default)]
pub struct Registry {
    entries: BTreeMap<String, Iface>,
}

impl Registry {
    /// Builds an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up an interface by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Iface> {
        self.entries.get(name)
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut Iface> {
        self.entries.get_mut(name)
    }

    /// Inserts a new interface, refusing duplicate names.
    pub fn put(&mut self, iface: Iface) -> Result<(), DuplicateNameError> {
        if self.entries.contains_key(iface.name()) {
            return Err(DuplicateNameError::new(iface.name()));
        }
        self.entries.insert(iface.name.clone(), iface);
        Ok(())
    }

    /// Removes and returns the named interface.
    pub fn remove(&mut self, name: &str) -> Option<Iface> {
        self.entries.remove(name)
    }

    /// Removes the interface instance with the given id.
    ///
    /// Returns `None` when the instance is gone, even if another instance now
    /// holds the same name.
    pub fn remove_by_id(&mut self, id: IfaceId) -> Option<Iface> {
        let name = self.find_by_id(id)?.name.clone();
        self.entries.remove(&name)
    }

    /// Finds an interface instance by id.
    #[must_use]
    pub fn find_by_id(&self, id: IfaceId) -> Option<&Iface> {
        self.entries.values().find(|iface| iface.id == id)
    }

    /// Returns `true` when any live interface has the given type.
    #[must_use]
    pub fn any_of_type(&self, kind: IfaceType) -> bool {
        self.entries.values().any(|iface| iface.kind == kind)
    }

    /// First interface of the class, ordered by name.
    #[must_use]
    pub fn first_of_class(&self, class: InterfaceClass) -> Option<&Iface> {
        self.entries.values().find(|iface| iface.kind.class() == class)
    }

    /// Number of live interfaces.
    #[must_use]
    pub fn count_all(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no interface is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates live interfaces ordered by name.
    pub fn iter(&self) -> impl Iterator<Item = &Iface> {
        self.entries.values()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rstest::{fixture, rstest};

    use super::*;
    use crate::callbacks::InterfaceCallback;

    struct SilentCallback;

    impl InterfaceCallback for SilentCallback {
        fn on_up(&self, _name: &str) {}
        fn on_down(&self, _name: &str) {}
        fn on_destroyed(&self, _name: &str) {}
    }

    fn iface(id: u64, name: &str, kind: IfaceType) -> Iface {
        Iface {
            id: IfaceId::new(id),
            name: name.to_owned(),
            kind,
            callback: Arc::new(SilentCallback),
            observer: None,
            last_known_up: false,
            feature_set: 0,
        }
    }

    #[fixture]
    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry
            .put(iface(1, "wlan0", IfaceType::StaConnectivity))
            .expect("first insert");
        registry
            .put(iface(2, "wlan1", IfaceType::AccessPoint))
            .expect("second insert");
        registry
    }

    #[rstest]
    fn rejects_duplicate_names(mut registry: Registry) {
        let error = registry
            .put(iface(3, "wlan0", IfaceType::StaScanOnly))
            .expect_err("duplicate should fail");
        assert_eq!(error.name(), "wlan0");
        assert_eq!(registry.count_all(), 2);
        assert_eq!(
            registry.get("wlan0").map(Iface::kind),
            Some(IfaceType::StaConnectivity)
        );
    }

    #[rstest]
    fn remove_by_id_ignores_reused_names(mut registry: Registry) {
        registry.remove("wlan0");
        registry
            .put(iface(7, "wlan0", IfaceType::AccessPoint))
            .expect("reuse name");

        assert!(registry.remove_by_id(IfaceId::new(1)).is_none());
        assert_eq!(
            registry.remove_by_id(IfaceId::new(7)).map(|entry| entry.name),
            Some("wlan0".to_owned())
        );
    }

    #[rstest]
    #[case(IfaceType::StaConnectivity, true)]
    #[case(IfaceType::StaScanOnly, false)]
    #[case(IfaceType::AccessPoint, true)]
    fn any_of_type_scans_entries(
        registry: Registry,
        #[case] kind: IfaceType,
        #[case] expected: bool,
    ) {
        assert_eq!(registry.any_of_type(kind), expected);
    }

    #[rstest]
    fn remove_absent_returns_none(mut registry: Registry) {
        assert!(registry.remove("wlan9").is_none());
        assert!(registry.remove("wlan1").is_some());
        assert!(registry.first_of_class(InterfaceClass::SoftAp).is_none());
        assert_eq!(
            registry
                .first_of_class(InterfaceClass::Client)
                .map(Iface::name),
            Some("wlan0")
        );
    }
}
