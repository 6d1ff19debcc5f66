use std::sync::{Arc, Mutex, PoisonError};

/// Ordered record of every call made into the simulated stack.
///
/// Clones share the same record, so interface owners in tests can log their
/// callbacks into the same sequence as the subsystem calls.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    /// Builds an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one entry.
    pub fn record(&self, entry: impl Into<String>) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry.into());
    }

    /// Copy of every entry in call order.
    #[must_use]
    pub fn entries(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Index of the first matching entry.
    #[must_use]
    pub fn position(&self, entry: &str) -> Option<usize> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .position(|recorded| recorded == entry)
    }

    /// Number of matching entries.
    #[must_use]
    pub fn count(&self, entry: &str) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|recorded| *recorded == entry)
            .count()
    }

    /// Returns `true` when the entry was recorded at least once.
    #[must_use]
    pub fn contains(&self, entry: &str) -> bool {
        self.position(entry).is_some()
    }

    /// Forgets every entry.
    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
