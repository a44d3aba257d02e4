//! Identifiers for values and observers.
//!
//! Values and observer registries are shared through cloned handles, so
//! identity can not be taken from an address. Each gets a unique id from an
//! atomic counter when it is created instead.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for a [`Value`](crate::Value).
///
/// Link registries are keyed by this id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValueId(u64);

impl ValueId {
    /// Generate a new unique value ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for ValueId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "value#{}", self.0)
    }
}

/// Unique identifier for an [`Observer`](crate::observer::Observer) registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

impl ObserverId {
    /// Generate a new unique observer ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ObserverId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "observer#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_ids_are_unique() {
        let id1 = ValueId::new();
        let id2 = ValueId::new();
        let id3 = ValueId::new();

        assert_ne!(id1, id2);
        assert_ne!(id2, id3);
        assert_ne!(id1, id3);
    }

    #[test]
    fn observer_ids_are_unique() {
        assert_ne!(ObserverId::new(), ObserverId::new());
    }

    #[test]
    fn value_id_display() {
        let id = ValueId::new();
        assert_eq!(id.to_string(), format!("value#{}", id.raw()));
    }
}
