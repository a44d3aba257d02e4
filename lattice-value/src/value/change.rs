//! Change Diffs
//!
//! The raw notification stream of a value may fire without a change, for
//! example on every `set` of a [`Notify::Set`](super::Notify::Set) value.
//! The change-diff observer sits on that stream, remembers the last value it
//! delivered and only emits a [`ValueChange`] when the new value differs.

use std::mem;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::Value;
use crate::error::Result;
use crate::observer::{Event, Forwarder, Observer};

/// A transition of a value from `previous` to `current`.
///
/// Only produced when the two are not equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueChange<T> {
    previous: Option<T>,
    current: Option<T>,
}

impl<T> ValueChange<T> {
    /// Create a change from `previous` to `current`.
    pub fn new(previous: Option<T>, current: Option<T>) -> Self {
        Self { previous, current }
    }

    /// The value before the change.
    pub fn previous(&self) -> Option<&T> {
        self.previous.as_ref()
    }

    /// The value after the change.
    pub fn current(&self) -> Option<&T> {
        self.current.as_ref()
    }

    /// Split into `(previous, current)`.
    pub fn into_parts(self) -> (Option<T>, Option<T>) {
        (self.previous, self.current)
    }
}

struct ChangeDiff<T> {
    event: Event<ValueChange<T>>,
    /// Last value delivered, seeded with the value at creation.
    last: Mutex<Option<T>>,
}

impl<T> ChangeDiff<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn forward(&self, current: &Option<T>) -> Result<()> {
        let previous = {
            let mut last = self.last.lock();
            if *last == *current {
                return Ok(());
            }
            mem::replace(&mut *last, current.clone())
        };

        self.event.notify(&ValueChange::new(previous, current.clone()))
    }
}

/// Subscribe a new change-diff observer to `value`'s raw stream.
pub(super) fn attach<T>(value: &Value<T>) -> Observer<ValueChange<T>>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    let diff = Arc::new(ChangeDiff {
        event: Event::new(),
        last: Mutex::new(value.get()),
    });
    let observer = diff.event.observer();

    let forwarder: Forwarder<Option<T>> =
        Arc::new(move |current: &Option<T>| diff.forward(current));
    value.observer().add_forwarder(forwarder);

    observer
}
