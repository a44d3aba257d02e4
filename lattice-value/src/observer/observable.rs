//! The read-only view of a value.

use super::event::Observer;
use super::subscriber::{Consumer, Listener};
use crate::error::{Result, ValueError};

/// Read access to a value plus its notification stream.
///
/// Implemented by [`Value`](crate::Value) itself and by the read-only
/// facades handed out by [`Value::observable`](crate::Value::observable) and
/// [`ValueCollection::observable`](crate::ValueCollection::observable).
pub trait Observable<T>: Send + Sync {
    /// The current value.
    fn get(&self) -> Option<T>;

    /// True if [`get`](Self::get) may return `None`.
    fn is_nullable(&self) -> bool;

    /// Registration handle for the raw notification stream.
    fn observer(&self) -> Observer<Option<T>>;

    /// True if there is no current value.
    fn is_null(&self) -> bool {
        self.get().is_none()
    }

    /// True if there is a current value.
    fn is_not_null(&self) -> bool {
        !self.is_null()
    }

    /// True if the current value equals `value`.
    fn is(&self, value: Option<&T>) -> bool
    where
        T: PartialEq,
    {
        self.get().as_ref() == value
    }

    /// The current value, or [`ValueError::NoValue`] if there is none.
    fn get_or_err(&self) -> Result<T> {
        self.get().ok_or(ValueError::NoValue)
    }

    /// Add a listener, returning `false` if it is already registered.
    fn add_listener(&self, listener: Listener) -> bool
    where
        T: 'static,
    {
        self.observer().add_listener(listener)
    }

    /// Remove a listener, returning `false` if it was not registered.
    fn remove_listener(&self, listener: &Listener) -> bool
    where
        T: 'static,
    {
        self.observer().remove_listener(listener)
    }

    /// Add a consumer, returning `false` if it is already registered.
    fn add_consumer(&self, consumer: Consumer<Option<T>>) -> bool
    where
        T: 'static,
    {
        self.observer().add_consumer(consumer)
    }

    /// Remove a consumer, returning `false` if it was not registered.
    fn remove_consumer(&self, consumer: &Consumer<Option<T>>) -> bool
    where
        T: 'static,
    {
        self.observer().remove_consumer(consumer)
    }

    /// Add a listener without keeping it alive.
    fn add_weak_listener(&self, listener: &Listener) -> bool
    where
        T: 'static,
    {
        self.observer().add_weak_listener(listener)
    }

    /// Remove a weakly held listener.
    fn remove_weak_listener(&self, listener: &Listener) -> bool
    where
        T: 'static,
    {
        self.observer().remove_weak_listener(listener)
    }

    /// Add a consumer without keeping it alive.
    fn add_weak_consumer(&self, consumer: &Consumer<Option<T>>) -> bool
    where
        T: 'static,
    {
        self.observer().add_weak_consumer(consumer)
    }

    /// Remove a weakly held consumer.
    fn remove_weak_consumer(&self, consumer: &Consumer<Option<T>>) -> bool
    where
        T: 'static,
    {
        self.observer().remove_weak_consumer(consumer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::Event;

    struct Fixed {
        value: Option<i32>,
        event: Event<Option<i32>>,
    }

    impl Observable<i32> for Fixed {
        fn get(&self) -> Option<i32> {
            self.value
        }

        fn is_nullable(&self) -> bool {
            true
        }

        fn observer(&self) -> Observer<Option<i32>> {
            self.event.observer()
        }
    }

    #[test]
    fn provided_accessors() {
        let empty = Fixed {
            value: None,
            event: Event::new(),
        };
        assert!(empty.is_null());
        assert!(empty.is(None));
        assert_eq!(empty.get_or_err(), Err(ValueError::NoValue));

        let full = Fixed {
            value: Some(4),
            event: Event::new(),
        };
        assert!(full.is_not_null());
        assert!(full.is(Some(&4)));
        assert_eq!(full.get_or_err(), Ok(4));
    }
}
