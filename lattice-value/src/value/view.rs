//! Read-only value facade.

use std::fmt::Debug;

use super::Value;
use crate::observer::{Observable, Observer};

/// A read-only view of a [`Value`].
///
/// Hands out the value's content and notification stream without exposing
/// `set`. Views are cheap; every call to [`Value::observable`] makes a new
/// one over the same value.
pub struct ValueObservable<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    value: Value<T>,
}

impl<T> ValueObservable<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    pub(crate) fn new(value: Value<T>) -> Self {
        Self { value }
    }
}

impl<T> Observable<T> for ValueObservable<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn get(&self) -> Option<T> {
        self.value.get()
    }

    fn is_nullable(&self) -> bool {
        self.value.is_nullable()
    }

    fn observer(&self) -> Observer<Option<T>> {
        self.value.observer()
    }
}

impl<T> Clone for ValueObservable<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
        }
    }
}

impl<T> Debug for ValueObservable<T>
where
    T: Clone + PartialEq + Send + Sync + Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueObservable")
            .field("value", &self.value)
            .finish()
    }
}
