//! Single-element projection of a collection.
//!
//! The projection is a nullable `Value<T>` that notifies on every `set`,
//! wired to its collection with two forwarders:
//!
//! - collection to element: every notified snapshot sets the element to the
//!   snapshot's first item, or `None` when empty;
//! - element to collection: every write to the element replaces the
//!   collection with a singleton, or empties it.
//!
//! While the first direction runs, the collection's ID is on the thread's
//! propagation stack and the second direction stands down, so reflecting a
//! snapshot into the element never rewrites the collection.
//!
//! A write to the element is checked against the collection's validators and
//! lock before the element stores it. A rejected write leaves both sides
//! untouched.
//!
//! Both forwarders hold `Weak` references; the collection keeps the
//! projection alive, never the other way around.

use std::sync::Arc;

use super::value::ValueCollection;
use super::Container;
use crate::observer::Forwarder;
use crate::value::context::Propagation;
use crate::value::{validator, Notify, Value};

fn first<T, C>(snapshot: Option<&Arc<C>>) -> Option<T>
where
    T: Clone,
    C: Container<T>,
{
    snapshot.and_then(|snapshot| snapshot.first().cloned())
}

fn replacement<T, C>(item: Option<&T>) -> C
where
    T: Clone,
    C: Container<T>,
{
    match item {
        Some(item) => C::singleton(item.clone()),
        None => C::default(),
    }
}

/// Create the projection of `collection` and wire it up.
pub(super) fn project<T, C>(collection: &ValueCollection<T, C>) -> Value<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
    C: Container<T>,
{
    let parent = collection.as_value();
    let element = Value::new(parent.with(first::<T, C>), None, Notify::Set);
    let parent_id = parent.id();

    let checked = collection.downgrade();
    element.push_validator(validator(move |item: Option<&T>| {
        if Propagation::is_active(parent_id) {
            return Ok(());
        }
        let Some(inner) = checked.upgrade() else {
            return Ok(());
        };
        ValueCollection::from_inner(inner).check(&Arc::new(replacement::<T, C>(item)))
    }));

    let target = Arc::downgrade(&element.inner);
    let to_element: Forwarder<Option<Arc<C>>> =
        Arc::new(move |snapshot: &Option<Arc<C>>| {
            let Some(inner) = target.upgrade() else {
                return Ok(());
            };
            let element = Value::from_inner(inner);
            let item = first::<T, C>(snapshot.as_ref());
            if element.with(|current| current == item.as_ref()) {
                return Ok(());
            }
            let _propagation = Propagation::enter(parent_id);
            element.set(item)
        });
    parent.observer().add_forwarder(to_element);

    let source = collection.downgrade();
    let to_collection: Forwarder<Option<T>> = Arc::new(move |item: &Option<T>| {
        if Propagation::is_active(parent_id) {
            return Ok(());
        }
        let Some(inner) = source.upgrade() else {
            return Ok(());
        };
        ValueCollection::from_inner(inner).replace(replacement::<T, C>(item.as_ref()))
    });
    element.observer().add_forwarder(to_collection);

    tracing::debug!(collection = %parent_id, element = %element.id(), "projected element");

    element
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
