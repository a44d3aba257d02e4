//! Value Links
//!
//! A link keeps one value in step with another by pushing every notified
//! value into the other's `set`.
//!
//! # Edge Kinds
//!
//! - **Value to value** ([`Value::link`]): bidirectional. Each side forwards
//!   its raw stream into the other. A forwarder only calls `set` when the
//!   incoming value differs from what the target holds, so a round trip
//!   settles after one hop even on [`Notify::Set`](super::Notify::Set) values.
//!
//! - **Observable to value** ([`Value::link_observable`]): unidirectional.
//!   The observable's stream is pushed into this value; this value never
//!   writes back.
//!
//! # Graph Shape
//!
//! Bidirectional links form an undirected graph. A new link that would close
//! a cycle in that graph is refused with [`ValueError::LinkCycle`], since a
//! cycle can feed a value back into itself through a validator or null
//! substitute on the way.
//!
//! # Lifetimes
//!
//! Edges and forwarders hold `Weak` references to their target, so a link
//! never keeps a value alive. Dropping a value removes its forwarders from
//! the values it was linked with.

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Weak};

use indexmap::IndexMap;

use super::cell::ValueInner;
use super::Value;
use crate::error::{Result, ValueError};
use crate::id::{ObserverId, ValueId};
use crate::observer::{Forwarder, Observable, Observer};

/// Link edges of a single value.
pub(crate) struct Links<T: 'static> {
    /// Bidirectional edges created by this value, keyed by partner.
    values: IndexMap<ValueId, ValueLink<T>>,

    /// Partners that created a bidirectional edge to this value.
    linked_by: IndexMap<ValueId, Weak<ValueInner<T>>>,

    /// Unidirectional edges from observables into this value.
    observables: IndexMap<ObserverId, ObservableLink<T>>,
}

struct ValueLink<T: 'static> {
    original: Weak<ValueInner<T>>,
    /// Registered on the original, pushes into this value.
    from_original: Forwarder<Option<T>>,
    /// Registered on this value, pushes into the original.
    to_original: Forwarder<Option<T>>,
}

struct ObservableLink<T> {
    observer: Observer<Option<T>>,
    forwarder: Forwarder<Option<T>>,
}

impl<T: 'static> Default for Links<T> {
    fn default() -> Self {
        Self {
            values: IndexMap::new(),
            linked_by: IndexMap::new(),
            observables: IndexMap::new(),
        }
    }
}

impl<T: 'static> Links<T> {
    /// Values directly linked to this one, in either direction.
    fn neighbours(&self) -> Vec<Arc<ValueInner<T>>> {
        self.values
            .values()
            .map(|link| &link.original)
            .chain(self.linked_by.values())
            .filter_map(Weak::upgrade)
            .collect()
    }
}

/// Build a forwarder that pushes notified values into `target`.
///
/// With `skip_equal`, values the target already holds are not set again.
fn forwarder<T>(target: Weak<ValueInner<T>>, skip_equal: bool) -> Forwarder<Option<T>>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    Arc::new(move |value: &Option<T>| {
        let Some(inner) = target.upgrade() else {
            return Ok(());
        };
        let target = Value::from_inner(inner);
        if skip_equal && target.with(|current| current == value.as_ref()) {
            return Ok(());
        }
        target.set(value.clone())
    })
}

impl<T> Value<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Link this value with `original`, in both directions.
    ///
    /// This value is first set to the original's current value, which may
    /// fail with [`ValueError::InvalidValue`] or [`ValueError::ValueLocked`].
    /// From then on a `set` on either side is pushed into the other.
    ///
    /// Fails with [`ValueError::SelfLink`] for a link to itself,
    /// [`ValueError::AlreadyLinked`] if the values are already linked and
    /// [`ValueError::LinkCycle`] if `original` is already reachable through
    /// other links.
    pub fn link(&self, original: &Value<T>) -> Result<()> {
        if self.id() == original.id() {
            return Err(ValueError::SelfLink);
        }
        if self.inner.links.lock().values.contains_key(&original.id()) {
            return Err(ValueError::AlreadyLinked);
        }
        if self.connected_to(original) {
            return Err(ValueError::LinkCycle);
        }

        self.set(original.get())?;

        let link = ValueLink {
            original: Arc::downgrade(&original.inner),
            from_original: forwarder(Arc::downgrade(&self.inner), true),
            to_original: forwarder(Arc::downgrade(&original.inner), true),
        };
        let (from_original, to_original) =
            (Arc::clone(&link.from_original), Arc::clone(&link.to_original));
        {
            let mut links = self.inner.links.lock();
            if links.values.contains_key(&original.id()) {
                return Err(ValueError::AlreadyLinked);
            }
            links.values.insert(original.id(), link);
        }
        original
            .inner
            .links
            .lock()
            .linked_by
            .insert(self.id(), Arc::downgrade(&self.inner));

        original.observer().add_forwarder(from_original);
        self.observer().add_forwarder(to_original);
        tracing::debug!(value = %self.id(), original = %original.id(), "linked values");

        Ok(())
    }

    /// Remove the link created by [`link`](Self::link).
    ///
    /// Fails with [`ValueError::NotLinked`] if there is none.
    pub fn unlink(&self, original: &Value<T>) -> Result<()> {
        let link = self
            .inner
            .links
            .lock()
            .values
            .shift_remove(&original.id())
            .ok_or(ValueError::NotLinked)?;
        original.inner.links.lock().linked_by.shift_remove(&self.id());

        original.observer().remove_forwarder(&link.from_original);
        self.observer().remove_forwarder(&link.to_original);
        tracing::debug!(value = %self.id(), original = %original.id(), "unlinked values");

        Ok(())
    }

    /// True if [`link`](Self::link) was called with `original`.
    pub fn is_linked(&self, original: &Value<T>) -> bool {
        self.inner.links.lock().values.contains_key(&original.id())
    }

    /// Follow `observable`: this value is set to its current value now and
    /// to every value it notifies from then on.
    ///
    /// Fails with [`ValueError::SelfLink`] if `observable` is this value's
    /// own stream and with [`ValueError::AlreadyLinked`] if it is already
    /// followed. The initial `set` may fail like any other.
    pub fn link_observable(&self, observable: &dyn Observable<T>) -> Result<()> {
        let observer = observable.observer();
        if observer.id() == self.observer().id() {
            return Err(ValueError::SelfLink);
        }
        if self.inner.links.lock().observables.contains_key(&observer.id()) {
            return Err(ValueError::AlreadyLinked);
        }

        self.set(observable.get())?;

        let forwarder = forwarder(Arc::downgrade(&self.inner), false);
        {
            let mut links = self.inner.links.lock();
            if links.observables.contains_key(&observer.id()) {
                return Err(ValueError::AlreadyLinked);
            }
            links.observables.insert(
                observer.id(),
                ObservableLink {
                    observer: observer.clone(),
                    forwarder: Arc::clone(&forwarder),
                },
            );
        }
        observer.add_forwarder(forwarder);
        tracing::debug!(value = %self.id(), observer = %observer.id(), "linked observable");

        Ok(())
    }

    /// Stop following `observable`.
    ///
    /// Fails with [`ValueError::NotLinked`] if it was not followed.
    pub fn unlink_observable(&self, observable: &dyn Observable<T>) -> Result<()> {
        let id = observable.observer().id();
        let link = self
            .inner
            .links
            .lock()
            .observables
            .shift_remove(&id)
            .ok_or(ValueError::NotLinked)?;

        link.observer.remove_forwarder(&link.forwarder);
        tracing::debug!(value = %self.id(), observer = %id, "unlinked observable");

        Ok(())
    }

    /// True if this value follows `observable`.
    pub fn is_linked_observable(&self, observable: &dyn Observable<T>) -> bool {
        self.inner
            .links
            .lock()
            .observables
            .contains_key(&observable.observer().id())
    }

    /// True if `other` can be reached from this value through links.
    fn connected_to(&self, other: &Value<T>) -> bool {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        queue.push_back(Arc::clone(&other.inner));

        // BFS over the undirected link graph
        while let Some(node) = queue.pop_front() {
            if node.id == self.id() {
                return true;
            }
            if !visited.insert(node.id) {
                continue;
            }
            let neighbours = node.links.lock().neighbours();
            queue.extend(neighbours);
        }

        false
    }
}

impl<T: 'static> Drop for ValueInner<T> {
    fn drop(&mut self) {
        let links = std::mem::take(self.links.get_mut());

        for (_, link) in links.values {
            if let Some(original) = link.original.upgrade() {
                original.links.lock().linked_by.shift_remove(&self.id);
                original.event.observer().remove_forwarder(&link.from_original);
            }
        }
        for (_, partner) in links.linked_by {
            if let Some(partner) = partner.upgrade() {
                let link = partner.links.lock().values.shift_remove(&self.id);
                if let Some(link) = link {
                    partner.event.observer().remove_forwarder(&link.to_original);
                }
            }
        }
        for (_, link) in links.observables {
            link.observer.remove_forwarder(&link.forwarder);
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
