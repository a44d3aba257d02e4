//! Event and Observer.
//!
//! An [`Event`] is the owning side of a notification stream: only its holder
//! can notify. An [`Observer`] is the registration side that is handed out to
//! everyone else. Both share one registry of subscribers.
//!
//! # Thread Safety
//!
//! The registry is a `parking_lot::RwLock<Vec<_>>`. Notification takes a
//! snapshot of the live subscribers under the lock and releases it before
//! invoking anything, so callbacks may register, remove or notify again
//! (on this or any other thread) without deadlocking.

use std::fmt::Debug;
use std::sync::Arc;

use parking_lot::RwLock;
use smallvec::SmallVec;

use super::subscriber::{
    address_of, Consumer, Forwarder, Listener, LiveSubscriber, Subscriber, SubscriberKind,
};
use crate::error::Result;
use crate::id::ObserverId;

/// Snapshot of the subscribers taken for one notification.
type Snapshot<T> = SmallVec<[LiveSubscriber<T>; 4]>;

struct Registry<T> {
    id: ObserverId,
    subscribers: RwLock<Vec<Subscriber<T>>>,
}

/// Registration handle for a notification stream.
///
/// Cloning an `Observer` creates a new handle to the same registry.
/// Every `add_*` method has set semantics: registering the same callback
/// (by `Arc` identity) twice returns `false` the second time.
pub struct Observer<T> {
    registry: Arc<Registry<T>>,
}

impl<T: 'static> Observer<T> {
    fn new() -> Self {
        Self {
            registry: Arc::new(Registry {
                id: ObserverId::new(),
                subscribers: RwLock::new(Vec::new()),
            }),
        }
    }

    /// Get the registry's unique ID.
    pub fn id(&self) -> ObserverId {
        self.registry.id
    }

    /// Add a listener, invoked on every notification.
    pub fn add_listener(&self, listener: Listener) -> bool {
        self.add(Subscriber::Listener(listener))
    }

    /// Remove a listener added with [`add_listener`](Self::add_listener).
    pub fn remove_listener(&self, listener: &Listener) -> bool {
        self.remove(SubscriberKind::Listener, address_of(listener))
    }

    /// Add a consumer, invoked with the notified value.
    pub fn add_consumer(&self, consumer: Consumer<T>) -> bool {
        self.add(Subscriber::Consumer(consumer))
    }

    /// Remove a consumer added with [`add_consumer`](Self::add_consumer).
    pub fn remove_consumer(&self, consumer: &Consumer<T>) -> bool {
        self.remove(SubscriberKind::Consumer, address_of(consumer))
    }

    /// Add a listener without keeping it alive.
    ///
    /// The registration disappears once the last strong reference to the
    /// listener is dropped.
    pub fn add_weak_listener(&self, listener: &Listener) -> bool {
        self.add(Subscriber::WeakListener(Arc::downgrade(listener)))
    }

    /// Remove a listener added with [`add_weak_listener`](Self::add_weak_listener).
    pub fn remove_weak_listener(&self, listener: &Listener) -> bool {
        self.remove(SubscriberKind::WeakListener, address_of(listener))
    }

    /// Add a consumer without keeping it alive.
    pub fn add_weak_consumer(&self, consumer: &Consumer<T>) -> bool {
        self.add(Subscriber::WeakConsumer(Arc::downgrade(consumer)))
    }

    /// Remove a consumer added with [`add_weak_consumer`](Self::add_weak_consumer).
    pub fn remove_weak_consumer(&self, consumer: &Consumer<T>) -> bool {
        self.remove(SubscriberKind::WeakConsumer, address_of(consumer))
    }

    pub(crate) fn add_forwarder(&self, forwarder: Forwarder<T>) -> bool {
        self.add(Subscriber::Forwarder(forwarder))
    }

    pub(crate) fn remove_forwarder(&self, forwarder: &Forwarder<T>) -> bool {
        self.remove(SubscriberKind::Forwarder, address_of(forwarder))
    }

    /// Number of registrations whose callback is still alive.
    pub fn subscriber_count(&self) -> usize {
        self.registry
            .subscribers
            .read()
            .iter()
            .filter(|subscriber| subscriber.is_alive())
            .count()
    }

    fn add(&self, subscriber: Subscriber<T>) -> bool {
        let mut subscribers = self.registry.subscribers.write();
        let (kind, address) = (subscriber.kind(), subscriber.address());
        if subscribers
            .iter()
            .any(|existing| existing.matches(kind, address))
        {
            return false;
        }
        subscribers.push(subscriber);

        true
    }

    fn remove(&self, kind: SubscriberKind, address: usize) -> bool {
        let mut subscribers = self.registry.subscribers.write();
        match subscribers
            .iter()
            .position(|existing| existing.matches(kind, address))
        {
            Some(index) => {
                // Vec::remove keeps the remaining registrations in order
                subscribers.remove(index);
                true
            }
            None => false,
        }
    }

    fn snapshot(&self) -> Snapshot<T> {
        let (live, pruned) = {
            let subscribers = self.registry.subscribers.read();
            let live: Snapshot<T> = subscribers
                .iter()
                .filter_map(Subscriber::upgrade)
                .collect();
            let pruned = live.len() != subscribers.len();
            (live, pruned)
        };
        if pruned {
            self.registry
                .subscribers
                .write()
                .retain(Subscriber::is_alive);
        }

        live
    }
}

impl<T> Clone for Observer<T> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<T> Debug for Observer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observer")
            .field("id", &self.registry.id)
            .field("subscriber_count", &self.registry.subscribers.read().len())
            .finish()
    }
}

/// The owning side of a notification stream.
pub struct Event<T> {
    observer: Observer<T>,
}

impl<T: 'static> Event<T> {
    /// Create an event with no subscribers.
    pub fn new() -> Self {
        Self {
            observer: Observer::new(),
        }
    }

    /// Get a registration handle for this event.
    pub fn observer(&self) -> Observer<T> {
        self.observer.clone()
    }

    /// Notify every subscriber, in registration order, on the calling thread.
    ///
    /// Listeners and consumers can not fail. The first forwarder error stops
    /// the fan-out and is returned; subscribers after it are not invoked.
    pub fn notify(&self, value: &T) -> Result<()> {
        let subscribers = self.observer.snapshot();
        tracing::trace!(
            observer = %self.observer.id(),
            subscribers = subscribers.len(),
            "notifying"
        );
        for subscriber in &subscribers {
            subscriber.invoke(value)?;
        }

        Ok(())
    }
}

impl<T: 'static> Default for Event<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Debug for Event<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Event")
            .field("observer", &self.observer)
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
