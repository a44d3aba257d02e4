//! Subscriber types for the observer registry.
//!
//! A subscriber is anything registered with an [`Observer`](super::Observer):
//! a listener that only wants to know that something happened, a consumer
//! that receives the notified value, weak variants of both, and the internal
//! forwarders used by link edges. Forwarders can fail, and their error aborts
//! the notification that invoked them.

use std::sync::{Arc, Weak};

use crate::error::Result;

/// Callback invoked without the notified value.
pub type Listener = Arc<dyn Fn() + Send + Sync>;

/// Callback invoked with the notified value.
pub type Consumer<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Fallible callback used internally to push values along link edges.
pub(crate) type Forwarder<T> = Arc<dyn Fn(&T) -> Result<()> + Send + Sync>;

/// Wrap a closure as a [`Listener`].
pub fn listener<F>(f: F) -> Listener
where
    F: Fn() + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Wrap a closure as a [`Consumer`].
pub fn consumer<T, F>(f: F) -> Consumer<T>
where
    F: Fn(&T) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// What kind of registration a subscriber is.
///
/// The same callback may be registered once per kind, so a listener can be
/// registered both strongly and weakly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SubscriberKind {
    Listener,
    Consumer,
    WeakListener,
    WeakConsumer,
    Forwarder,
}

/// A registered callback.
pub(crate) enum Subscriber<T> {
    Listener(Listener),
    Consumer(Consumer<T>),
    WeakListener(Weak<dyn Fn() + Send + Sync>),
    WeakConsumer(Weak<dyn Fn(&T) + Send + Sync>),
    Forwarder(Forwarder<T>),
}

/// A subscriber that is known to be alive for the duration of a notification.
pub(crate) enum LiveSubscriber<T> {
    Listener(Listener),
    Consumer(Consumer<T>),
    Forwarder(Forwarder<T>),
}

/// Address of the callback allocation, used as registration identity.
pub(crate) fn address_of<F: ?Sized>(callback: &Arc<F>) -> usize {
    Arc::as_ptr(callback) as *const () as usize
}

fn weak_address_of<F: ?Sized>(callback: &Weak<F>) -> usize {
    Weak::as_ptr(callback) as *const () as usize
}

impl<T> Subscriber<T> {
    pub(crate) fn kind(&self) -> SubscriberKind {
        match self {
            Self::Listener(_) => SubscriberKind::Listener,
            Self::Consumer(_) => SubscriberKind::Consumer,
            Self::WeakListener(_) => SubscriberKind::WeakListener,
            Self::WeakConsumer(_) => SubscriberKind::WeakConsumer,
            Self::Forwarder(_) => SubscriberKind::Forwarder,
        }
    }

    pub(crate) fn address(&self) -> usize {
        match self {
            Self::Listener(listener) => address_of(listener),
            Self::Consumer(consumer) => address_of(consumer),
            Self::WeakListener(listener) => weak_address_of(listener),
            Self::WeakConsumer(consumer) => weak_address_of(consumer),
            Self::Forwarder(forwarder) => address_of(forwarder),
        }
    }

    /// True if this registration is for the given callback.
    pub(crate) fn matches(&self, kind: SubscriberKind, address: usize) -> bool {
        self.kind() == kind && self.address() == address
    }

    pub(crate) fn is_alive(&self) -> bool {
        match self {
            Self::WeakListener(listener) => listener.strong_count() > 0,
            Self::WeakConsumer(consumer) => consumer.strong_count() > 0,
            _ => true,
        }
    }

    /// Upgrade to a strong reference, `None` if a weak callback was dropped.
    pub(crate) fn upgrade(&self) -> Option<LiveSubscriber<T>> {
        match self {
            Self::Listener(listener) => Some(LiveSubscriber::Listener(Arc::clone(listener))),
            Self::Consumer(consumer) => Some(LiveSubscriber::Consumer(Arc::clone(consumer))),
            Self::WeakListener(listener) => listener.upgrade().map(LiveSubscriber::Listener),
            Self::WeakConsumer(consumer) => consumer.upgrade().map(LiveSubscriber::Consumer),
            Self::Forwarder(forwarder) => Some(LiveSubscriber::Forwarder(Arc::clone(forwarder))),
        }
    }
}

impl<T> LiveSubscriber<T> {
    /// Invoke the callback with the notified value.
    pub(crate) fn invoke(&self, value: &T) -> Result<()> {
        match self {
            Self::Listener(listener) => {
                listener();
                Ok(())
            }
            Self::Consumer(consumer) => {
                consumer(value);
                Ok(())
            }
            Self::Forwarder(forwarder) => forwarder(value),
        }
    }
}
