//! Observer Primitive
//!
//! This module implements the listener registry that every value in the
//! crate is built on.
//!
//! # Concepts
//!
//! ## Events and Observers
//!
//! An [`Event`] owns a notification stream and is the only thing that can
//! notify it. An [`Observer`] is a cheap, clonable registration handle for
//! the same stream, safe to hand out.
//!
//! ## Listeners and Consumers
//!
//! A [`Listener`] is told that something happened. A [`Consumer`] receives
//! the notified value. Both can be registered strongly or weakly; a weak
//! registration holds a `std::sync::Weak` and silently disappears once the
//! callback is dropped elsewhere.
//!
//! ## Observables
//!
//! [`Observable`] is the read-only view of a value: its current content and
//! the observer for its notification stream.
//!
//! # Delivery
//!
//! Notification is synchronous and happens on the notifying thread, in
//! registration order. The registry lock is never held while callbacks run.

mod event;
mod observable;
mod subscriber;

pub use event::{Event, Observer};
pub use observable::Observable;
pub use subscriber::{consumer, listener, Consumer, Listener};

pub(crate) use subscriber::{address_of as subscriber_address, Forwarder};
