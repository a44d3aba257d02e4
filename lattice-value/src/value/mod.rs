//! Observable Values
//!
//! This module implements [`Value`], a mutable cell holding one logical
//! value, and everything layered directly on it.
//!
//! # How a `set` Works
//!
//! 1. Absence is replaced by the null substitute, if the value has one.
//!
//! 2. Every validator is consulted. The first rejection fails the call and
//!    nothing is stored.
//!
//! 3. The candidate is compared with the stored value using `PartialEq`.
//!    If it differs and the value is locked, the call fails and nothing is
//!    stored.
//!
//! 4. The candidate is stored and, depending on the [`Notify`] policy,
//!    subscribers are notified on the calling thread.
//!
//! # Links
//!
//! Links are ordinary subscriptions that push notified values into another
//! value's `set`, so a linked value validates, locks and notifies exactly as
//! if it had been set directly. See [`Value::link`] and
//! [`Value::link_observable`].
//!
//! # Change Diffs
//!
//! [`Value::changed`] derives a stream of [`ValueChange`] pairs that only
//! fires on real transitions, even on a [`Notify::Set`] value.

mod builder;
mod cell;
mod change;
pub(crate) mod context;
mod link;
mod validator;
mod view;

use serde::{Deserialize, Serialize};

pub use builder::ValueBuilder;
pub use cell::{Locked, Value};
pub use change::ValueChange;
pub use validator::{validator, Validator};
pub use view::ValueObservable;

/// When a value notifies its subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Notify {
    /// Notify on every successful `set`, even when the value did not change.
    Set,

    /// Notify only when the stored value actually changed.
    #[default]
    Changed,
}
