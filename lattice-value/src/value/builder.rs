//! Value Builder
//!
//! [`ValueBuilder`] collects the configuration of a value and assembles it
//! in [`build`](ValueBuilder::build), in this order:
//!
//! 1. The value is created with its initial value, null substitute and
//!    notify policy.
//! 2. Validators are added in the order given.
//! 3. Value and observable links, in the order given.
//! 4. Listeners and consumers, including weak and conditional ones, in the
//!    order given. They are notified in that order too.
//! 5. The value is locked, if requested.

use std::fmt::Debug;
use std::sync::{Arc, Weak};

use super::{Notify, Validator, Value};
use crate::error::Result;
use crate::observer::{consumer, Consumer, Listener, Observable};

enum LinkTarget<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    Value(Value<T>),
    Observable(Arc<dyn Observable<T>>),
}

enum Registration<T> {
    Listener(Listener),
    Consumer(Consumer<Option<T>>),
    WeakListener(Weak<dyn Fn() + Send + Sync>),
    WeakConsumer(Weak<dyn Fn(&Option<T>) + Send + Sync>),
}

/// Fluent configuration for a [`Value`].
///
/// # Example
///
/// ```rust
/// use lattice_value::{listener, Notify, Value};
///
/// let value = Value::builder()
///     .non_null(0)
///     .value(42)
///     .notify(Notify::Set)
///     .listener(listener(|| println!("set")))
///     .build()
///     .unwrap();
///
/// assert_eq!(value.get(), Some(42));
/// ```
pub struct ValueBuilder<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    value: Option<T>,
    null_substitute: Option<T>,
    notify: Notify,
    validators: Vec<Arc<dyn Validator<T>>>,
    links: Vec<LinkTarget<T>>,
    registrations: Vec<Registration<T>>,
    locked: bool,
}

impl<T> ValueBuilder<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// A builder for a nullable value holding `None`.
    pub fn new() -> Self {
        Self {
            value: None,
            null_substitute: None,
            notify: Notify::default(),
            validators: Vec::new(),
            links: Vec::new(),
            registrations: Vec::new(),
            locked: false,
        }
    }

    /// Initial value.
    pub fn value(mut self, value: impl Into<Option<T>>) -> Self {
        self.value = value.into();
        self
    }

    /// Make the value nullable, with the given initial value.
    pub fn nullable(mut self, value: impl Into<Option<T>>) -> Self {
        self.null_substitute = None;
        self.value = value.into();
        self
    }

    /// Make the value non-nullable, storing `null_substitute` in place of `None`.
    pub fn non_null(mut self, null_substitute: T) -> Self {
        self.null_substitute = Some(null_substitute);
        self
    }

    /// Notify policy, [`Notify::Changed`] by default.
    pub fn notify(mut self, notify: Notify) -> Self {
        self.notify = notify;
        self
    }

    /// Validate every value before it is stored.
    pub fn validator(mut self, validator: Arc<dyn Validator<T>>) -> Self {
        self.validators.push(validator);
        self
    }

    /// Link the value with `original` in both directions, see [`Value::link`].
    pub fn link(mut self, original: &Value<T>) -> Self {
        self.links.push(LinkTarget::Value(original.clone()));
        self
    }

    /// Follow `observable`, see [`Value::link_observable`].
    pub fn link_observable(mut self, observable: Arc<dyn Observable<T>>) -> Self {
        self.links.push(LinkTarget::Observable(observable));
        self
    }

    /// Add a listener, kept alive by the value.
    pub fn listener(mut self, listener: Listener) -> Self {
        self.registrations.push(Registration::Listener(listener));
        self
    }

    /// Add a consumer, kept alive by the value.
    pub fn consumer(mut self, consumer: Consumer<Option<T>>) -> Self {
        self.registrations.push(Registration::Consumer(consumer));
        self
    }

    /// Add a listener without keeping it alive.
    pub fn weak_listener(mut self, listener: &Listener) -> Self {
        self.registrations
            .push(Registration::WeakListener(Arc::downgrade(listener)));
        self
    }

    /// Add a consumer without keeping it alive.
    pub fn weak_consumer(mut self, consumer: &Consumer<Option<T>>) -> Self {
        self.registrations
            .push(Registration::WeakConsumer(Arc::downgrade(consumer)));
        self
    }

    /// Run `listener` whenever the value is set to `value`.
    pub fn when(self, value: impl Into<Option<T>>, listener: Listener) -> Self {
        let value = value.into();
        self.when_matches(move |current| *current == value, listener)
    }

    /// Pass the value to `consumer` whenever it is set to `value`.
    pub fn when_consumer(
        mut self,
        value: impl Into<Option<T>>,
        guarded: Consumer<Option<T>>,
    ) -> Self {
        let value = value.into();
        self.registrations
            .push(Registration::Consumer(consumer(move |current: &Option<T>| {
                if *current == value {
                    guarded(current);
                }
            })));
        self
    }

    /// Run `listener` whenever the value is set to something `predicate` accepts.
    pub fn when_matches<P>(mut self, predicate: P, listener: Listener) -> Self
    where
        P: Fn(&Option<T>) -> bool + Send + Sync + 'static,
    {
        self.registrations
            .push(Registration::Consumer(consumer(move |current: &Option<T>| {
                if predicate(current) {
                    listener();
                }
            })));
        self
    }

    /// Lock the value once everything else is applied.
    pub fn locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    /// Create the value.
    ///
    /// Fails if a validator rejects the initial value or if a link fails, in
    /// which case the partially configured value is dropped.
    pub fn build(self) -> Result<Value<T>> {
        let value = Value::new(self.value, self.null_substitute, self.notify);

        for validator in self.validators {
            value.add_validator(validator)?;
        }
        for target in self.links {
            match target {
                LinkTarget::Value(original) => value.link(&original)?,
                LinkTarget::Observable(observable) => {
                    value.link_observable(observable.as_ref())?
                }
            }
        }

        let observer = value.observer();
        for registration in self.registrations {
            match registration {
                Registration::Listener(listener) => observer.add_listener(listener),
                Registration::Consumer(consumer) => observer.add_consumer(consumer),
                Registration::WeakListener(listener) => match listener.upgrade() {
                    Some(listener) => observer.add_weak_listener(&listener),
                    None => false,
                },
                Registration::WeakConsumer(consumer) => match consumer.upgrade() {
                    Some(consumer) => observer.add_weak_consumer(&consumer),
                    None => false,
                },
            };
        }

        if self.locked {
            value.locked().set(true);
        }

        Ok(value)
    }
}

impl<T> Default for ValueBuilder<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Debug for ValueBuilder<T>
where
    T: Clone + PartialEq + Send + Sync + Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueBuilder")
            .field("value", &self.value)
            .field("null_substitute", &self.null_substitute)
            .field("notify", &self.notify)
            .field("validators", &self.validators.len())
            .field("links", &self.links.len())
            .field("registrations", &self.registrations.len())
            .field("locked", &self.locked)
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
