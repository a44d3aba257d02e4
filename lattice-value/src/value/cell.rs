//! Value Implementation
//!
//! A Value is the fundamental observable cell. It holds at most one payload
//! and notifies its subscribers when that payload is set.
//!
//! # Nullability
//!
//! A value created with a null substitute is non-nullable: setting `None`
//! stores the substitute instead, so [`Value::get`] never returns `None`.
//!
//! # Thread Safety
//!
//! Values are thread-safe. The payload is protected by a `parking_lot`
//! RwLock that is held only while the previous payload is compared and the
//! new one stored. Subscribers are notified after the lock is released, so a
//! subscriber may call `set` again on the same value without deadlocking.
//!
//! # Memory Layout
//!
//! Each value consists of:
//! - A unique ID
//! - The payload and null substitute
//! - The validator list and the lazily created lock flag
//! - The notification event, link registries and cached change observer

use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::{Mutex, RwLock};

use super::change::{self, ValueChange};
use super::link::Links;
use super::validator::Validator;
use super::view::ValueObservable;
use super::{Notify, ValueBuilder};
use crate::error::{Result, ValueError};
use crate::id::ValueId;
use crate::observer::{subscriber_address, Event, Observable, Observer};

/// Shared state behind every [`Value`] handle.
pub(crate) struct ValueInner<T: 'static> {
    /// Unique identifier for this value.
    pub(crate) id: ValueId,

    /// The stored payload.
    value: RwLock<Option<T>>,

    /// Stored in place of `None` when present.
    null_substitute: Option<T>,

    notify: Notify,

    /// Validators in insertion order, without duplicates.
    validators: RwLock<Vec<Arc<dyn Validator<T>>>>,

    /// Raw notification stream, fired according to `notify`.
    pub(crate) event: Event<Option<T>>,

    /// Created on first access to [`Value::locked`].
    locked: OnceLock<Locked>,

    /// Bidirectional and unidirectional link edges.
    pub(crate) links: Mutex<Links<T>>,

    /// Created on first access to [`Value::changed`].
    changed: OnceLock<Observer<ValueChange<T>>>,
}

/// An observable, validated, optionally non-nullable value.
///
/// # Type Parameters
///
/// - `T`: The payload type. Change detection uses `PartialEq`, which is
///   structural for arrays, vectors and nested containers.
///
/// # Example
///
/// ```rust
/// use lattice_value::Value;
///
/// let count = Value::non_null(0);
/// count.set(5).unwrap();
/// assert_eq!(count.get(), Some(5));
///
/// // Non-nullable values store their substitute instead of None
/// count.clear().unwrap();
/// assert_eq!(count.get(), Some(0));
/// ```
pub struct Value<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    pub(crate) inner: Arc<ValueInner<T>>,
}

impl<T> Value<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Create a nullable value with the given initial value.
    pub fn nullable(value: impl Into<Option<T>>) -> Self {
        Self::new(value.into(), None, Notify::Changed)
    }

    /// Create a non-nullable value, initially holding `null_substitute`.
    pub fn non_null(null_substitute: T) -> Self {
        Self::new(None, Some(null_substitute), Notify::Changed)
    }

    /// Start configuring a value.
    pub fn builder() -> ValueBuilder<T> {
        ValueBuilder::new()
    }

    pub(crate) fn new(value: Option<T>, null_substitute: Option<T>, notify: Notify) -> Self {
        let value = value.or_else(|| null_substitute.clone());
        Self {
            inner: Arc::new(ValueInner {
                id: ValueId::new(),
                value: RwLock::new(value),
                null_substitute,
                notify,
                validators: RwLock::new(Vec::new()),
                event: Event::new(),
                locked: OnceLock::new(),
                links: Mutex::new(Links::default()),
                changed: OnceLock::new(),
            }),
        }
    }

    pub(crate) fn from_inner(inner: Arc<ValueInner<T>>) -> Self {
        Self { inner }
    }

    /// Get the value's unique ID.
    pub fn id(&self) -> ValueId {
        self.inner.id
    }

    /// Get the current value.
    ///
    /// Never `None` for a non-nullable value.
    pub fn get(&self) -> Option<T> {
        self.inner.value.read().clone()
    }

    /// Read the current value without cloning it.
    ///
    /// The storage lock is held while `f` runs, so `f` must not set this value.
    pub fn with<R>(&self, f: impl FnOnce(Option<&T>) -> R) -> R {
        f(self.inner.value.read().as_ref())
    }

    /// True if this value has no null substitute.
    pub fn is_nullable(&self) -> bool {
        self.inner.null_substitute.is_none()
    }

    /// The notify policy this value was created with.
    pub fn notify_policy(&self) -> Notify {
        self.inner.notify
    }

    /// Set a new value.
    ///
    /// `None` is replaced by the null substitute. The call fails with
    /// [`ValueError::InvalidValue`] if a validator rejects the value, and with
    /// [`ValueError::ValueLocked`] if the value is locked and would change.
    /// Neither failure stores anything.
    ///
    /// Any error returned by a linked value during notification is returned
    /// here too. This value has already been stored by then.
    pub fn set(&self, value: impl Into<Option<T>>) -> Result<()> {
        let value = self.resolve(value.into());
        self.validate(value.as_ref())?;

        let changing = {
            let mut current = self.inner.value.write();
            let changing = *current != value;
            if changing && self.is_locked() {
                tracing::debug!(value = %self.inner.id, "locked value rejected a change");
                return Err(ValueError::ValueLocked);
            }
            // An equal value still replaces the stored instance
            *current = value.clone();
            changing
        };

        if changing || self.inner.notify == Notify::Set {
            self.inner.event.notify(&value)?;
        }

        Ok(())
    }

    /// Set the value to `None`, or to the null substitute if there is one.
    pub fn clear(&self) -> Result<()> {
        self.set(None)
    }

    /// Set the value to the result of applying `f` to the current value.
    pub fn map<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(Option<T>) -> Option<T>,
    {
        self.set(f(self.get()))
    }

    /// The lock handle for this value, created on first access.
    pub fn locked(&self) -> Locked {
        self.inner.locked.get_or_init(Locked::default).clone()
    }

    /// True if the value is currently locked.
    pub fn is_locked(&self) -> bool {
        self.inner.locked.get().is_some_and(Locked::get)
    }

    /// Add a validator.
    ///
    /// The current value is validated first; if it is rejected the validator
    /// is not added and the rejection is returned. Returns `false` if the
    /// validator was already registered.
    pub fn add_validator(&self, validator: Arc<dyn Validator<T>>) -> Result<bool> {
        validator.validate(self.get().as_ref())?;

        Ok(self.push_validator(validator))
    }

    /// Register a validator without checking the current value against it.
    pub(crate) fn push_validator(&self, validator: Arc<dyn Validator<T>>) -> bool {
        let mut validators = self.inner.validators.write();
        let address = subscriber_address(&validator);
        if validators
            .iter()
            .any(|existing| subscriber_address(existing) == address)
        {
            return false;
        }
        validators.push(validator);

        true
    }

    /// Remove a validator, returning `false` if it was not registered.
    pub fn remove_validator(&self, validator: &Arc<dyn Validator<T>>) -> bool {
        let mut validators = self.inner.validators.write();
        let address = subscriber_address(validator);
        match validators
            .iter()
            .position(|existing| subscriber_address(existing) == address)
        {
            Some(index) => {
                validators.remove(index);
                true
            }
            None => false,
        }
    }

    /// Run every registered validator against `value`, in insertion order.
    pub fn validate(&self, value: Option<&T>) -> Result<()> {
        let validators = self.inner.validators.read().clone();
        for validator in &validators {
            if let Err(error) = validator.validate(value) {
                tracing::trace!(value = %self.inner.id, %error, "validator rejected value");
                return Err(error);
            }
        }

        Ok(())
    }

    /// Registration handle for the raw notification stream.
    pub fn observer(&self) -> Observer<Option<T>> {
        self.inner.event.observer()
    }

    /// An observer that only fires on real changes, with the previous value.
    ///
    /// Built on first access and shared by every later call.
    pub fn changed(&self) -> Observer<ValueChange<T>> {
        self.inner
            .changed
            .get_or_init(|| change::attach(self))
            .clone()
    }

    /// A read-only view of this value.
    ///
    /// Each call returns a new stateless facade over the same value and stream.
    pub fn observable(&self) -> ValueObservable<T> {
        ValueObservable::new(self.clone())
    }

    fn resolve(&self, value: Option<T>) -> Option<T> {
        value.or_else(|| self.inner.null_substitute.clone())
    }
}

impl<T> Observable<T> for Value<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn get(&self) -> Option<T> {
        Value::get(self)
    }

    fn is_nullable(&self) -> bool {
        Value::is_nullable(self)
    }

    fn observer(&self) -> Observer<Option<T>> {
        Value::observer(self)
    }
}

impl<T> Clone for Value<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Debug for Value<T>
where
    T: Clone + PartialEq + Send + Sync + Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Value")
            .field("id", &self.inner.id)
            .field("value", &self.get())
            .field("nullable", &self.is_nullable())
            .field("notify", &self.inner.notify)
            .field("locked", &self.is_locked())
            .finish()
    }
}

/// Lock flag of a [`Value`].
///
/// While locked, any `set` that would change the stored value fails with
/// [`ValueError::ValueLocked`]. Setting an equal value is always allowed.
/// Cloning a `Locked` creates a new handle to the same flag.
#[derive(Debug, Clone, Default)]
pub struct Locked {
    flag: Arc<AtomicBool>,
}

impl Locked {
    /// True if the value is locked.
    pub fn get(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Lock or unlock the value.
    pub fn set(&self, locked: bool) {
        self.flag.store(locked, Ordering::SeqCst);
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::{consumer, listener};
    use crate::value::validator;
    use std::sync::atomic::{AtomicI32, Ordering};

    fn counter<T>(value: &Value<T>) -> Arc<AtomicI32>
    where
        T: Clone + PartialEq + Send + Sync + 'static,
    {
        let count = Arc::new(AtomicI32::new(0));
        let count_clone = count.clone();
        value.observer().add_listener(listener(move || {
            count_clone.fetch_add(1, Ordering::SeqCst);
        }));
        count
    }

    fn at_most_ten() -> Arc<dyn Validator<i32>> {
        validator(|value: Option<&i32>| match value {
            Some(value) if *value > 10 => Err(ValueError::invalid("greater than ten")),
            _ => Ok(()),
        })
    }

    #[test]
    fn value_get_and_set() {
        let value = Value::<i32>::nullable(None);
        assert_eq!(value.get(), None);

        value.set(42).unwrap();
        assert_eq!(value.get(), Some(42));

        value.set(None).unwrap();
        assert_eq!(value.get(), None);
    }

    #[test]
    fn non_null_value_substitutes_none() {
        let value = Value::non_null("null".to_string());
        assert!(!value.is_nullable());
        assert_eq!(value.get().as_deref(), Some("null"));

        value.set("test".to_string()).unwrap();
        assert_eq!(value.get().as_deref(), Some("test"));

        value.clear().unwrap();
        assert_eq!(value.get().as_deref(), Some("null"));
    }

    #[test]
    fn changed_policy_skips_equal_values() {
        let value = Value::non_null(0);
        let count = counter(&value);

        value.set(0).unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 0);

        value.set(1).unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 1);

        value.clear().unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 2);

        // clearing again stores the same substitute
        value.set(0).unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn set_policy_always_notifies() {
        let value = Value::new(Some(vec![1u8, 2, 3]), None, Notify::Set);
        let count = counter(&value);

        value.set(vec![1u8, 2, 3]).unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 1);

        value.set(vec![1u8, 2, 3]).unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn nested_arrays_compare_structurally() {
        let value = Value::nullable([[1, 2], [3, 4]]);
        let count = counter(&value);

        value.set([[1, 2], [3, 4]]).unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 0);

        value.set([[1, 2], [3, 5]]).unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 1);

        value.set(None).unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 2);

        value.set(None).unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn equal_value_replaces_stored_instance() {
        #[derive(Clone, Debug)]
        struct Named {
            id: i32,
            name: &'static str,
        }

        impl PartialEq for Named {
            fn eq(&self, other: &Self) -> bool {
                self.name == other.name
            }
        }

        let value = Value::nullable(Named { id: 1, name: "hello" });
        value
            .observer()
            .add_listener(listener(|| panic!("no change event expected")));

        value.set(Named { id: 2, name: "hello" }).unwrap();
        assert_eq!(value.get().map(|named| named.id), Some(2));
    }

    #[test]
    fn locked_value_rejects_changes_only() {
        let value = Value::non_null(0);
        value.locked().set(true);

        value.set(None).unwrap();
        value.set(0).unwrap();
        assert_eq!(value.set(1), Err(ValueError::ValueLocked));
        assert_eq!(value.get(), Some(0));

        value.locked().set(false);
        value.set(1).unwrap();
        assert_eq!(value.get(), Some(1));
    }

    #[test]
    fn lock_flag_is_created_lazily() {
        let value = Value::nullable(1);
        assert!(!value.is_locked());
        assert!(value.inner.locked.get().is_none());

        let locked = value.locked();
        assert!(!locked.get());
        locked.set(true);
        assert!(value.is_locked());
    }

    #[test]
    fn validators() {
        let value = Value::non_null(0);
        value.set(11).unwrap();
        let validator = at_most_ten();

        // the current value is validated before the validator is added
        assert!(value.add_validator(validator.clone()).is_err());

        value.set(1).unwrap();
        assert_eq!(value.add_validator(validator.clone()), Ok(true));
        assert_eq!(value.add_validator(validator.clone()), Ok(false));

        value.clear().unwrap();
        assert_eq!(value.get(), Some(0));
        assert!(matches!(value.set(11), Err(ValueError::InvalidValue(_))));
        assert_eq!(value.get(), Some(0));

        assert!(value.remove_validator(&validator));
        assert!(!value.remove_validator(&validator));
        value.set(11).unwrap();
    }

    #[test]
    fn rejected_value_does_not_notify() {
        let value = Value::non_null(0);
        value.add_validator(at_most_ten()).unwrap();
        let count = counter(&value);

        assert!(value.set(12).is_err());
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn map_applies_function() {
        let value = Value::nullable(0);
        value.map(|current| current.map(|v| v + 1)).unwrap();
        assert_eq!(value.get(), Some(1));

        value.map(|_| None).unwrap();
        assert!(value.is_null());

        value.map(|_| Some(42)).unwrap();
        assert!(value.is_not_null());
    }

    #[test]
    fn value_as_consumer_of_another() {
        let value = Value::<i32>::nullable(None);
        let listening = Value::<i32>::nullable(None);

        let listening_clone = listening.clone();
        value.observer().add_consumer(consumer(move |current: &Option<i32>| {
            listening_clone.set(*current).unwrap();
        }));

        value.set(1).unwrap();
        assert_eq!(listening.get(), Some(1));

        listening.set(2).unwrap();
        value.set(3).unwrap();
        assert_eq!(listening.get(), Some(3));
    }

    #[test]
    fn reentrant_set_from_listener() {
        let value = Value::nullable(0);
        let value_clone = value.clone();
        value.observer().add_consumer(consumer(move |current: &Option<i32>| {
            if let Some(current) = current {
                if *current < 5 {
                    value_clone.set(current + 1).unwrap();
                }
            }
        }));

        value.set(1).unwrap();
        assert_eq!(value.get(), Some(5));
    }

    #[test]
    fn get_or_err_on_empty_value() {
        let value: Value<String> = Value::nullable(None);
        assert_eq!(value.get_or_err(), Err(ValueError::NoValue));

        value.set("hello".to_string()).unwrap();
        assert_eq!(value.get_or_err().as_deref(), Ok("hello"));
    }

    #[test]
    fn value_clone_shares_state() {
        let value1 = Value::nullable(0);
        let value2 = value1.clone();

        value1.set(42).unwrap();
        assert_eq!(value2.get(), Some(42));
        assert_eq!(value1.id(), value2.id());
    }
}
