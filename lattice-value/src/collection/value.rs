//! Collection value implementation.

use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::{Arc, OnceLock};

use indexmap::IndexSet;
use parking_lot::ReentrantMutex;

use super::element;
use super::view::CollectionObservable;
use super::Container;
use crate::error::{Result, ValueError};
use crate::id::ValueId;
use crate::observer::{Observable, Observer};
use crate::value::context::Propagation;
use crate::value::{Notify, Validator, Value, ValueBuilder};

/// A value backed by an insertion-ordered list.
pub type ValueList<T> = ValueCollection<T, Vec<T>>;

/// A value backed by an insertion-ordered set.
pub type ValueSet<T> = ValueCollection<T, IndexSet<T>>;

pub(super) struct CollectionInner<T, C>
where
    T: Clone + PartialEq + Send + Sync + 'static,
    C: Container<T>,
{
    /// Never null; the substitute is the empty container.
    pub(super) value: Value<Arc<C>>,

    /// Serializes read-modify-write sequences on `value`.
    guard: ReentrantMutex<()>,

    /// Created on first access to [`ValueCollection::value`].
    element: OnceLock<Value<T>>,
}

/// An observable collection with atomic copy-on-write updates.
///
/// Cloning a `ValueCollection` creates a new handle to the same collection.
///
/// # Example
///
/// ```rust
/// use lattice_value::ValueSet;
///
/// let tags = ValueSet::with_values(["a", "b"]);
/// assert!(!tags.add("a").unwrap());
/// assert!(tags.add("c").unwrap());
/// assert_eq!(tags.size(), 3);
///
/// tags.value().set("z").unwrap();
/// assert_eq!(tags.get().iter().copied().collect::<Vec<_>>(), vec!["z"]);
/// ```
pub struct ValueCollection<T, C>
where
    T: Clone + PartialEq + Send + Sync + 'static,
    C: Container<T>,
{
    pub(super) inner: Arc<CollectionInner<T, C>>,
}

impl<T, C> ValueCollection<T, C>
where
    T: Clone + PartialEq + Send + Sync + 'static,
    C: Container<T>,
{
    /// Create an empty collection.
    pub fn empty() -> Self {
        Self::from_value(Value::non_null(Arc::new(C::default())))
    }

    /// Create a collection holding `values`.
    pub fn with_values(values: impl IntoIterator<Item = T>) -> Self {
        let value = Value::new(
            Some(Arc::new(values.into_iter().collect())),
            Some(Arc::new(C::default())),
            Notify::Changed,
        );
        Self::from_value(value)
    }

    /// Start configuring a collection.
    pub fn builder() -> ValueCollectionBuilder<T, C> {
        ValueCollectionBuilder::new()
    }

    fn from_value(value: Value<Arc<C>>) -> Self {
        Self {
            inner: Arc::new(CollectionInner {
                value,
                guard: ReentrantMutex::new(()),
                element: OnceLock::new(),
            }),
        }
    }

    /// Get the collection's unique ID, shared with [`as_value`](Self::as_value).
    pub fn id(&self) -> ValueId {
        self.inner.value.id()
    }

    /// The current snapshot.
    pub fn get(&self) -> Arc<C> {
        self.inner.value.get().unwrap_or_default()
    }

    /// Replace the contents with `values`.
    pub fn set(&self, values: impl IntoIterator<Item = T>) -> Result<()> {
        let snapshot: C = values.into_iter().collect();
        let _guard = self.inner.guard.lock();
        self.commit(snapshot)
    }

    /// Add `item`, returning `false` if the container rejected it.
    pub fn add(&self, item: T) -> Result<bool> {
        self.update(|working| working.insert(item))
    }

    /// Add every item, returning `true` if any was accepted.
    pub fn add_all(&self, items: impl IntoIterator<Item = T>) -> Result<bool> {
        self.update(|working| {
            items
                .into_iter()
                .fold(false, |added, item| working.insert(item) || added)
        })
    }

    /// Remove one occurrence of `item`, returning `false` if it was absent.
    pub fn remove(&self, item: &T) -> Result<bool> {
        self.update(|working| working.remove(item))
    }

    /// Remove every occurrence of every item, returning `true` if any was removed.
    pub fn remove_all(&self, items: impl IntoIterator<Item = T>) -> Result<bool> {
        let removed: C = items.into_iter().collect();
        self.update(|working| {
            let before = working.len();
            working.retain(|item| !removed.contains(item));
            working.len() != before
        })
    }

    /// Remove everything.
    pub fn clear(&self) -> Result<()> {
        let _guard = self.inner.guard.lock();
        self.commit(C::default())
    }

    /// Number of items.
    pub fn size(&self) -> usize {
        let _guard = self.inner.guard.lock();
        self.inner.value.with(|snapshot| snapshot.map_or(0, |c| c.len()))
    }

    /// True if there are no items.
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// True if `item` is present.
    pub fn contains(&self, item: &T) -> bool {
        let _guard = self.inner.guard.lock();
        self.inner
            .value
            .with(|snapshot| snapshot.is_some_and(|c| c.contains(item)))
    }

    /// True if every item is present. Vacuously true for no items.
    pub fn contains_all<'a>(&self, items: impl IntoIterator<Item = &'a T>) -> bool
    where
        T: 'a,
    {
        let snapshot = self.snapshot();
        items.into_iter().all(|item| snapshot.contains(item))
    }

    /// True if at least one item is present.
    pub fn contains_any<'a>(&self, items: impl IntoIterator<Item = &'a T>) -> bool
    where
        T: 'a,
    {
        let snapshot = self.snapshot();
        items.into_iter().any(|item| snapshot.contains(item))
    }

    /// A value holding the first element, or `None` when empty.
    ///
    /// Setting it replaces the collection with a singleton, or empties it
    /// when set to `None`. Built on first access and shared by every later
    /// call.
    pub fn value(&self) -> Value<T> {
        self.inner
            .element
            .get_or_init(|| element::project(self))
            .clone()
    }

    /// A read-only view of this collection.
    pub fn observable(&self) -> CollectionObservable<T, C> {
        CollectionObservable::new(self.clone())
    }

    /// The underlying value, for listeners, validators and links.
    pub fn as_value(&self) -> &Value<Arc<C>> {
        &self.inner.value
    }

    /// Registration handle for the snapshot stream.
    pub fn observer(&self) -> Observer<Option<Arc<C>>> {
        self.inner.value.observer()
    }

    pub(super) fn downgrade(&self) -> std::sync::Weak<CollectionInner<T, C>> {
        Arc::downgrade(&self.inner)
    }

    pub(super) fn from_inner(inner: Arc<CollectionInner<T, C>>) -> Self {
        Self { inner }
    }

    /// Replace the contents with `snapshot` under the guard.
    pub(super) fn replace(&self, snapshot: C) -> Result<()> {
        let _guard = self.inner.guard.lock();
        self.commit(snapshot)
    }

    fn snapshot(&self) -> Arc<C> {
        let _guard = self.inner.guard.lock();
        self.get()
    }

    /// Copy the snapshot, apply `change` and commit the copy.
    fn update<R>(&self, change: impl FnOnce(&mut C) -> R) -> Result<R> {
        let _guard = self.inner.guard.lock();
        let mut working = C::clone(&self.get());
        let result = change(&mut working);
        self.commit(working)?;

        Ok(result)
    }

    /// Check `snapshot` against the validators and the lock without committing it.
    pub(super) fn check(&self, snapshot: &Arc<C>) -> Result<()> {
        let value = &self.inner.value;
        value.validate(Some(snapshot))?;
        if value.is_locked() && !value.with(|current| current == Some(snapshot)) {
            return Err(ValueError::ValueLocked);
        }

        Ok(())
    }

    fn commit(&self, snapshot: C) -> Result<()> {
        tracing::trace!(collection = %self.id(), size = snapshot.len(), "committing snapshot");
        let first = snapshot.first().cloned();
        self.inner.value.set(Arc::new(snapshot))?;
        self.refresh_element(first)
    }

    /// Bring the projection in line with the committed first item.
    ///
    /// Set snapshots compare without regard to order, so a reordering commits
    /// without notifying and the projection has to be refreshed here.
    fn refresh_element(&self, first: Option<T>) -> Result<()> {
        let Some(element) = self.inner.element.get() else {
            return Ok(());
        };
        if element.with(|current| current == first.as_ref()) {
            return Ok(());
        }
        let _propagation = Propagation::enter(self.id());
        element.set(first)
    }
}

impl<T> ValueCollection<T, Vec<T>>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Sort the list in natural order.
    pub fn sort(&self) -> Result<()>
    where
        T: Ord,
    {
        self.update(|working| working.sort())
    }

    /// Sort the list with `compare`.
    pub fn sort_by<F>(&self, compare: F) -> Result<()>
    where
        F: FnMut(&T, &T) -> std::cmp::Ordering,
    {
        self.update(|working| working.sort_by(compare))
    }
}

impl<T, C> Observable<Arc<C>> for ValueCollection<T, C>
where
    T: Clone + PartialEq + Send + Sync + 'static,
    C: Container<T>,
{
    fn get(&self) -> Option<Arc<C>> {
        Some(ValueCollection::get(self))
    }

    fn is_nullable(&self) -> bool {
        false
    }

    fn observer(&self) -> Observer<Option<Arc<C>>> {
        ValueCollection::observer(self)
    }
}

impl<T, C> Clone for ValueCollection<T, C>
where
    T: Clone + PartialEq + Send + Sync + 'static,
    C: Container<T>,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, C> Debug for ValueCollection<T, C>
where
    T: Clone + PartialEq + Send + Sync + 'static,
    C: Container<T> + Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueCollection")
            .field("id", &self.id())
            .field("values", &self.get())
            .finish()
    }
}

impl<T, C> Default for ValueCollection<T, C>
where
    T: Clone + PartialEq + Send + Sync + 'static,
    C: Container<T>,
{
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> FromIterator<T> for ValueList<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::with_values(iter)
    }
}

impl<T> FromIterator<T> for ValueSet<T>
where
    T: Clone + Hash + Eq + Send + Sync + 'static,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::with_values(iter)
    }
}

/// Fluent configuration for a [`ValueCollection`].
pub struct ValueCollectionBuilder<T, C>
where
    T: Clone + PartialEq + Send + Sync + 'static,
    C: Container<T>,
{
    builder: ValueBuilder<Arc<C>>,
    _item: PhantomData<fn() -> T>,
}

impl<T, C> ValueCollectionBuilder<T, C>
where
    T: Clone + PartialEq + Send + Sync + 'static,
    C: Container<T>,
{
    fn new() -> Self {
        Self {
            builder: ValueBuilder::new().non_null(Arc::new(C::default())),
            _item: PhantomData,
        }
    }

    /// Initial contents.
    pub fn values(mut self, values: impl IntoIterator<Item = T>) -> Self {
        self.builder = self
            .builder
            .value(Arc::new(values.into_iter().collect::<C>()));
        self
    }

    /// Notify policy, [`Notify::Changed`] by default.
    pub fn notify(mut self, notify: Notify) -> Self {
        self.builder = self.builder.notify(notify);
        self
    }

    /// Validate every snapshot before it is committed.
    pub fn validator(mut self, validator: Arc<dyn Validator<Arc<C>>>) -> Self {
        self.builder = self.builder.validator(validator);
        self
    }

    /// Create the collection.
    ///
    /// Fails if a validator rejects the initial contents.
    pub fn build(self) -> Result<ValueCollection<T, C>> {
        Ok(ValueCollection::from_value(self.builder.build()?))
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
