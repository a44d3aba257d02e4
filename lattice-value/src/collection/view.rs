//! Read-only collection facade.

use std::fmt::Debug;
use std::sync::Arc;

use super::value::ValueCollection;
use super::Container;
use crate::observer::{Observable, Observer};

/// A read-only view of a [`ValueCollection`].
///
/// Exposes the snapshot and collection-shaped queries, never mutation.
pub struct CollectionObservable<T, C>
where
    T: Clone + PartialEq + Send + Sync + 'static,
    C: Container<T>,
{
    collection: ValueCollection<T, C>,
}

impl<T, C> CollectionObservable<T, C>
where
    T: Clone + PartialEq + Send + Sync + 'static,
    C: Container<T>,
{
    pub(super) fn new(collection: ValueCollection<T, C>) -> Self {
        Self { collection }
    }

    /// The current snapshot.
    pub fn get(&self) -> Arc<C> {
        self.collection.get()
    }

    /// Number of items in the current snapshot.
    pub fn size(&self) -> usize {
        self.collection.size()
    }

    /// True if the current snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.collection.is_empty()
    }

    /// True if the current snapshot holds `item`.
    pub fn contains(&self, item: &T) -> bool {
        self.collection.contains(item)
    }

    /// Registration handle for the snapshot stream.
    pub fn observer(&self) -> Observer<Option<Arc<C>>> {
        self.collection.observer()
    }
}

impl<T, C> Observable<Arc<C>> for CollectionObservable<T, C>
where
    T: Clone + PartialEq + Send + Sync + 'static,
    C: Container<T>,
{
    fn get(&self) -> Option<Arc<C>> {
        Some(CollectionObservable::get(self))
    }

    fn is_nullable(&self) -> bool {
        false
    }

    fn observer(&self) -> Observer<Option<Arc<C>>> {
        CollectionObservable::observer(self)
    }
}

impl<T, C> Clone for CollectionObservable<T, C>
where
    T: Clone + PartialEq + Send + Sync + 'static,
    C: Container<T>,
{
    fn clone(&self) -> Self {
        Self {
            collection: self.collection.clone(),
        }
    }
}

impl<T, C> Debug for CollectionObservable<T, C>
where
    T: Clone + PartialEq + Send + Sync + 'static,
    C: Container<T> + Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionObservable")
            .field("collection", &self.collection)
            .finish()
    }
}
