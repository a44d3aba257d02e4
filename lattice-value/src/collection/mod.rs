//! Collection-Backed Values
//!
//! A [`ValueCollection`] is a value whose payload is an immutable snapshot of
//! a container, shared as `Arc<C>`.
//!
//! # Copy-on-Write
//!
//! Snapshots are never mutated in place. Every mutation:
//!
//! 1. Takes the collection's reentrant guard.
//! 2. Clones the current snapshot into a working container.
//! 3. Applies the change to the working container.
//! 4. Commits it through the underlying value's `set`, so validators, the
//!    lock flag and the notify policy apply exactly as for any value.
//!
//! Holding the guard across the whole read-modify-write means two threads
//! adding at the same time can not both start from the same snapshot and
//! lose one addition. Every mutation copies the container, which is the
//! price paid for that.
//!
//! # Projection
//!
//! [`ValueCollection::value`] derives a `Value<T>` holding the first element.
//! Setting it replaces the collection with a singleton, or empties it.

mod element;
mod value;
mod view;

use std::hash::Hash;

use indexmap::IndexSet;

pub use value::{ValueCollection, ValueCollectionBuilder, ValueList, ValueSet};
pub use view::CollectionObservable;

/// A container that can back a [`ValueCollection`].
pub trait Container<T>:
    Clone + Default + PartialEq + FromIterator<T> + Send + Sync + 'static
{
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains(&self, item: &T) -> bool;

    /// The first element in iteration order.
    fn first(&self) -> Option<&T>;

    /// Add `item`, returning `false` if the container rejected it.
    fn insert(&mut self, item: T) -> bool;

    /// Remove one occurrence of `item`, returning `false` if absent.
    fn remove(&mut self, item: &T) -> bool;

    fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&T) -> bool;

    /// A container holding only `item`.
    fn singleton(item: T) -> Self {
        let mut container = Self::default();
        container.insert(item);
        container
    }
}

/// List semantics: insertion order, duplicates allowed.
impl<T> Container<T> for Vec<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn contains(&self, item: &T) -> bool {
        self.as_slice().contains(item)
    }

    fn first(&self) -> Option<&T> {
        self.as_slice().first()
    }

    fn insert(&mut self, item: T) -> bool {
        self.push(item);
        true
    }

    fn remove(&mut self, item: &T) -> bool {
        match self.iter().position(|existing| existing == item) {
            Some(index) => {
                Vec::remove(self, index);
                true
            }
            None => false,
        }
    }

    fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&T) -> bool,
    {
        Vec::retain(self, keep)
    }
}

/// Set semantics: insertion order, duplicates rejected.
impl<T> Container<T> for IndexSet<T>
where
    T: Clone + Hash + Eq + Send + Sync + 'static,
{
    fn len(&self) -> usize {
        IndexSet::len(self)
    }

    fn contains(&self, item: &T) -> bool {
        IndexSet::contains(self, item)
    }

    fn first(&self) -> Option<&T> {
        IndexSet::first(self)
    }

    fn insert(&mut self, item: T) -> bool {
        IndexSet::insert(self, item)
    }

    fn remove(&mut self, item: &T) -> bool {
        // shift_remove keeps the remaining elements in insertion order
        self.shift_remove(item)
    }

    fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&T) -> bool,
    {
        IndexSet::retain(self, keep)
    }
}
