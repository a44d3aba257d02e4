//! Lattice Value
//!
//! This crate provides the observable value engine for the Lattice reactive
//! UI framework. It implements:
//!
//! - Observable values with validation, null substitution and locking
//! - Change-diff observers that only fire on real transitions
//! - Bidirectional and unidirectional links between values
//! - Collection-backed values with atomic copy-on-write updates
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `observer`: Listener registry, events and the `Observable` trait
//! - `value`: The value cell, its builder, change diffs and links
//! - `collection`: List and set values and their single-element projection
//! - `error`: The error type shared by every operation
//!
//! Everything is synchronous: a `set` validates, stores and notifies on the
//! calling thread before it returns, and so does every linked value it
//! reaches.
//!
//! # Example
//!
//! ```rust
//! use lattice_value::{Observable, Value, ValueList};
//!
//! // Two values kept in step
//! let model = Value::nullable(42);
//! let ui = Value::<i32>::nullable(None);
//! ui.link(&model).unwrap();
//! assert_eq!(ui.get(), Some(42));
//!
//! ui.set(20).unwrap();
//! assert_eq!(model.get(), Some(20));
//!
//! // A list whose first element is exposed as a value
//! let list = ValueList::with_values([1, 2]);
//! list.add(3).unwrap();
//! assert_eq!(list.value().get(), Some(1));
//! assert!(list.as_value().is_not_null());
//! ```

pub mod collection;
pub mod error;
pub mod id;
pub mod observer;
pub mod value;

pub use collection::{
    CollectionObservable, Container, ValueCollection, ValueCollectionBuilder, ValueList, ValueSet,
};
pub use error::{Result, ValueError};
pub use id::{ObserverId, ValueId};
pub use observer::{consumer, listener, Consumer, Event, Listener, Observable, Observer};
pub use value::{
    validator, Locked, Notify, Validator, Value, ValueBuilder, ValueChange, ValueObservable,
};
