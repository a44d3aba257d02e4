//! Propagation Context
//!
//! Tracks which values are currently pushing a notification into a derived
//! value on this thread, so the derived value can tell its own write-back
//! apart from a write made by someone else.
//!
//! # Implementation
//!
//! A thread-local stack of value IDs. Entering pushes an ID, and the guard
//! pops it when dropped. Nesting is allowed: a projection of a projection
//! pushes one entry per level.

use std::cell::RefCell;

use crate::id::ValueId;

thread_local! {
    static PROPAGATING: RefCell<Vec<ValueId>> = const { RefCell::new(Vec::new()) };
}

/// Guard that marks a value as propagating until dropped.
pub(crate) struct Propagation {
    id: ValueId,
}

impl Propagation {
    /// Mark `id` as propagating on this thread.
    pub(crate) fn enter(id: ValueId) -> Self {
        PROPAGATING.with(|stack| stack.borrow_mut().push(id));

        Self { id }
    }

    /// True if `id` is propagating on this thread.
    pub(crate) fn is_active(id: ValueId) -> bool {
        PROPAGATING.with(|stack| stack.borrow().contains(&id))
    }
}

impl Drop for Propagation {
    fn drop(&mut self) {
        PROPAGATING.with(|stack| {
            let popped = stack.borrow_mut().pop();
            debug_assert_eq!(
                popped,
                Some(self.id),
                "propagation mismatch: expected {}, got {:?}",
                self.id,
                popped
            );
        });
    }
}
