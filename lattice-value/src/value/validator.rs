//! Value validation.

use std::sync::Arc;

use crate::error::Result;

/// Decides whether a candidate value may be stored.
///
/// Validators see the candidate after null substitution. A rejection is
/// reported as [`ValueError::InvalidValue`](crate::ValueError::InvalidValue).
///
/// Validators are registered as `Arc<dyn Validator<T>>` and identified by
/// that `Arc`, so keep a clone around if you want to remove one later.
pub trait Validator<T>: Send + Sync {
    /// Return an error if `value` is not acceptable.
    fn validate(&self, value: Option<&T>) -> Result<()>;
}

impl<T, F> Validator<T> for F
where
    F: Fn(Option<&T>) -> Result<()> + Send + Sync,
{
    fn validate(&self, value: Option<&T>) -> Result<()> {
        self(value)
    }
}

/// Wrap a closure as a shareable validator.
pub fn validator<T, F>(f: F) -> Arc<dyn Validator<T>>
where
    T: 'static,
    F: Fn(Option<&T>) -> Result<()> + Send + Sync + 'static,
{
    Arc::new(f)
}
