//! Error types for the value engine.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T, E = ValueError> = std::result::Result<T, E>;

/// Errors produced by value, link and collection operations.
///
/// All of these are raised synchronously at the call site, before any
/// mutation of the value that raised them is committed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValueError {
    /// A validator rejected the candidate value.
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// A change was attempted on a locked value.
    #[error("value is locked")]
    ValueLocked,

    /// The values are already linked.
    #[error("values are already linked")]
    AlreadyLinked,

    /// No link exists between the values.
    #[error("values are not linked")]
    NotLinked,

    /// A value can not be linked to itself.
    #[error("a value can not be linked to itself")]
    SelfLink,

    /// The link would close a cycle in the link graph.
    #[error("link would create a cycle")]
    LinkCycle,

    /// A value was required but the observable is empty.
    #[error("no value present")]
    NoValue,
}

impl ValueError {
    /// Shorthand for building an [`ValueError::InvalidValue`] from a validator.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidValue(message.into())
    }

    /// True for errors caused by a bad argument rather than object state.
    pub fn is_argument_error(&self) -> bool {
        matches!(self, Self::InvalidValue(_) | Self::SelfLink)
    }

    /// True for errors caused by the state of the value or its links.
    pub fn is_state_error(&self) -> bool {
        !self.is_argument_error()
    }
}
