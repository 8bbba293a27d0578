//! Error types for sequence key validation.

use thiserror::Error;

/// Errors that can occur when building entity types, scopes, or keys.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdError {
    /// The entity type is empty or whitespace.
    #[error("entity type cannot be empty")]
    EmptyEntityType,

    /// The scope id is empty or whitespace.
    #[error("scope id cannot be empty")]
    EmptyScope,

    /// The value exceeds the maximum stored length.
    #[error("{field} exceeds {max} bytes")]
    TooLong { field: &'static str, max: usize },
}

impl IdError {
    /// Returns true if this error indicates the input was empty.
    pub fn is_empty(&self) -> bool {
        matches!(self, IdError::EmptyEntityType | IdError::EmptyScope)
    }
}
