//! Event store error types

use thiserror::Error;
use uuid::Uuid;

use crate::events::{EventError, SubjectId};

/// Errors that can occur in the event store
#[derive(Error, Debug)]
pub enum StoreError {
    /// No subject registered under this id
    #[error("Subject not found: {0}")]
    SubjectNotFound(SubjectId),

    /// A subject with this id is already registered
    #[error("Subject already exists: {0}")]
    DuplicateSubject(SubjectId),

    /// No trigger, symptom or medication with this id for the subject
    #[error("Event not found: {0}")]
    EventNotFound(Uuid),

    /// Record failed validation
    #[error("Invalid record: {0}")]
    Invalid(#[from] EventError),
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::SubjectNotFound(SubjectId::new("rex"));
        assert_eq!(err.to_string(), "Subject not found: rex");

        let err = StoreError::Invalid(EventError::EmptyField("Subject name"));
        assert_eq!(err.to_string(), "Invalid record: Subject name cannot be empty");
    }
}
