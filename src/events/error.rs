//! Event validation error types
//!
//! Raised when a trigger, symptom, medication or subject fails validation
//! at the boundary where it enters the system.

use thiserror::Error;

/// Errors raised while building or parsing tracked events
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventError {
    /// Trigger category string did not match any known trigger
    #[error("Unknown trigger category: {0}")]
    UnknownTrigger(String),

    /// Symptom category string did not match any known symptom
    #[error("Unknown symptom category: {0}")]
    UnknownSymptom(String),

    /// Severity outside the 1-5 scale
    #[error("Severity must be between 1 and 5, got {0}")]
    SeverityOutOfRange(u8),

    /// Reminder time was not in HH:MM form
    #[error("Invalid reminder time: {0} (expected HH:MM)")]
    InvalidReminderTime(String),

    /// A required text field was blank
    #[error("{0} cannot be empty")]
    EmptyField(&'static str),

    /// Medication end date precedes its start date
    #[error("Medication end date {end} is before start date {start}")]
    InvalidMedicationDates { start: String, end: String },
}

/// Result type alias for event validation
pub type EventResult<T> = Result<T, EventError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EventError::UnknownTrigger("lava".to_string());
        assert_eq!(err.to_string(), "Unknown trigger category: lava");

        let err = EventError::SeverityOutOfRange(9);
        assert_eq!(err.to_string(), "Severity must be between 1 and 5, got 9");

        let err = EventError::EmptyField("Subject name");
        assert_eq!(err.to_string(), "Subject name cannot be empty");
    }
}
