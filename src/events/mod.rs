//! Pawtrack event model
//!
//! - **types**: Closed category enums and the severity scale
//! - **records**: Subjects, trigger/symptom events, medications, event logs
//! - **error**: Validation errors
//!
//! Category strings are only accepted at the deserialization boundary. Past
//! it, an event without a recognizable category cannot be represented, so
//! analysis never has to guess what a malformed record meant.

pub mod error;
pub mod records;
pub mod types;

pub use error::{EventError, EventResult};
pub use records::{
    EventLog, Medication, ReminderTime, Subject, SubjectId, SymptomEvent, TriggerEvent,
};
pub use types::{Category, Severity, SymptomCategory, TriggerCategory};
