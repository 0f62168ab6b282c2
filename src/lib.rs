//! # Pawtrack
//!
//! Allergy tracking for dogs: log suspected triggers and symptoms, see which
//! triggers come up most often, and hand the vet a summary.
//!
//! ## Modules
//!
//! - [`events`]: Trigger, symptom and medication records
//! - [`analysis`]: Frequency analyzer, time windows, severity summaries
//! - [`views`]: Dashboard and trigger analysis view models
//! - [`report`]: Vet report builder and renderers (text, JSON, CSV)
//! - [`store`]: In-memory event store shared by the API
//! - [`import`]: JSON event logs and CSV exports
//! - [`api`]: REST API server with Axum
//!
//! ## Quick Start
//!
//! ```rust
//! use pawtrack::analysis::{FrequencyAnalyzer, TriggerAnalyzer};
//! use pawtrack::events::{EventLog, Subject, TriggerCategory, TriggerEvent};
//!
//! let mut log = EventLog::new(Subject::new("rex", "Rex"));
//! for category in [
//!     TriggerCategory::Food,
//!     TriggerCategory::Food,
//!     TriggerCategory::Pollen,
//! ] {
//!     log.add_trigger(TriggerEvent::new("rex", category, 0));
//! }
//!
//! let report = FrequencyAnalyzer::default().trigger_frequencies(&log, None);
//! assert_eq!(report.top().map(|e| e.category), Some(TriggerCategory::Food));
//! assert_eq!(report.percentage_of(TriggerCategory::Food), 67);
//! ```

pub mod analysis;
pub mod api;
pub mod config;
pub mod events;
pub mod import;
pub mod report;
pub mod store;
pub mod telemetry;
pub mod views;

// Re-export top-level types for convenience
pub use events::{
    Category, EventError, EventLog, Medication, Severity, Subject, SubjectId, SymptomCategory,
    SymptomEvent, TriggerCategory, TriggerEvent,
};

pub use analysis::{
    Clock, FrequencyAnalyzer, FrequencyEntry, FrequencyReport, SystemClock, TimeWindow,
    TriggerAnalyzer, TriggerBasis, WindowPreset,
};

pub use report::{render, ReportFormat, VetReport, VetReportBuilder};

pub use store::{EventStore, StoreError};

pub use api::{build_router, serve, ApiConfig, ApiError, AppState};
