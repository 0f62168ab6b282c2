//! Trigger and symptom analysis
//!
//! - **frequency**: Ranked frequency reports, the core aggregation
//! - **window**: Rolling time windows, presets and injectable clocks
//! - **severity**: Severity statistics
//! - **analyzer**: The shared [`TriggerAnalyzer`] seam used by every view
//!
//! Everything here is synchronous and pure over in-memory event logs.
//!
//! # Example
//!
//! ```rust
//! use pawtrack::analysis::trigger_frequencies;
//! use pawtrack::events::{TriggerCategory, TriggerEvent};
//!
//! let events = vec![
//!     TriggerEvent::new("rex", TriggerCategory::Food, 1),
//!     TriggerEvent::new("rex", TriggerCategory::Food, 2),
//!     TriggerEvent::new("rex", TriggerCategory::Pollen, 3),
//! ];
//!
//! let report = trigger_frequencies(&events, None);
//! assert_eq!(report.total, 3);
//! assert_eq!(report.entries[0].category, TriggerCategory::Food);
//! assert_eq!(report.entries[0].percentage, 67);
//! ```

pub mod analyzer;
pub mod frequency;
pub mod severity;
pub mod window;

pub use analyzer::{trigger_checklist, FrequencyAnalyzer, TriggerAnalyzer, TriggerBasis, TriggerSymptoms};
pub use frequency::{
    percentage, symptom_frequencies, trigger_frequencies, FrequencyEntry, FrequencyReport,
    TriggerSource,
};
pub use severity::SeveritySummary;
pub use window::{
    filter_window, in_window, Clock, FixedClock, SystemClock, TimeWindow, Timestamped,
    WindowError, WindowPreset, DAY_MILLIS,
};
