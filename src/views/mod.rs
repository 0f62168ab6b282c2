//! Presentation data for the dashboard and the trigger analysis page
//!
//! Views never count anything themselves. They receive the shared
//! [`TriggerAnalyzer`](crate::analysis::TriggerAnalyzer) and a
//! [`Clock`](crate::analysis::Clock), and shape the results for charts.

pub mod dashboard;
pub mod trigger_analysis;

pub use dashboard::{Dashboard, DashboardBuilder};
pub use trigger_analysis::{TriggerAnalysis, TriggerAnalysisBuilder};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::events::Medication;

/// An active medication and when it is next due
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MedicationReminder {
    pub id: Uuid,
    pub name: String,
    pub dosage: String,
    pub reminder_times: Vec<String>,
    /// Unix millis of the next reminder, if any remain in the course
    pub next_reminder: Option<i64>,
}

impl MedicationReminder {
    pub fn new(medication: &Medication, now: DateTime<Utc>) -> Self {
        Self {
            id: medication.id,
            name: medication.name.clone(),
            dosage: medication.dosage.clone(),
            reminder_times: medication
                .reminder_times
                .iter()
                .map(|t| t.to_string())
                .collect(),
            next_reminder: medication
                .next_reminder_after(now)
                .map(|at| at.timestamp_millis()),
        }
    }
}
