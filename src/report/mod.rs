//! Vet Report
//!
//! A printable summary an owner brings to a vet visit: who the dog is, which
//! triggers showed up over the chosen period, how bad the symptoms were and
//! which medications are running.
//!
//! [`VetReportBuilder`] produces the data; [`render`] turns it into text,
//! JSON or CSV.

mod render;

pub use render::{render, RenderError, ReportFormat};

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::analysis::{
    trigger_checklist, Clock, FrequencyEntry, FrequencyReport, SeveritySummary, TimeWindow,
    TriggerAnalyzer, WindowPreset,
};
use crate::events::{EventLog, Subject, SymptomCategory, TriggerCategory};
use crate::views::MedicationReminder;

/// Dog details printed at the top of the report
#[derive(Debug, Clone, Serialize)]
pub struct SubjectProfile {
    pub id: String,
    pub name: String,
    pub breed: Option<String>,
    pub age_years: Option<u32>,
    pub known_allergies: Vec<String>,
}

impl SubjectProfile {
    fn new(subject: &Subject, today: chrono::NaiveDate) -> Self {
        Self {
            id: subject.id.to_string(),
            name: subject.name.clone(),
            breed: subject.breed.clone(),
            age_years: subject.age_years(today),
            known_allergies: subject.known_allergies.clone(),
        }
    }
}

/// One line of the "triggers observed" checklist
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecklistItem {
    pub category: TriggerCategory,
    pub label: String,
    pub present: bool,
    pub count: usize,
}

/// One bar of the trigger chart, scaled to the largest count
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarRow {
    pub category: TriggerCategory,
    pub label: String,
    pub count: usize,
    pub percentage: u32,
    /// `count / max_count`, in `0.0..=1.0`
    pub fraction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymptomRow {
    pub timestamp: i64,
    pub symptom: SymptomCategory,
    pub label: String,
    pub severity: u8,
    pub triggers: Vec<TriggerCategory>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VetReport {
    pub profile: SubjectProfile,
    pub preset: WindowPreset,
    pub window: TimeWindow,
    pub generated_at: DateTime<Utc>,
    pub triggers: FrequencyReport<TriggerCategory>,
    pub checklist: Vec<ChecklistItem>,
    pub bars: Vec<BarRow>,
    pub severity: SeveritySummary,
    pub symptoms: FrequencyReport<SymptomCategory>,
    /// Symptom logs in the window, newest first
    pub symptom_log: Vec<SymptomRow>,
    pub medications: Vec<MedicationReminder>,
}

impl VetReport {
    /// No triggers and no symptoms in the window
    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty() && self.symptom_log.is_empty()
    }
}

/// Builds vet reports from the shared analyzer
#[derive(Clone)]
pub struct VetReportBuilder {
    analyzer: Arc<dyn TriggerAnalyzer>,
    clock: Arc<dyn Clock>,
}

impl VetReportBuilder {
    pub fn new(analyzer: Arc<dyn TriggerAnalyzer>, clock: Arc<dyn Clock>) -> Self {
        Self { analyzer, clock }
    }

    pub fn build(&self, log: &EventLog, preset: WindowPreset) -> VetReport {
        // Read the clock once so window and generation time agree
        let generated_at = self.clock.now();
        let window = preset.ending_at(generated_at.timestamp_millis());

        let triggers = self.analyzer.trigger_frequencies(log, Some(&window));
        let symptoms = self.analyzer.symptom_frequencies(log, Some(&window));

        let checklist = trigger_checklist(&triggers)
            .into_iter()
            .map(|(category, present)| ChecklistItem {
                category,
                label: category.to_string(),
                present,
                count: triggers.count_of(category),
            })
            .collect();

        let max = triggers.max_count();
        let bars = triggers
            .entries
            .iter()
            .map(|entry| bar_row(entry, max))
            .collect();

        let mut symptom_log: Vec<SymptomRow> = log
            .symptoms
            .iter()
            .filter(|s| window.contains(s.timestamp))
            .map(|s| SymptomRow {
                timestamp: s.timestamp,
                symptom: s.symptom,
                label: s.symptom.to_string(),
                severity: s.severity.value(),
                triggers: s.triggers.clone(),
                notes: s.notes.clone(),
            })
            .collect();
        symptom_log.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        let medications = log
            .active_medications(generated_at.date_naive())
            .into_iter()
            .map(|m| MedicationReminder::new(m, generated_at))
            .collect();

        tracing::info!(
            subject = %log.subject.id,
            window = %preset,
            triggers = triggers.total,
            symptoms = symptom_log.len(),
            "Generated vet report"
        );

        VetReport {
            profile: SubjectProfile::new(&log.subject, generated_at.date_naive()),
            preset,
            window,
            generated_at,
            checklist,
            bars,
            severity: SeveritySummary::from_symptoms(&log.symptoms, Some(&window)),
            symptoms,
            symptom_log,
            medications,
            triggers,
        }
    }
}

fn bar_row(entry: &FrequencyEntry<TriggerCategory>, max: usize) -> BarRow {
    let fraction = if max == 0 {
        0.0
    } else {
        entry.count as f64 / max as f64
    };
    BarRow {
        category: entry.category,
        label: entry.label.clone(),
        count: entry.count,
        percentage: entry.percentage,
        fraction,
    }
}
