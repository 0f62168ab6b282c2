//! Dashboard summary for one dog

use serde::Serialize;
use std::sync::Arc;

use crate::analysis::{
    Clock, FrequencyEntry, FrequencyReport, SeveritySummary, TimeWindow, TriggerAnalyzer,
    WindowPreset, DAY_MILLIS,
};
use crate::events::{EventLog, SubjectId, SymptomCategory, TriggerCategory};
use crate::views::MedicationReminder;

/// Everything the dashboard shows at a glance
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub subject_id: SubjectId,
    pub subject_name: String,
    pub preset: WindowPreset,
    pub window: TimeWindow,
    /// False when nothing was logged in the window; render an empty state
    pub has_data: bool,
    /// Symptom logs in the window
    pub symptom_total: usize,
    /// Trigger occurrences in the window, one per tag
    pub trigger_total: usize,
    pub top_trigger: Option<FrequencyEntry<TriggerCategory>>,
    /// Pie chart slices, most frequent first
    pub trigger_slices: Vec<FrequencyEntry<TriggerCategory>>,
    pub symptom_breakdown: FrequencyReport<SymptomCategory>,
    pub severity: SeveritySummary,
    /// Most recent symptom up to now, regardless of window
    pub last_symptom_at: Option<i64>,
    pub days_since_last_symptom: Option<i64>,
    pub medications: Vec<MedicationReminder>,
}

/// Builds dashboards from the shared analyzer
#[derive(Clone)]
pub struct DashboardBuilder {
    analyzer: Arc<dyn TriggerAnalyzer>,
    clock: Arc<dyn Clock>,
}

impl DashboardBuilder {
    pub fn new(analyzer: Arc<dyn TriggerAnalyzer>, clock: Arc<dyn Clock>) -> Self {
        Self { analyzer, clock }
    }

    pub fn build(&self, log: &EventLog, preset: WindowPreset) -> Dashboard {
        let now = self.clock.now();
        let window = preset.ending_at(now.timestamp_millis());

        let triggers = self.analyzer.trigger_frequencies(log, Some(&window));
        let symptoms = self.analyzer.symptom_frequencies(log, Some(&window));
        let severity = SeveritySummary::from_symptoms(&log.symptoms, Some(&window));

        let last_symptom_at = log.last_symptom_at(window.end);
        let days_since_last_symptom = last_symptom_at.map(|at| (window.end - at) / DAY_MILLIS);

        let medications = log
            .active_medications(now.date_naive())
            .into_iter()
            .map(|m| MedicationReminder::new(m, now))
            .collect();

        tracing::debug!(
            subject = %log.subject.id,
            window = %preset,
            triggers = triggers.total,
            symptoms = symptoms.total,
            "Built dashboard"
        );

        Dashboard {
            subject_id: log.subject.id.clone(),
            subject_name: log.subject.name.clone(),
            preset,
            window,
            has_data: !triggers.is_empty() || !symptoms.is_empty(),
            symptom_total: symptoms.total,
            trigger_total: triggers.total,
            top_trigger: triggers.top().cloned(),
            trigger_slices: triggers.entries,
            symptom_breakdown: symptoms,
            severity,
            last_symptom_at,
            days_since_last_symptom,
            medications,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{FixedClock, FrequencyAnalyzer};
    use crate::events::{Medication, Severity, Subject, SymptomEvent, TriggerEvent};
    use chrono::{NaiveDate, TimeZone, Utc};

    fn builder(now: i64) -> DashboardBuilder {
        DashboardBuilder::new(
            Arc::new(FrequencyAnalyzer::default()),
            Arc::new(FixedClock(now)),
        )
    }

    #[test]
    fn test_empty_dashboard() {
        let log = EventLog::new(Subject::new("rex", "Rex"));
        let dashboard = builder(100 * DAY_MILLIS).build(&log, WindowPreset::Last30Days);

        assert!(!dashboard.has_data);
        assert_eq!(dashboard.trigger_total, 0);
        assert!(dashboard.trigger_slices.is_empty());
        assert!(dashboard.top_trigger.is_none());
        assert_eq!(dashboard.last_symptom_at, None);
        assert_eq!(dashboard.days_since_last_symptom, None);
    }

    #[test]
    fn test_dashboard_counts_window_only() {
        use TriggerCategory::*;
        let now = 100 * DAY_MILLIS;
        let mut log = EventLog::new(Subject::new("rex", "Rex"));
        log.add_trigger(TriggerEvent::new("rex", Pollen, now - 40 * DAY_MILLIS));
        log.add_trigger(TriggerEvent::new("rex", Food, now - 2 * DAY_MILLIS));
        log.add_symptom(
            SymptomEvent::new(
                "rex",
                SymptomCategory::Itching,
                Severity::new(4).unwrap(),
                now - 3 * DAY_MILLIS,
            )
            .triggers([Food, Weather]),
        );

        let dashboard = builder(now).build(&log, WindowPreset::Last30Days);

        assert!(dashboard.has_data);
        assert_eq!(dashboard.trigger_total, 3);
        assert_eq!(dashboard.symptom_total, 1);
        assert_eq!(dashboard.top_trigger.as_ref().map(|e| e.category), Some(Food));
        assert_eq!(dashboard.trigger_slices[0].percentage, 67);
        assert_eq!(dashboard.severity.max, Some(Severity::new(4).unwrap()));
        assert_eq!(dashboard.days_since_last_symptom, Some(3));
    }

    #[test]
    fn test_future_symptom_does_not_hide_last_symptom() {
        let now = 100 * DAY_MILLIS;
        let mut log = EventLog::new(Subject::new("rex", "Rex"));
        for at in [now - 5 * DAY_MILLIS, now + 2 * DAY_MILLIS] {
            log.add_symptom(SymptomEvent::new(
                "rex",
                SymptomCategory::Redness,
                Severity::new(2).unwrap(),
                at,
            ));
        }

        let dashboard = builder(now).build(&log, WindowPreset::Last7Days);

        assert_eq!(dashboard.last_symptom_at, Some(now - 5 * DAY_MILLIS));
        assert_eq!(dashboard.days_since_last_symptom, Some(5));
    }

    #[test]
    fn test_dashboard_lists_active_medications() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 6, 0, 0).unwrap();
        let mut log = EventLog::new(Subject::new("rex", "Rex"));
        log.add_medication(
            Medication::new("rex", "Apoquel", "16mg", NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
                .reminder("07:30".parse().unwrap()),
        );
        log.add_medication(
            Medication::new("rex", "Old cream", "thin layer", NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
                .until(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()),
        );

        let dashboard = builder(now.timestamp_millis()).build(&log, WindowPreset::Last7Days);

        assert_eq!(dashboard.medications.len(), 1);
        assert_eq!(dashboard.medications[0].name, "Apoquel");
        assert_eq!(
            dashboard.medications[0].next_reminder,
            Some(Utc.with_ymd_and_hms(2024, 3, 10, 7, 30, 0).unwrap().timestamp_millis())
        );
    }
}
