//! Severity statistics over symptom logs

use serde::Serialize;

use crate::analysis::window::{in_window, TimeWindow};
use crate::events::{Severity, SymptomEvent};

/// How bad symptoms were over a period
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeveritySummary {
    /// Number of symptom logs counted
    pub count: usize,
    /// Mean severity rounded to one decimal, absent when nothing was logged
    pub average: Option<f64>,
    pub max: Option<Severity>,
    /// Logs per level, index 0 is severity 1
    pub by_level: [usize; 5],
}

impl SeveritySummary {
    pub fn from_symptoms(symptoms: &[SymptomEvent], window: Option<&TimeWindow>) -> Self {
        let mut by_level = [0usize; 5];
        let mut sum = 0u64;
        let mut max: Option<Severity> = None;
        let mut count = 0usize;

        for symptom in symptoms.iter().filter(|s| in_window(window, s.timestamp)) {
            let level = symptom.severity.value();
            by_level[usize::from(level - 1)] += 1;
            sum += u64::from(level);
            max = max.max(Some(symptom.severity));
            count += 1;
        }

        let average = if count == 0 {
            None
        } else {
            // Round to 1 decimal
            Some((sum as f64 / count as f64 * 10.0).round() / 10.0)
        };

        Self {
            count,
            average,
            max,
            by_level,
        }
    }

    /// Logs at a given level
    pub fn count_at(&self, severity: Severity) -> usize {
        self.by_level[usize::from(severity.value() - 1)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::SymptomCategory;

    fn log(level: u8, timestamp: i64) -> SymptomEvent {
        SymptomEvent::new(
            "rex",
            SymptomCategory::Redness,
            Severity::new(level).unwrap(),
            timestamp,
        )
    }

    #[test]
    fn test_empty_summary() {
        let summary = SeveritySummary::from_symptoms(&[], None);
        assert_eq!(summary.count, 0);
        assert_eq!(summary.average, None);
        assert_eq!(summary.max, None);
        assert_eq!(summary.by_level, [0; 5]);
    }

    #[test]
    fn test_average_and_max() {
        let symptoms = vec![log(1, 1), log(2, 2), log(4, 3)];
        let summary = SeveritySummary::from_symptoms(&symptoms, None);

        assert_eq!(summary.count, 3);
        assert_eq!(summary.average, Some(2.3));
        assert_eq!(summary.max, Some(Severity::new(4).unwrap()));
        assert_eq!(summary.by_level, [1, 1, 0, 1, 0]);
        assert_eq!(summary.count_at(Severity::new(4).unwrap()), 1);
    }

    #[test]
    fn test_window_applies() {
        let symptoms = vec![log(5, 1), log(2, 10), log(3, 20)];
        let window = TimeWindow::new(10, 20).unwrap();
        let summary = SeveritySummary::from_symptoms(&symptoms, Some(&window));

        assert_eq!(summary.count, 2);
        assert_eq!(summary.average, Some(2.5));
        assert_eq!(summary.max, Some(Severity::new(3).unwrap()));
    }
}
