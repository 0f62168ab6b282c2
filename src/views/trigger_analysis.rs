//! Trigger analysis page data: bar series, ranking and co-occurrence

use serde::Serialize;
use std::sync::Arc;

use crate::analysis::{
    Clock, FrequencyEntry, TimeWindow, TriggerAnalyzer, TriggerSymptoms, WindowPreset,
};
use crate::events::{EventLog, SubjectId, TriggerCategory};

#[derive(Debug, Clone, Serialize)]
pub struct TriggerAnalysis {
    pub subject_id: SubjectId,
    pub preset: WindowPreset,
    pub window: TimeWindow,
    pub total: usize,
    /// Categories with at least one occurrence, most frequent first
    pub ranked: Vec<FrequencyEntry<TriggerCategory>>,
    /// One bar per known category in declaration order, zeros included
    pub bars: Vec<FrequencyEntry<TriggerCategory>>,
    pub co_occurrence: Vec<TriggerSymptoms>,
}

impl TriggerAnalysis {
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

#[derive(Clone)]
pub struct TriggerAnalysisBuilder {
    analyzer: Arc<dyn TriggerAnalyzer>,
    clock: Arc<dyn Clock>,
}

impl TriggerAnalysisBuilder {
    pub fn new(analyzer: Arc<dyn TriggerAnalyzer>, clock: Arc<dyn Clock>) -> Self {
        Self { analyzer, clock }
    }

    pub fn build(&self, log: &EventLog, preset: WindowPreset) -> TriggerAnalysis {
        let window = preset.resolve(self.clock.as_ref());
        let report = self.analyzer.trigger_frequencies(log, Some(&window));

        TriggerAnalysis {
            subject_id: log.subject.id.clone(),
            preset,
            window,
            total: report.total,
            bars: report.with_all_categories(),
            co_occurrence: self.analyzer.co_occurrence(log, Some(&window)),
            ranked: report.entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{FixedClock, FrequencyAnalyzer, TriggerBasis, DAY_MILLIS};
    use crate::events::{Category, Severity, Subject, SymptomCategory, SymptomEvent, TriggerEvent};

    #[test]
    fn test_bars_cover_every_category() {
        use TriggerCategory::*;
        let now = 10 * DAY_MILLIS;
        let mut log = EventLog::new(Subject::new("rex", "Rex"));
        log.add_trigger(TriggerEvent::new("rex", HouseholdProduct, now));
        log.add_symptom(
            SymptomEvent::new("rex", SymptomCategory::Sneezing, Severity::new(2).unwrap(), now - 1)
                .trigger(HouseholdProduct),
        );

        let builder = TriggerAnalysisBuilder::new(
            Arc::new(FrequencyAnalyzer::default()),
            Arc::new(FixedClock(now)),
        );
        let analysis = builder.build(&log, WindowPreset::Last7Days);

        assert_eq!(analysis.total, 2);
        assert_eq!(analysis.bars.len(), TriggerCategory::all().len());
        assert_eq!(analysis.bars[4].category, HouseholdProduct);
        assert_eq!(analysis.bars[4].count, 2);
        assert!(analysis.bars.iter().filter(|b| b.count == 0).count() == 6);
        assert_eq!(analysis.ranked.len(), 1);
        assert_eq!(analysis.co_occurrence.len(), 1);
        assert_eq!(analysis.co_occurrence[0].trigger, HouseholdProduct);
    }

    #[test]
    fn test_uses_injected_analyzer() {
        use TriggerCategory::*;
        let now = 10 * DAY_MILLIS;
        let mut log = EventLog::new(Subject::new("rex", "Rex"));
        log.add_trigger(TriggerEvent::new("rex", Food, now));
        log.add_symptom(
            SymptomEvent::new("rex", SymptomCategory::Hives, Severity::new(1).unwrap(), now)
                .trigger(Pollen),
        );

        let builder = TriggerAnalysisBuilder::new(
            Arc::new(FrequencyAnalyzer::new(TriggerBasis::SymptomTags)),
            Arc::new(FixedClock(now)),
        );
        let analysis = builder.build(&log, WindowPreset::Last7Days);

        assert_eq!(analysis.total, 1);
        assert_eq!(analysis.ranked[0].category, Pollen);
    }

    #[test]
    fn test_empty_analysis() {
        let log = EventLog::new(Subject::new("rex", "Rex"));
        let builder = TriggerAnalysisBuilder::new(
            Arc::new(FrequencyAnalyzer::default()),
            Arc::new(FixedClock(DAY_MILLIS)),
        );
        let analysis = builder.build(&log, WindowPreset::Last90Days);

        assert!(analysis.is_empty());
        assert!(analysis.ranked.is_empty());
        assert!(analysis.bars.iter().all(|b| b.count == 0 && b.percentage == 0));
    }
}
