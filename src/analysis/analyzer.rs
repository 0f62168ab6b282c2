//! Shared analyzer seam
//!
//! The dashboard, the trigger analysis view and the vet report all hold an
//! `Arc<dyn TriggerAnalyzer>` instead of counting on their own, so the three
//! can never disagree about what a trigger count means.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::analysis::frequency::{symptom_frequencies, FrequencyReport, TriggerSource};
use crate::analysis::window::{in_window, TimeWindow, Timestamped};
use crate::events::{Category, EventLog, SymptomCategory, TriggerCategory};

/// Which records feed trigger counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerBasis {
    /// Only dedicated trigger events
    TriggerLog,
    /// Only trigger tags embedded in symptom logs
    SymptomTags,
    /// Both, each tag counted once
    #[default]
    Combined,
}

impl fmt::Display for TriggerBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerBasis::TriggerLog => write!(f, "trigger_log"),
            TriggerBasis::SymptomTags => write!(f, "symptom_tags"),
            TriggerBasis::Combined => write!(f, "combined"),
        }
    }
}

impl FromStr for TriggerBasis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "trigger_log" | "triggers" => Ok(TriggerBasis::TriggerLog),
            "symptom_tags" | "symptoms" => Ok(TriggerBasis::SymptomTags),
            "combined" | "both" => Ok(TriggerBasis::Combined),
            other => Err(format!(
                "Unknown trigger basis: {} (use trigger_log, symptom_tags or combined)",
                other
            )),
        }
    }
}

/// Symptoms seen alongside one trigger
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriggerSymptoms {
    pub trigger: TriggerCategory,
    pub label: String,
    pub symptoms: FrequencyReport<SymptomCategory>,
}

/// Aggregations every presentation layer shares
pub trait TriggerAnalyzer: Send + Sync {
    /// Ranked trigger frequencies for one subject
    fn trigger_frequencies(
        &self,
        log: &EventLog,
        window: Option<&TimeWindow>,
    ) -> FrequencyReport<TriggerCategory>;

    /// Ranked symptom frequencies, one count per symptom log
    fn symptom_frequencies(
        &self,
        log: &EventLog,
        window: Option<&TimeWindow>,
    ) -> FrequencyReport<SymptomCategory>;

    /// For each trigger tagged on a symptom log, the symptoms logged with it.
    /// Triggers in rank order; triggers never tagged on a symptom are omitted.
    fn co_occurrence(&self, log: &EventLog, window: Option<&TimeWindow>) -> Vec<TriggerSymptoms>;
}

/// Default analyzer over an [`EventLog`]
#[derive(Debug, Clone, Copy, Default)]
pub struct FrequencyAnalyzer {
    basis: TriggerBasis,
}

impl FrequencyAnalyzer {
    pub fn new(basis: TriggerBasis) -> Self {
        Self { basis }
    }

    fn tag_stream<'a>(
        &self,
        log: &'a EventLog,
        window: Option<&'a TimeWindow>,
    ) -> Box<dyn Iterator<Item = &'a [TriggerCategory]> + 'a> {
        let triggers = log
            .triggers
            .iter()
            .filter(move |e| in_window(window, e.timestamp()))
            .map(|e| e.trigger_tags());
        let symptoms = log
            .symptoms
            .iter()
            .filter(move |s| in_window(window, s.timestamp()))
            .map(|s| s.trigger_tags());

        match self.basis {
            TriggerBasis::TriggerLog => Box::new(triggers),
            TriggerBasis::SymptomTags => Box::new(symptoms),
            TriggerBasis::Combined => Box::new(triggers.chain(symptoms)),
        }
    }
}

impl TriggerAnalyzer for FrequencyAnalyzer {
    fn trigger_frequencies(
        &self,
        log: &EventLog,
        window: Option<&TimeWindow>,
    ) -> FrequencyReport<TriggerCategory> {
        FrequencyReport::tally(
            self.tag_stream(log, window)
                .map(|tags| tags.iter().copied()),
        )
    }

    fn symptom_frequencies(
        &self,
        log: &EventLog,
        window: Option<&TimeWindow>,
    ) -> FrequencyReport<SymptomCategory> {
        symptom_frequencies(&log.symptoms, window)
    }

    fn co_occurrence(&self, log: &EventLog, window: Option<&TimeWindow>) -> Vec<TriggerSymptoms> {
        let mut by_trigger: BTreeMap<TriggerCategory, BTreeMap<SymptomCategory, usize>> =
            BTreeMap::new();

        for symptom in log
            .symptoms
            .iter()
            .filter(|s| in_window(window, s.timestamp))
        {
            for trigger in &symptom.triggers {
                *by_trigger
                    .entry(*trigger)
                    .or_default()
                    .entry(symptom.symptom)
                    .or_insert(0) += 1;
            }
        }

        let mut pairs: Vec<TriggerSymptoms> = by_trigger
            .into_iter()
            .map(|(trigger, counts)| TriggerSymptoms {
                trigger,
                label: trigger.to_string(),
                symptoms: FrequencyReport::from_counts(counts),
            })
            .collect();

        // Same ranking rule as the frequency report: count desc, then declaration order
        pairs.sort_by(|a, b| b.symptoms.total.cmp(&a.symptoms.total));
        pairs
    }
}

/// Every trigger category alongside whether it appears in the report
pub fn trigger_checklist(report: &FrequencyReport<TriggerCategory>) -> Vec<(TriggerCategory, bool)> {
    TriggerCategory::all()
        .iter()
        .map(|&c| (c, report.count_of(c) > 0))
        .collect()
}
