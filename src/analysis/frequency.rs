//! Frequency Analyzer
//!
//! Turns a sequence of tagged events into a ranked frequency report.
//!
//! Counting is per tag, not per event: a symptom log tagged `[Food, Pollen]`
//! adds one to Food and one to Pollen. This keeps a report built from
//! symptom tags equal to one built from dedicated trigger events when both
//! describe the same occurrences.
//!
//! Ranking is by count descending, then by the category's declaration order,
//! so output is identical across runs. Percentages are rounded half-up per
//! entry and are not adjusted to sum to 100.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::analysis::window::{in_window, TimeWindow, Timestamped};
use crate::events::{Category, SymptomCategory, SymptomEvent, TriggerCategory, TriggerEvent};

/// Events that carry zero or more trigger tags
pub trait TriggerSource: Timestamped {
    fn trigger_tags(&self) -> &[TriggerCategory];
}

impl TriggerSource for TriggerEvent {
    fn trigger_tags(&self) -> &[TriggerCategory] {
        std::slice::from_ref(&self.category)
    }
}

impl TriggerSource for SymptomEvent {
    fn trigger_tags(&self) -> &[TriggerCategory] {
        &self.triggers
    }
}

impl<T: TriggerSource + ?Sized> TriggerSource for &T {
    fn trigger_tags(&self) -> &[TriggerCategory] {
        (**self).trigger_tags()
    }
}

/// One ranked category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrequencyEntry<C> {
    pub category: C,
    /// Display label for charts
    pub label: String,
    pub count: usize,
    /// `round(count / total * 100)`, half-up
    pub percentage: u32,
}

/// Ranked frequency distribution over a category set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrequencyReport<C> {
    /// Categories with at least one occurrence, most frequent first
    pub entries: Vec<FrequencyEntry<C>>,
    /// Sum of all counts
    pub total: usize,
}

impl<C: Category> Default for FrequencyReport<C> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<C: Category> FrequencyReport<C> {
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
            total: 0,
        }
    }

    /// Count every tag of every observation
    ///
    /// Observations with no tags contribute nothing.
    pub fn tally<I, T>(observations: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: IntoIterator<Item = C>,
    {
        let mut counts: BTreeMap<C, usize> = BTreeMap::new();
        let mut untagged = 0usize;

        for tags in observations {
            let mut tagged = false;
            for category in tags {
                *counts.entry(category).or_insert(0) += 1;
                tagged = true;
            }
            if !tagged {
                untagged += 1;
            }
        }

        if untagged > 0 {
            tracing::debug!(untagged, "Skipped observations without a category");
        }

        Self::from_counts(counts)
    }

    /// Rank pre-computed counts. Zero counts are dropped.
    pub fn from_counts(counts: BTreeMap<C, usize>) -> Self {
        let total: usize = counts.values().sum();

        // BTreeMap iterates in declaration order and sort_by is stable,
        // so equal counts keep that order.
        let mut entries: Vec<FrequencyEntry<C>> = counts
            .into_iter()
            .filter(|(_, count)| *count > 0)
            .map(|(category, count)| FrequencyEntry {
                category,
                label: category.to_string(),
                count,
                percentage: percentage(count, total),
            })
            .collect();

        entries.sort_by(|a, b| b.count.cmp(&a.count));

        Self { entries, total }
    }

    /// True when nothing was counted; callers show a "no data yet" state
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Most frequent category
    pub fn top(&self) -> Option<&FrequencyEntry<C>> {
        self.entries.first()
    }

    /// Highest count, 0 when empty; used to scale bar charts
    pub fn max_count(&self) -> usize {
        self.entries.first().map(|e| e.count).unwrap_or(0)
    }

    pub fn count_of(&self, category: C) -> usize {
        self.entry(category).map(|e| e.count).unwrap_or(0)
    }

    pub fn percentage_of(&self, category: C) -> u32 {
        self.entry(category).map(|e| e.percentage).unwrap_or(0)
    }

    fn entry(&self, category: C) -> Option<&FrequencyEntry<C>> {
        self.entries.iter().find(|e| e.category == category)
    }

    /// Every known category in declaration order, zeros included
    pub fn with_all_categories(&self) -> Vec<FrequencyEntry<C>> {
        C::all()
            .iter()
            .map(|&category| FrequencyEntry {
                category,
                label: category.to_string(),
                count: self.count_of(category),
                percentage: self.percentage_of(category),
            })
            .collect()
    }

    /// Categories seen at least once, in rank order
    pub fn present(&self) -> Vec<C> {
        self.entries.iter().map(|e| e.category).collect()
    }

    /// Categories never seen, in declaration order
    pub fn absent(&self) -> Vec<C> {
        C::all()
            .iter()
            .copied()
            .filter(|c| self.count_of(*c) == 0)
            .collect()
    }
}

/// Half-up rounded share of `count` in `total`, 0 when `total` is 0
pub fn percentage(count: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let count = count as u64;
    let total = total as u64;
    // floor(count * 100 / total + 0.5) without floating point
    ((count * 200 + total) / (total * 2)) as u32
}

/// Trigger frequencies over any trigger-bearing events, optionally windowed
pub fn trigger_frequencies<E: TriggerSource>(
    events: &[E],
    window: Option<&TimeWindow>,
) -> FrequencyReport<TriggerCategory> {
    FrequencyReport::tally(
        events
            .iter()
            .filter(|e| in_window(window, e.timestamp()))
            .map(|e| e.trigger_tags().iter().copied()),
    )
}

/// Symptom frequencies, one count per symptom log
pub fn symptom_frequencies(
    symptoms: &[SymptomEvent],
    window: Option<&TimeWindow>,
) -> FrequencyReport<SymptomCategory> {
    FrequencyReport::tally(
        symptoms
            .iter()
            .filter(|s| in_window(window, s.timestamp))
            .map(|s| std::iter::once(s.symptom)),
    )
}
