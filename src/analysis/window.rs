//! Rolling time windows
//!
//! Reports look back over a fixed preset (7, 30 or 90 days) ending "now".
//! The boundaries are computed once, when a report is generated, and both
//! ends are inclusive: an event logged exactly at `start` or `end` counts.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::events::{SymptomEvent, TriggerEvent};

/// Milliseconds in one day
pub const DAY_MILLIS: i64 = 24 * 3600 * 1000;

/// Errors from building or parsing windows
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WindowError {
    #[error("Invalid window: start {start} is after end {end}")]
    InvalidRange { start: i64, end: i64 },

    #[error("Unsupported window: {0} (use 7d, 30d or 90d)")]
    UnsupportedPreset(String),
}

/// Anything carrying the moment it was logged
pub trait Timestamped {
    /// Unix timestamp in milliseconds
    fn timestamp(&self) -> i64;
}

impl Timestamped for TriggerEvent {
    fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

impl Timestamped for SymptomEvent {
    fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

impl<T: Timestamped + ?Sized> Timestamped for &T {
    fn timestamp(&self) -> i64 {
        (**self).timestamp()
    }
}

/// Closed time interval `[start, end]` in unix milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Start timestamp (inclusive)
    pub start: i64,
    /// End timestamp (inclusive)
    pub end: i64,
}

impl TimeWindow {
    /// Create a window, rejecting `start > end`
    pub fn new(start: i64, end: i64) -> Result<Self, WindowError> {
        if start <= end {
            Ok(Self { start, end })
        } else {
            Err(WindowError::InvalidRange { start, end })
        }
    }

    /// The `days` days ending at `end`
    pub fn ending_at(end: i64, days: i64) -> Self {
        Self {
            start: end - days * DAY_MILLIS,
            end,
        }
    }

    /// Inclusive on both boundaries
    pub fn contains(&self, timestamp: i64) -> bool {
        timestamp >= self.start && timestamp <= self.end
    }

    pub fn duration_millis(&self) -> i64 {
        self.end - self.start
    }
}

/// Keep only items inside the window, preserving input order
pub fn filter_window<'a, T: Timestamped>(items: &'a [T], window: &TimeWindow) -> Vec<&'a T> {
    items
        .iter()
        .filter(|item| window.contains(item.timestamp()))
        .collect()
}

/// `true` when no window is set or the timestamp falls inside it
pub fn in_window(window: Option<&TimeWindow>, timestamp: i64) -> bool {
    window.map_or(true, |w| w.contains(timestamp))
}

/// Supported report periods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum WindowPreset {
    Last7Days,
    #[default]
    Last30Days,
    Last90Days,
}

impl WindowPreset {
    pub fn all() -> &'static [WindowPreset] {
        &[
            WindowPreset::Last7Days,
            WindowPreset::Last30Days,
            WindowPreset::Last90Days,
        ]
    }

    pub fn days(&self) -> i64 {
        match self {
            WindowPreset::Last7Days => 7,
            WindowPreset::Last30Days => 30,
            WindowPreset::Last90Days => 90,
        }
    }

    /// Resolve against a fixed "now": `end = now`, `start = end - N days`
    pub fn ending_at(&self, now: i64) -> TimeWindow {
        TimeWindow::ending_at(now, self.days())
    }

    /// Resolve against a clock, reading it exactly once
    pub fn resolve(&self, clock: &dyn Clock) -> TimeWindow {
        self.ending_at(clock.now_millis())
    }

    pub fn description(&self) -> String {
        format!("last {} days", self.days())
    }
}

impl fmt::Display for WindowPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d", self.days())
    }
}

impl FromStr for WindowPreset {
    type Err = WindowError;

    /// Accepts "7d", "30", "90 days", "last-30-days", "last_7d"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let re = Regex::new(r"^(?:last[\s_-]*)?(\d+)\s*[_-]?\s*(?:d|days?)?$")
            .map_err(|_| WindowError::UnsupportedPreset(s.to_string()))?;

        let normalized = s.trim().to_lowercase();
        let days: i64 = re
            .captures(&normalized)
            .and_then(|caps| caps[1].parse().ok())
            .ok_or_else(|| WindowError::UnsupportedPreset(s.to_string()))?;

        WindowPreset::all()
            .iter()
            .copied()
            .find(|preset| preset.days() == days)
            .ok_or_else(|| WindowError::UnsupportedPreset(s.to_string()))
    }
}

impl TryFrom<String> for WindowPreset {
    type Error = WindowError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<WindowPreset> for String {
    fn from(preset: WindowPreset) -> String {
        preset.to_string()
    }
}

/// Source of "now", injectable so reports are reproducible in tests
pub trait Clock: Send + Sync {
    /// Current unix time in milliseconds
    fn now_millis(&self) -> i64;

    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.now_millis()).unwrap_or_default()
    }
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Clock frozen at a fixed instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl FixedClock {
    pub fn at(datetime: DateTime<Utc>) -> Self {
        Self(datetime.timestamp_millis())
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::TriggerCategory;

    #[test]
    fn test_window_contains_is_inclusive() {
        let window = TimeWindow::new(1000, 2000).unwrap();

        assert!(!window.contains(999));
        assert!(window.contains(1000));
        assert!(window.contains(1500));
        assert!(window.contains(2000));
        assert!(!window.contains(2001));
    }

    #[test]
    fn test_window_rejects_reversed_range() {
        assert_eq!(
            TimeWindow::new(2000, 1000),
            Err(WindowError::InvalidRange {
                start: 2000,
                end: 1000
            })
        );
        // Zero-length window is allowed and contains exactly one instant
        let point = TimeWindow::new(5, 5).unwrap();
        assert!(point.contains(5));
    }

    #[test]
    fn test_preset_resolves_against_fixed_now() {
        let now = 100 * DAY_MILLIS;
        let clock = FixedClock(now);

        let window = WindowPreset::Last7Days.resolve(&clock);
        assert_eq!(window.end, now);
        assert_eq!(window.start, now - 7 * DAY_MILLIS);

        let window = WindowPreset::Last90Days.ending_at(now);
        assert_eq!(window.duration_millis(), 90 * DAY_MILLIS);
    }

    #[test]
    fn test_filter_keeps_boundary_events() {
        let now = 50 * DAY_MILLIS;
        let window = WindowPreset::Last7Days.ending_at(now);

        let events = vec![
            TriggerEvent::new("rex", TriggerCategory::Food, window.start - 1),
            TriggerEvent::new("rex", TriggerCategory::Pollen, window.start),
            TriggerEvent::new("rex", TriggerCategory::Weather, now - DAY_MILLIS),
            TriggerEvent::new("rex", TriggerCategory::Unknown, window.end),
            TriggerEvent::new("rex", TriggerCategory::Food, window.end + 1),
        ];

        let kept: Vec<TriggerCategory> = filter_window(&events, &window)
            .iter()
            .map(|e| e.category)
            .collect();

        assert_eq!(
            kept,
            vec![
                TriggerCategory::Pollen,
                TriggerCategory::Weather,
                TriggerCategory::Unknown
            ]
        );
    }

    #[test]
    fn test_preset_parsing() {
        assert_eq!("7d".parse::<WindowPreset>().unwrap(), WindowPreset::Last7Days);
        assert_eq!("30".parse::<WindowPreset>().unwrap(), WindowPreset::Last30Days);
        assert_eq!(
            "last-90-days".parse::<WindowPreset>().unwrap(),
            WindowPreset::Last90Days
        );
        assert_eq!(
            "Last 30 Days".parse::<WindowPreset>().unwrap(),
            WindowPreset::Last30Days
        );
        assert!(matches!(
            "14d".parse::<WindowPreset>(),
            Err(WindowError::UnsupportedPreset(_))
        ));
        assert!("forever".parse::<WindowPreset>().is_err());
    }

    #[test]
    fn test_preset_serde_uses_short_form() {
        let json = serde_json::to_string(&WindowPreset::Last90Days).unwrap();
        assert_eq!(json, "\"90d\"");
        let parsed: WindowPreset = serde_json::from_str("\"7d\"").unwrap();
        assert_eq!(parsed, WindowPreset::Last7Days);
    }
}
