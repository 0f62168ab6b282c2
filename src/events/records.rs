//! Tracked records: subjects, trigger and symptom events, medications
//!
//! Events are immutable once created. The only mutation an owner can make
//! is deleting an event, which [`EventLog::remove_event`] handles.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::events::error::{EventError, EventResult};
use crate::events::types::{deserialize_trigger_tags, Severity, SymptomCategory, TriggerCategory};

/// Identifier of a tracked dog
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct SubjectId(String);

impl SubjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SubjectId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// The dog whose health events are tracked
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    #[serde(default)]
    pub breed: Option<String>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    /// Allergies already confirmed by a vet, free text
    #[serde(default)]
    pub known_allergies: Vec<String>,
}

impl Subject {
    pub fn new(id: impl Into<SubjectId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            breed: None,
            birth_date: None,
            known_allergies: Vec::new(),
        }
    }

    /// Builder: set breed
    pub fn breed(mut self, breed: impl Into<String>) -> Self {
        self.breed = Some(breed.into());
        self
    }

    /// Builder: set birth date
    pub fn born(mut self, date: NaiveDate) -> Self {
        self.birth_date = Some(date);
        self
    }

    /// Builder: add a known allergy
    pub fn allergy(mut self, allergy: impl Into<String>) -> Self {
        self.known_allergies.push(allergy.into());
        self
    }

    pub fn validate(&self) -> EventResult<()> {
        if self.id.is_empty() {
            return Err(EventError::EmptyField("Subject id"));
        }
        if self.name.trim().is_empty() {
            return Err(EventError::EmptyField("Subject name"));
        }
        Ok(())
    }

    /// Age in whole years on the given date
    pub fn age_years(&self, on: NaiveDate) -> Option<u32> {
        self.birth_date.and_then(|born| on.years_since(born))
    }
}

impl From<String> for SubjectId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One observed exposure to a suspected trigger
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TriggerEvent {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default)]
    pub subject_id: SubjectId,
    pub category: TriggerCategory,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
}

impl TriggerEvent {
    pub fn new(subject_id: impl Into<SubjectId>, category: TriggerCategory, timestamp: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject_id: subject_id.into(),
            category,
            location: None,
            notes: None,
            timestamp,
        }
    }

    /// Builder: where the exposure happened
    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Builder: free-text notes
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// One observed symptom, optionally tagged with suspected triggers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SymptomEvent {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default)]
    pub subject_id: SubjectId,
    pub symptom: SymptomCategory,
    pub severity: Severity,
    /// Distinct trigger tags; unrecognized tags are dropped on load
    #[serde(default, deserialize_with = "deserialize_trigger_tags")]
    pub triggers: Vec<TriggerCategory>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Reference to an attached photo (path or URL)
    #[serde(default)]
    pub photo: Option<String>,
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
}

impl SymptomEvent {
    pub fn new(
        subject_id: impl Into<SubjectId>,
        symptom: SymptomCategory,
        severity: Severity,
        timestamp: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject_id: subject_id.into(),
            symptom,
            severity,
            triggers: Vec::new(),
            notes: None,
            photo: None,
            timestamp,
        }
    }

    /// Builder: tag a suspected trigger (duplicates are ignored)
    pub fn trigger(mut self, category: TriggerCategory) -> Self {
        if !self.triggers.contains(&category) {
            self.triggers.push(category);
        }
        self
    }

    /// Builder: tag several suspected triggers
    pub fn triggers(self, categories: impl IntoIterator<Item = TriggerCategory>) -> Self {
        categories.into_iter().fold(self, |event, c| event.trigger(c))
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn photo(mut self, photo: impl Into<String>) -> Self {
        self.photo = Some(photo.into());
        self
    }
}

/// Time of day for a medication reminder, written as "HH:MM"
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct ReminderTime(NaiveTime);

impl ReminderTime {
    pub fn time(&self) -> NaiveTime {
        self.0
    }
}

impl std::str::FromStr for ReminderTime {
    type Err = EventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveTime::parse_from_str(s.trim(), "%H:%M")
            .map(ReminderTime)
            .map_err(|_| EventError::InvalidReminderTime(s.to_string()))
    }
}

impl TryFrom<String> for ReminderTime {
    type Error = EventError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ReminderTime> for String {
    fn from(time: ReminderTime) -> String {
        time.to_string()
    }
}

impl fmt::Display for ReminderTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

/// A medication course with daily reminder times (UTC)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Medication {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default)]
    pub subject_id: SubjectId,
    pub name: String,
    #[serde(default)]
    pub dosage: String,
    #[serde(default)]
    pub reminder_times: Vec<ReminderTime>,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

impl Medication {
    pub fn new(
        subject_id: impl Into<SubjectId>,
        name: impl Into<String>,
        dosage: impl Into<String>,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject_id: subject_id.into(),
            name: name.into(),
            dosage: dosage.into(),
            reminder_times: Vec::new(),
            start_date,
            end_date: None,
        }
    }

    /// Builder: add a daily reminder
    pub fn reminder(mut self, time: ReminderTime) -> Self {
        self.reminder_times.push(time);
        self.reminder_times.sort();
        self.reminder_times.dedup();
        self
    }

    /// Builder: last day of the course
    pub fn until(mut self, end: NaiveDate) -> Self {
        self.end_date = Some(end);
        self
    }

    pub fn validate(&self) -> EventResult<()> {
        if self.name.trim().is_empty() {
            return Err(EventError::EmptyField("Medication name"));
        }
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(EventError::InvalidMedicationDates {
                    start: self.start_date.to_string(),
                    end: end.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Whether the course runs on the given day (both ends inclusive)
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        date >= self.start_date && self.end_date.map_or(true, |end| date <= end)
    }

    /// Next reminder strictly after `now`, within the course dates
    pub fn next_reminder_after(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        if self.reminder_times.is_empty() {
            return None;
        }

        let today = now.date_naive();
        let first_day = today.max(self.start_date);

        // Two days is enough: if nothing is left today, tomorrow's first slot wins
        (0..2)
            .map(|offset| first_day + Duration::days(offset))
            .filter(|day| self.is_active_on(*day))
            .flat_map(|day| {
                self.reminder_times
                    .iter()
                    .map(move |t| day.and_time(t.time()).and_utc())
            })
            .find(|at| *at > now)
    }
}

/// Everything recorded for one subject: the snapshot handed to analysis
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventLog {
    pub subject: Subject,
    #[serde(default)]
    pub triggers: Vec<TriggerEvent>,
    #[serde(default)]
    pub symptoms: Vec<SymptomEvent>,
    #[serde(default)]
    pub medications: Vec<Medication>,
}

impl EventLog {
    pub fn new(subject: Subject) -> Self {
        Self {
            subject,
            triggers: Vec::new(),
            symptoms: Vec::new(),
            medications: Vec::new(),
        }
    }

    pub fn subject_id(&self) -> &SubjectId {
        &self.subject.id
    }

    /// Append a trigger event, claiming it for this subject
    pub fn add_trigger(&mut self, mut event: TriggerEvent) -> &TriggerEvent {
        event.subject_id = self.subject.id.clone();
        self.triggers.push(event);
        &self.triggers[self.triggers.len() - 1]
    }

    /// Append a symptom event, claiming it for this subject
    pub fn add_symptom(&mut self, mut event: SymptomEvent) -> &SymptomEvent {
        event.subject_id = self.subject.id.clone();
        self.symptoms.push(event);
        &self.symptoms[self.symptoms.len() - 1]
    }

    pub fn add_medication(&mut self, mut medication: Medication) -> &Medication {
        medication.subject_id = self.subject.id.clone();
        self.medications.push(medication);
        &self.medications[self.medications.len() - 1]
    }

    /// Delete any record with this id. Returns false if nothing matched.
    pub fn remove_event(&mut self, id: Uuid) -> bool {
        let before = self.event_count() + self.medications.len();
        self.triggers.retain(|e| e.id != id);
        self.symptoms.retain(|e| e.id != id);
        self.medications.retain(|m| m.id != id);
        before != self.event_count() + self.medications.len()
    }

    /// Number of trigger and symptom events
    pub fn event_count(&self) -> usize {
        self.triggers.len() + self.symptoms.len()
    }

    /// Timestamp of the most recent symptom at or before `as_of`.
    /// Future-dated entries are ignored.
    pub fn last_symptom_at(&self, as_of: i64) -> Option<i64> {
        self.symptoms
            .iter()
            .map(|s| s.timestamp)
            .filter(|ts| *ts <= as_of)
            .max()
    }

    /// Medications running on the given day
    pub fn active_medications(&self, on: NaiveDate) -> Vec<&Medication> {
        self.medications.iter().filter(|m| m.is_active_on(on)).collect()
    }
}
