//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.
//!
//! Request bodies carry categories as plain strings so that an unknown
//! category becomes a 400 with a readable message instead of a generic
//! JSON rejection.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::events::{Medication, Subject, SubjectId, SymptomEvent, TriggerEvent};

// ============================================
// SUBJECT DTOs
// ============================================

/// Register a dog
#[derive(Debug, Deserialize)]
pub struct CreateSubjectRequest {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub breed: Option<String>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub known_allergies: Vec<String>,
}

/// Subject list response
#[derive(Debug, Serialize, Deserialize)]
pub struct SubjectListResponse {
    pub subjects: Vec<Subject>,
    pub total: usize,
}

// ============================================
// EVENT DTOs
// ============================================

/// Log a trigger exposure
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateTriggerRequest {
    /// Trigger category, e.g. "pollen" or "walk_location"
    pub category: String,
    /// Optional timestamp (ms since epoch), defaults to now
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Log a symptom
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateSymptomRequest {
    pub symptom: String,
    /// 1 (mild) to 5 (severe)
    pub severity: u8,
    /// Suspected trigger categories
    #[serde(default)]
    pub triggers: Vec<String>,
    /// Optional timestamp (ms since epoch), defaults to now
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub photo: Option<String>,
}

/// Start a medication course
#[derive(Debug, Deserialize)]
pub struct CreateMedicationRequest {
    pub name: String,
    #[serde(default)]
    pub dosage: String,
    /// Daily reminders as "HH:MM" (UTC)
    #[serde(default)]
    pub reminder_times: Vec<String>,
    /// Defaults to today
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

/// Events for one subject
#[derive(Debug, Serialize)]
pub struct EventListResponse {
    pub subject_id: SubjectId,
    pub triggers: Vec<TriggerEvent>,
    pub symptoms: Vec<SymptomEvent>,
    pub medications: Vec<Medication>,
    /// Trigger plus symptom events returned
    pub total: usize,
}

// ============================================
// ANALYSIS DTOs
// ============================================

/// Query parameters for windowed views
#[derive(Debug, Default, Deserialize)]
pub struct WindowParams {
    /// 7d, 30d or 90d; the server default applies when absent
    #[serde(default)]
    pub window: Option<String>,
}

/// Query parameters for the vet report
#[derive(Debug, Default, Deserialize)]
pub struct ReportParams {
    #[serde(default)]
    pub window: Option<String>,
    /// json, text or csv
    #[serde(default)]
    pub format: Option<String>,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health status response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status: healthy
    pub status: String,
    /// Registered subjects
    pub subjects: usize,
    /// Trigger and symptom events held in memory
    pub events: usize,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Application version
    pub version: String,
}
