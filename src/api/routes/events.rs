//! Event Routes
//!
//! - GET /api/v1/subjects/:id/events - List events, optionally windowed
//! - POST /api/v1/subjects/:id/triggers - Log a trigger exposure
//! - POST /api/v1/subjects/:id/symptoms - Log a symptom
//! - POST /api/v1/subjects/:id/medications - Start a medication course
//! - DELETE /api/v1/subjects/:id/events/:event_id - Delete any record

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::analysis::in_window;
use crate::api::dto::{
    CreateMedicationRequest, CreateSymptomRequest, CreateTriggerRequest, EventListResponse,
    WindowParams,
};
use crate::api::error::ApiResult;
use crate::api::routes::resolve_window;
use crate::api::state::AppState;
use crate::events::{
    EventResult, Medication, ReminderTime, Severity, SubjectId, SymptomCategory, SymptomEvent,
    TriggerCategory, TriggerEvent,
};

/// GET /api/v1/subjects/:id/events
///
/// All events, or only those inside `?window=` when given. Newest first.
pub async fn list_events(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<WindowParams>,
) -> ApiResult<Json<EventListResponse>> {
    let log = state.store.snapshot(&SubjectId::new(id)).await?;

    let window = match params.window.as_deref() {
        Some(w) => Some(resolve_window(&state, Some(w))?.resolve(state.clock.as_ref())),
        None => None,
    };

    let mut triggers: Vec<TriggerEvent> = log
        .triggers
        .into_iter()
        .filter(|e| in_window(window.as_ref(), e.timestamp))
        .collect();
    triggers.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let mut symptoms: Vec<SymptomEvent> = log
        .symptoms
        .into_iter()
        .filter(|e| in_window(window.as_ref(), e.timestamp))
        .collect();
    symptoms.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    Ok(Json(EventListResponse {
        subject_id: log.subject.id,
        total: triggers.len() + symptoms.len(),
        triggers,
        symptoms,
        medications: log.medications,
    }))
}

/// POST /api/v1/subjects/:id/triggers
pub async fn create_trigger(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<CreateTriggerRequest>,
) -> ApiResult<(StatusCode, Json<TriggerEvent>)> {
    let id = SubjectId::new(id);
    let category: TriggerCategory = req.category.parse()?;
    let timestamp = req.timestamp.unwrap_or_else(|| state.clock.now_millis());

    let mut event = TriggerEvent::new(id.clone(), category, timestamp);
    event.location = req.location.filter(|s| !s.trim().is_empty());
    event.notes = req.notes.filter(|s| !s.trim().is_empty());

    let event = state.store.add_trigger(&id, event).await?;
    tracing::info!(subject = %id, category = %event.category, "Logged trigger");

    Ok((StatusCode::CREATED, Json(event)))
}

/// POST /api/v1/subjects/:id/symptoms
///
/// Every trigger tag must be a known category; unknown tags are rejected
/// rather than dropped.
pub async fn create_symptom(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<CreateSymptomRequest>,
) -> ApiResult<(StatusCode, Json<SymptomEvent>)> {
    let id = SubjectId::new(id);
    let symptom = req.symptom.parse::<SymptomCategory>()?;
    let severity = Severity::new(req.severity)?;
    let triggers = req
        .triggers
        .iter()
        .map(|t| t.parse::<TriggerCategory>())
        .collect::<EventResult<Vec<_>>>()?;
    let timestamp = req.timestamp.unwrap_or_else(|| state.clock.now_millis());

    let mut event = SymptomEvent::new(id.clone(), symptom, severity, timestamp).triggers(triggers);
    event.notes = req.notes.filter(|s| !s.trim().is_empty());
    event.photo = req.photo.filter(|s| !s.trim().is_empty());

    let event = state.store.add_symptom(&id, event).await?;
    tracing::info!(
        subject = %id,
        symptom = %event.symptom,
        severity = event.severity.value(),
        "Logged symptom"
    );

    Ok((StatusCode::CREATED, Json(event)))
}

/// POST /api/v1/subjects/:id/medications
pub async fn create_medication(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<CreateMedicationRequest>,
) -> ApiResult<(StatusCode, Json<Medication>)> {
    let id = SubjectId::new(id);
    let start = req
        .start_date
        .unwrap_or_else(|| state.clock.now().date_naive());

    let mut medication = Medication::new(id.clone(), req.name.trim(), req.dosage.trim(), start);
    for time in &req.reminder_times {
        medication = medication.reminder(time.parse::<ReminderTime>()?);
    }
    if let Some(end) = req.end_date {
        medication = medication.until(end);
    }

    let medication = state.store.add_medication(&id, medication).await?;
    tracing::info!(subject = %id, medication = %medication.name, "Added medication");

    Ok((StatusCode::CREATED, Json(medication)))
}

/// DELETE /api/v1/subjects/:id/events/:event_id
pub async fn delete_event(
    State(state): State<Arc<AppState>>,
    Path((id, event_id)): Path<(String, Uuid)>,
) -> ApiResult<StatusCode> {
    state
        .store
        .delete_event(&SubjectId::new(id), event_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
