//! Subject Routes
//!
//! - GET /api/v1/subjects - List registered dogs
//! - POST /api/v1/subjects - Register a dog

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::{CreateSubjectRequest, SubjectListResponse};
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::events::Subject;

/// GET /api/v1/subjects
pub async fn list_subjects(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<SubjectListResponse>> {
    let subjects = state.store.list_subjects().await;

    Ok(Json(SubjectListResponse {
        total: subjects.len(),
        subjects,
    }))
}

/// POST /api/v1/subjects
pub async fn create_subject(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateSubjectRequest>,
) -> ApiResult<(StatusCode, Json<Subject>)> {
    let mut subject = Subject::new(req.id.trim(), req.name.trim());
    subject.breed = req.breed;
    subject.birth_date = req.birth_date;
    subject.known_allergies = req.known_allergies;

    let subject = state.store.register_subject(subject).await?;
    Ok((StatusCode::CREATED, Json(subject)))
}
