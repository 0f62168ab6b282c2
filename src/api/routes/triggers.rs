//! Trigger Analysis Routes
//!
//! - GET /api/v1/subjects/:id/triggers/analysis?window=30d

use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;

use crate::api::dto::WindowParams;
use crate::api::error::ApiResult;
use crate::api::routes::resolve_window;
use crate::api::state::AppState;
use crate::events::SubjectId;
use crate::views::TriggerAnalysis;

/// GET /api/v1/subjects/:id/triggers/analysis
pub async fn get_trigger_analysis(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<WindowParams>,
) -> ApiResult<Json<TriggerAnalysis>> {
    let preset = resolve_window(&state, params.window.as_deref())?;
    let log = state.store.snapshot(&SubjectId::new(id)).await?;

    Ok(Json(state.trigger_analysis.build(&log, preset)))
}
