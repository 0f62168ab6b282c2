//! Dashboard Routes
//!
//! - GET /api/v1/subjects/:id/dashboard?window=30d

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
use crate::views::Dashboard;

/// GET /api/v1/subjects/:id/dashboard
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<WindowParams>,
) -> ApiResult<Json<Dashboard>> {
    let preset = resolve_window(&state, params.window.as_deref())?;
    let log = state.store.snapshot(&SubjectId::new(id)).await?;

    Ok(Json(state.dashboards.build(&log, preset)))
}
