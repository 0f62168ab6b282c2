//! Report Routes
//!
//! - GET /api/v1/subjects/:id/report?window=30d&format=json|text|csv

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::api::dto::ReportParams;
use crate::api::error::{ApiError, ApiResult};
use crate::api::routes::resolve_window;
use crate::api::state::AppState;
use crate::events::SubjectId;
use crate::report::{render, ReportFormat};

/// GET /api/v1/subjects/:id/report
///
/// Renders the vet report; JSON by default. Text and CSV are sent as
/// attachments.
pub async fn get_report(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<ReportParams>,
) -> ApiResult<Response> {
    let preset = resolve_window(&state, params.window.as_deref())?;
    let format = match params.format.as_deref() {
        Some(f) => f.parse::<ReportFormat>().map_err(ApiError::Validation)?,
        None => ReportFormat::Json,
    };

    let log = state.store.snapshot(&SubjectId::new(id)).await?;
    let report = state.reports.build(&log, preset);
    let body = render(&report, format, state.config.bar_width)?;

    let filename = format!(
        "vet_report_{}_{}.{}",
        report.profile.id,
        report.generated_at.format("%Y%m%d"),
        format.extension()
    );

    let disposition = match format {
        ReportFormat::Json => "inline".to_string(),
        _ => format!("attachment; filename=\"{}\"", filename),
    };

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Body::from(body),
    )
        .into_response())
}
