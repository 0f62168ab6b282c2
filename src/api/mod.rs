//! Pawtrack REST API
//!
//! HTTP API layer for Pawtrack, built with Axum.
//!
//! # Endpoints
//!
//! ## Subjects
//! - `GET /api/v1/subjects` - List registered dogs
//! - `POST /api/v1/subjects` - Register a dog
//!
//! ## Events
//! - `GET /api/v1/subjects/:id/events` - List events (`?window=` optional)
//! - `POST /api/v1/subjects/:id/triggers` - Log a trigger exposure
//! - `POST /api/v1/subjects/:id/symptoms` - Log a symptom
//! - `POST /api/v1/subjects/:id/medications` - Start a medication course
//! - `DELETE /api/v1/subjects/:id/events/:event_id` - Delete a record
//!
//! ## Analysis
//! - `GET /api/v1/subjects/:id/dashboard` - Dashboard summary
//! - `GET /api/v1/subjects/:id/triggers/analysis` - Trigger charts
//! - `GET /api/v1/subjects/:id/report` - Vet report (`format=json|text|csv`)
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,ignore
//! use pawtrack::api::{serve, ApiConfig, AppState};
//! use pawtrack::store::EventStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ApiConfig::default();
//!     let state = AppState::new(EventStore::new(), config.clone());
//!     serve(state, &config).await?;
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::{ApiConfig, AppState};

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Subject routes
        .route(
            "/subjects",
            get(routes::subjects::list_subjects).post(routes::subjects::create_subject),
        )
        // Event routes
        .route("/subjects/:id/events", get(routes::events::list_events))
        .route(
            "/subjects/:id/events/:event_id",
            delete(routes::events::delete_event),
        )
        .route("/subjects/:id/triggers", post(routes::events::create_trigger))
        .route("/subjects/:id/symptoms", post(routes::events::create_symptom))
        .route(
            "/subjects/:id/medications",
            post(routes::events::create_medication),
        )
        // Analysis routes
        .route("/subjects/:id/dashboard", get(routes::dashboard::get_dashboard))
        .route(
            "/subjects/:id/triggers/analysis",
            get(routes::triggers::get_trigger_analysis),
        )
        .route("/subjects/:id/report", get(routes::report::get_report))
        .layer(DefaultBodyLimit::max(state.config.max_body_size));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let cors = cors_layer(&state.config.cors_origins);
    let timeout = Duration::from_millis(state.config.request_timeout_ms);

    // Create shared state
    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(shared_state)
}

/// Permissive when no origins are configured
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if allowed.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Pawtrack API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Pawtrack API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{FixedClock, FrequencyAnalyzer, DAY_MILLIS};
    use crate::store::EventStore;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::Value;
    use tower::util::ServiceExt;

    const NOW: i64 = 1_000 * DAY_MILLIS;

    fn create_test_app() -> Router {
        let state = AppState::with_parts(
            EventStore::new(),
            Arc::new(FrequencyAnalyzer::default()),
            Arc::new(FixedClock(NOW)),
            ApiConfig::default(),
        );
        build_router(state)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> Response {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        app.clone().oneshot(request).await.unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn app_with_rex() -> Router {
        let app = create_test_app();
        let response = send(
            &app,
            "POST",
            "/api/v1/subjects",
            Some(r#"{"id": "rex", "name": "Rex", "breed": "Beagle"}"#),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        app
    }

    #[tokio::test]
    async fn test_health_live() {
        let app = create_test_app();
        let response = send(&app, "GET", "/health/live", None).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_full() {
        let app = app_with_rex().await;
        let response = send(&app, "GET", "/health", None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["subjects"], 1);
    }

    #[tokio::test]
    async fn test_duplicate_subject_conflicts() {
        let app = app_with_rex().await;
        let response = send(
            &app,
            "POST",
            "/api/v1/subjects",
            Some(r#"{"id": "rex", "name": "Rex"}"#),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "SUBJECT_EXISTS");
        assert!(body["request_id"].is_string());
    }

    #[tokio::test]
    async fn test_unknown_subject_is_404() {
        let app = create_test_app();
        let response = send(&app, "GET", "/api/v1/subjects/ghost/dashboard", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_category_is_rejected() {
        let app = app_with_rex().await;

        let response = send(
            &app,
            "POST",
            "/api/v1/subjects/rex/triggers",
            Some(r#"{"category": "volcano"}"#),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = send(
            &app,
            "POST",
            "/api/v1/subjects/rex/symptoms",
            Some(r#"{"symptom": "itching", "severity": 2, "triggers": ["food", "moon"]}"#),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = send(
            &app,
            "POST",
            "/api/v1/subjects/rex/symptoms",
            Some(r#"{"symptom": "itching", "severity": 6}"#),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_dashboard_flow() {
        let app = app_with_rex().await;

        for category in ["food", "food", "pollen", "weather", "food"] {
            let body = format!(r#"{{"category": "{}"}}"#, category);
            let response = send(&app, "POST", "/api/v1/subjects/rex/triggers", Some(&body)).await;
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let response = send(&app, "GET", "/api/v1/subjects/rex/dashboard?window=7d", None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["trigger_total"], 5);
        assert_eq!(body["top_trigger"]["category"], "food");
        assert_eq!(body["trigger_slices"][0]["percentage"], 60);
        assert_eq!(body["trigger_slices"][1]["category"], "pollen");
        assert_eq!(body["preset"], "7d");
    }

    #[tokio::test]
    async fn test_trigger_analysis_has_all_bars() {
        let app = app_with_rex().await;
        send(
            &app,
            "POST",
            "/api/v1/subjects/rex/symptoms",
            Some(r#"{"symptom": "hives", "severity": 4, "triggers": ["household_product"]}"#),
        )
        .await;

        let response = send(&app, "GET", "/api/v1/subjects/rex/triggers/analysis", None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["bars"].as_array().map(|b| b.len()), Some(7));
        assert_eq!(body["ranked"][0]["category"], "household_product");
        assert_eq!(body["co_occurrence"][0]["symptoms"]["total"], 1);
    }

    #[tokio::test]
    async fn test_invalid_window_is_400() {
        let app = app_with_rex().await;
        let response = send(&app, "GET", "/api/v1/subjects/rex/dashboard?window=14d", None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_text_report_download() {
        let app = app_with_rex().await;
        let response = send(
            &app,
            "GET",
            "/api/v1/subjects/rex/report?format=text&window=90d",
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
        assert!(response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .starts_with("attachment"));

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("VET REPORT: Rex"));
        assert!(text.contains("No triggers logged in this period."));
    }

    #[tokio::test]
    async fn test_delete_event() {
        let app = app_with_rex().await;
        let response = send(
            &app,
            "POST",
            "/api/v1/subjects/rex/triggers",
            Some(r#"{"category": "pollen", "location": "park"}"#),
        )
        .await;
        let event = json_body(response).await;
        let id = event["id"].as_str().unwrap().to_string();
        assert_eq!(event["timestamp"], NOW);

        let uri = format!("/api/v1/subjects/rex/events/{}", id);
        let response = send(&app, "DELETE", &uri, None).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = send(&app, "DELETE", &uri, None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = send(&app, "GET", "/api/v1/subjects/rex/events", None).await;
        assert_eq!(json_body(response).await["total"], 0);
    }

    #[tokio::test]
    async fn test_medication_with_bad_reminder() {
        let app = app_with_rex().await;
        let response = send(
            &app,
            "POST",
            "/api/v1/subjects/rex/medications",
            Some(r#"{"name": "Apoquel", "dosage": "16mg", "reminder_times": ["8am"]}"#),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = send(
            &app,
            "POST",
            "/api/v1/subjects/rex/medications",
            Some(r#"{"name": "Apoquel", "dosage": "16mg", "reminder_times": ["08:00"]}"#),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}
