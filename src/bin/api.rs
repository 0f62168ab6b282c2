//! Pawtrack API Server
//!
//! Run with: cargo run --bin pawtrack-api
//!
//! # Configuration
//!
//! Settings come from the config file (`PAWTRACK_CONFIG`, else
//! `~/.config/pawtrack/config.toml` or `./pawtrack.toml`) with environment
//! overrides:
//! - `PAWTRACK_API_HOST`: Host to bind to (default: 127.0.0.1)
//! - `PAWTRACK_API_PORT`: Port to listen on (default: 8090)
//! - `PAWTRACK_EVENTS_FILE`: JSON event log(s) loaded at startup
//! - `PAWTRACK_REPORT_WINDOW`: Default window for views (7d, 30d, 90d)
//! - `RUST_LOG`: Log filter (default: pawtrack=info,tower_http=info)

use std::path::{Path, PathBuf};
use std::sync::Arc;

use pawtrack::analysis::{FrequencyAnalyzer, SystemClock};
use pawtrack::api::{serve, ApiConfig, AppState};
use pawtrack::config::Config;
use pawtrack::import::load_event_logs;
use pawtrack::store::EventStore;
use pawtrack::telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::var("PAWTRACK_CONFIG") {
        Ok(path) => Config::load_with_env(&PathBuf::from(path))?,
        Err(_) => Config::load_default(),
    };

    telemetry::init(&config.logging)?;

    tracing::info!("Starting Pawtrack API server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Default window: {}, trigger basis: {}",
        config.report.default_window,
        config.report.trigger_basis
    );

    let store = match &config.data.events_file {
        Some(path) => load_store(Path::new(path)).await?,
        None => EventStore::new(),
    };

    let api_config = ApiConfig::from(&config);
    let state = AppState::with_parts(
        store,
        Arc::new(FrequencyAnalyzer::new(config.report.trigger_basis)),
        Arc::new(SystemClock),
        api_config.clone(),
    );

    tracing::info!("Starting server on {}:{}", api_config.host, api_config.port);
    serve(state, &api_config).await?;

    tracing::info!("Pawtrack API server stopped");

    Ok(())
}

/// Build the store from event logs on disk
async fn load_store(path: &Path) -> Result<EventStore, Box<dyn std::error::Error>> {
    tracing::info!("Loading events from {:?}", path);

    let loaded = load_event_logs(path)?;
    let skipped: usize = loaded.iter().map(|l| l.skipped).sum();
    let store = EventStore::from_logs(loaded.into_iter().map(|l| l.log));

    let stats = store.stats().await;
    tracing::info!(
        subjects = stats.subjects,
        triggers = stats.trigger_events,
        symptoms = stats.symptom_events,
        skipped,
        "Event store seeded"
    );

    Ok(store)
}
