//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::Instant;

use crate::analysis::{Clock, FrequencyAnalyzer, SystemClock, TriggerAnalyzer, WindowPreset};
use crate::config::Config;
use crate::report::VetReportBuilder;
use crate::store::EventStore;
use crate::views::{DashboardBuilder, TriggerAnalysisBuilder};

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Per-subject event logs
    pub store: EventStore,
    pub clock: Arc<dyn Clock>,
    pub dashboards: DashboardBuilder,
    pub trigger_analysis: TriggerAnalysisBuilder,
    pub reports: VetReportBuilder,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    /// Create state with the default analyzer and the wall clock
    pub fn new(store: EventStore, config: ApiConfig) -> Self {
        Self::with_parts(
            store,
            Arc::new(FrequencyAnalyzer::default()),
            Arc::new(SystemClock),
            config,
        )
    }

    /// Create state with an explicit analyzer and clock
    pub fn with_parts(
        store: EventStore,
        analyzer: Arc<dyn TriggerAnalyzer>,
        clock: Arc<dyn Clock>,
        config: ApiConfig,
    ) -> Self {
        Self {
            store,
            dashboards: DashboardBuilder::new(Arc::clone(&analyzer), Arc::clone(&clock)),
            trigger_analysis: TriggerAnalysisBuilder::new(Arc::clone(&analyzer), Arc::clone(&clock)),
            reports: VetReportBuilder::new(analyzer, Arc::clone(&clock)),
            clock,
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Maximum request body size in bytes
    pub max_body_size: usize,
    /// Allowed CORS origins; empty allows any
    pub cors_origins: Vec<String>,
    /// Window used when a request does not name one
    pub default_window: WindowPreset,
    /// Width of text report bars
    pub bar_width: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8090,
            request_timeout_ms: 30_000,
            max_body_size: 2 * 1024 * 1024, // 2MB
            cors_origins: Vec::new(),
            default_window: WindowPreset::default(),
            bar_width: 30,
        }
    }
}

impl ApiConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl From<&Config> for ApiConfig {
    fn from(config: &Config) -> Self {
        Self {
            host: config.api.host.clone(),
            port: config.api.port,
            request_timeout_ms: config.api.request_timeout_secs.saturating_mul(1000),
            cors_origins: config.api.cors_origins.clone(),
            default_window: config.report.default_window,
            bar_width: config.report.bar_width,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config() {
        let mut config = Config::default();
        config.api.port = 9000;
        config.api.request_timeout_secs = 5;

        let api = ApiConfig::from(&config);
        assert_eq!(api.addr(), "127.0.0.1:9000");
        assert_eq!(api.request_timeout_ms, 5_000);
        assert_eq!(api.cors_origins, config.api.cors_origins);
    }

    #[test]
    fn test_huge_timeout_saturates() {
        let mut config = Config::default();
        config.api.request_timeout_secs = u64::MAX;

        let api = ApiConfig::from(&config);
        assert_eq!(api.request_timeout_ms, u64::MAX);
    }
}
