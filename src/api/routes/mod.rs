//! API Routes
//!
//! Route handlers organized by functionality.

pub mod dashboard;
pub mod events;
pub mod health;
pub mod report;
pub mod subjects;
pub mod triggers;

use crate::analysis::WindowPreset;
use crate::api::error::ApiResult;
use crate::api::state::AppState;

/// Parse a `window` query parameter, falling back to the configured default
pub(crate) fn resolve_window(state: &AppState, window: Option<&str>) -> ApiResult<WindowPreset> {
    match window.map(str::trim).filter(|w| !w.is_empty()) {
        Some(w) => Ok(w.parse()?),
        None => Ok(state.config.default_window),
    }
}
