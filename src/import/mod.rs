//! Importers for exported event data
//!
//! - **json**: Event log files in the API snapshot shape
//! - **csv_import**: Flat spreadsheet exports, one event per row
//!
//! Both importers are lenient per record: a malformed event is counted and
//! skipped, never fatal to the whole file.

mod csv_import;
mod json;

pub use csv_import::{CsvImportResult, CsvImporter};
pub use json::{load_event_log, load_event_logs, parse_event_log, save_event_log, LoadedLog};

use thiserror::Error;

/// Errors that abort an import
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

pub type ImportResult<T> = Result<T, ImportError>;
