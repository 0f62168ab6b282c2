//! CSV Import
//!
//! Flat spreadsheet exports with one event per row:
//!
//! ```text
//! timestamp,kind,category,severity,triggers,location,notes
//! 2024-05-01 08:30:00,trigger,pollen,,,park,
//! 2024-05-01 18:00:00,symptom,itching,3,pollen;grass,,scratching ears
//! ```
//!
//! Columns are located by header name when a header row is present, and by
//! position otherwise.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::io::Read;
use std::path::Path;

use super::{ImportError, ImportResult};
use crate::events::{
    EventError, EventLog, Severity, Subject, SubjectId, SymptomCategory, SymptomEvent, TriggerCategory,
    TriggerEvent,
};

const MAX_ERRORS: usize = 100;

/// Column positions for each field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns {
    timestamp: usize,
    kind: usize,
    category: usize,
    severity: Option<usize>,
    triggers: Option<usize>,
    location: Option<usize>,
    notes: Option<usize>,
}

impl Default for Columns {
    fn default() -> Self {
        Self {
            timestamp: 0,
            kind: 1,
            category: 2,
            severity: Some(3),
            triggers: Some(4),
            location: Some(5),
            notes: Some(6),
        }
    }
}

impl Columns {
    /// Locate columns by header name, keeping the positional default for
    /// any required column that is not found
    fn from_headers(headers: &csv::StringRecord) -> Self {
        let find = |names: &[&str]| {
            headers
                .iter()
                .position(|h| names.contains(&h.trim().to_lowercase().as_str()))
        };
        let defaults = Self::default();

        Self {
            timestamp: find(&["timestamp", "date", "time", "datetime"]).unwrap_or(defaults.timestamp),
            kind: find(&["kind", "type", "event"]).unwrap_or(defaults.kind),
            category: find(&["category", "trigger", "symptom"]).unwrap_or(defaults.category),
            severity: find(&["severity"]),
            triggers: find(&["triggers", "tags"]),
            location: find(&["location", "place"]),
            notes: find(&["notes", "note", "comment"]),
        }
    }
}

/// CSV importer for one subject's events
pub struct CsvImporter {
    subject_id: SubjectId,
    has_header: bool,
}

/// Result of a CSV import operation
#[derive(Debug, Default)]
pub struct CsvImportResult {
    pub triggers: Vec<TriggerEvent>,
    pub symptoms: Vec<SymptomEvent>,
    pub rows_processed: usize,
    pub rows_failed: usize,
    /// Line-numbered messages, capped at the first 100
    pub errors: Vec<String>,
}

impl CsvImportResult {
    /// Move the imported events into a log for `subject`
    pub fn into_event_log(self, subject: Subject) -> EventLog {
        let mut log = EventLog::new(subject);
        for trigger in self.triggers {
            log.add_trigger(trigger);
        }
        for symptom in self.symptoms {
            log.add_symptom(symptom);
        }
        log
    }
}

enum Row {
    Trigger(TriggerEvent),
    Symptom(SymptomEvent),
}

impl CsvImporter {
    pub fn new(subject_id: impl Into<SubjectId>) -> Self {
        Self {
            subject_id: subject_id.into(),
            has_header: true,
        }
    }

    /// Set whether the CSV has a header row
    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    /// Import events from a CSV file
    pub fn import(&self, path: &Path) -> ImportResult<CsvImportResult> {
        let file = std::fs::File::open(path)?;
        let result = self.import_reader(file)?;
        tracing::info!(
            path = %path.display(),
            processed = result.rows_processed,
            failed = result.rows_failed,
            "Imported CSV"
        );
        Ok(result)
    }

    /// Import from a CSV string
    pub fn import_str(&self, csv_data: &str) -> ImportResult<CsvImportResult> {
        self.import_reader(csv_data.as_bytes())
    }

    fn import_reader<R: Read>(&self, input: R) -> ImportResult<CsvImportResult> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(self.has_header)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(input);

        let columns = if self.has_header {
            Columns::from_headers(reader.headers()?)
        } else {
            Columns::default()
        };

        let mut result = CsvImportResult::default();
        let mut error_count = 0usize;

        for (line_num, record) in reader.records().enumerate() {
            let actual_line = if self.has_header {
                line_num + 2
            } else {
                line_num + 1
            };

            let parsed = record
                .map_err(ImportError::from)
                .and_then(|r| self.parse_row(&r, &columns));

            match parsed {
                Ok(Row::Trigger(event)) => {
                    result.triggers.push(event);
                    result.rows_processed += 1;
                }
                Ok(Row::Symptom(event)) => {
                    result.symptoms.push(event);
                    result.rows_processed += 1;
                }
                Err(e) => {
                    result.rows_failed += 1;
                    error_count += 1;
                    if error_count <= MAX_ERRORS {
                        result.errors.push(format!("Line {}: {}", actual_line, e));
                    }
                }
            }
        }

        if error_count > MAX_ERRORS {
            result
                .errors
                .push(format!("... and {} more errors", error_count - MAX_ERRORS));
        }

        Ok(result)
    }

    fn parse_row(&self, record: &csv::StringRecord, columns: &Columns) -> ImportResult<Row> {
        let field = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i))
                .map(str::trim)
                .filter(|s| !s.is_empty())
        };
        let required = |idx: usize, name: &str| {
            field(Some(idx)).ok_or_else(|| ImportError::Parse(format!("missing {}", name)))
        };

        let timestamp = parse_timestamp(required(columns.timestamp, "timestamp")?)?;
        let kind = required(columns.kind, "kind")?.to_lowercase();
        let category = required(columns.category, "category")?;
        let notes = field(columns.notes);

        match kind.as_str() {
            "trigger" => {
                let category: TriggerCategory = category
                    .parse()
                    .map_err(|e: EventError| ImportError::Parse(e.to_string()))?;
                let mut event = TriggerEvent::new(self.subject_id.clone(), category, timestamp);
                if let Some(location) = field(columns.location) {
                    event = event.location(location);
                }
                if let Some(notes) = notes {
                    event = event.notes(notes);
                }
                Ok(Row::Trigger(event))
            }
            "symptom" => {
                let symptom: SymptomCategory = category
                    .parse()
                    .map_err(|e: EventError| ImportError::Parse(e.to_string()))?;
                let severity = parse_severity(field(columns.severity))?;
                let mut event =
                    SymptomEvent::new(self.subject_id.clone(), symptom, severity, timestamp)
                        .triggers(parse_trigger_tags(field(columns.triggers)));
                if let Some(notes) = notes {
                    event = event.notes(notes);
                }
                Ok(Row::Symptom(event))
            }
            other => Err(ImportError::Parse(format!(
                "unknown kind '{}' (use trigger or symptom)",
                other
            ))),
        }
    }
}

fn parse_severity(value: Option<&str>) -> ImportResult<Severity> {
    let value = value.ok_or_else(|| ImportError::Parse("missing severity".to_string()))?;
    let level: u8 = value
        .parse()
        .map_err(|_| ImportError::Parse(format!("invalid severity: {}", value)))?;
    Severity::new(level).map_err(|e| ImportError::Parse(e.to_string()))
}

/// `;`-separated tags; unknown tags are dropped
fn parse_trigger_tags(value: Option<&str>) -> Vec<TriggerCategory> {
    value
        .map(|tags| {
            tags.split(';')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .filter_map(|t| match t.parse() {
                    Ok(category) => Some(category),
                    Err(_) => {
                        tracing::debug!(tag = t, "Dropping unknown trigger tag");
                        None
                    }
                })
                .collect()
        })
        .unwrap_or_default()
}

/// RFC 3339, common date-time layouts, date only (noon UTC) or unix millis
fn parse_timestamp(ts_str: &str) -> ImportResult<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts_str) {
        return Ok(dt.with_timezone(&Utc).timestamp_millis());
    }

    let formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
    ];
    for fmt in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(ts_str, fmt) {
            return Ok(dt.and_utc().timestamp_millis());
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(ts_str, fmt) {
            if let Some(noon) = date.and_hms_opt(12, 0, 0) {
                return Ok(noon.and_utc().timestamp_millis());
            }
        }
    }

    if ts_str.chars().all(|c| c.is_ascii_digit()) {
        if let Ok(millis) = ts_str.parse::<i64>() {
            return Ok(millis);
        }
    }

    Err(ImportError::Parse(format!(
        "Could not parse timestamp: {}",
        ts_str
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_simple_csv_import() {
        let csv_data = "timestamp,kind,category,severity,triggers,location,notes
2024-05-01 08:30:00,trigger,pollen,,,park,
2024-05-01 18:00:00,symptom,itching,3,pollen;food,,scratching ears
2024-05-02,trigger,Walk Location,,,,beach";

        let result = CsvImporter::new("rex").import_str(csv_data).unwrap();

        assert_eq!(result.rows_processed, 3);
        assert_eq!(result.rows_failed, 0);
        assert_eq!(result.triggers.len(), 2);
        assert_eq!(result.triggers[0].location.as_deref(), Some("park"));
        assert_eq!(result.triggers[1].category, TriggerCategory::WalkLocation);
        assert_eq!(
            result.triggers[1].timestamp,
            Utc.with_ymd_and_hms(2024, 5, 2, 12, 0, 0).unwrap().timestamp_millis()
        );

        let symptom = &result.symptoms[0];
        assert_eq!(symptom.severity.value(), 3);
        assert_eq!(
            symptom.triggers,
            vec![TriggerCategory::Pollen, TriggerCategory::Food]
        );
        assert_eq!(symptom.notes.as_deref(), Some("scratching ears"));
    }

    #[test]
    fn test_bad_rows_are_counted() {
        let csv_data = "timestamp,kind,category,severity,triggers,location,notes
not-a-date,trigger,food,,,,
2024-05-01,trigger,volcano,,,,
2024-05-01,symptom,itching,7,,,
2024-05-01,symptom,itching,,,,
2024-05-01,walk,food,,,,
1714550400000,trigger,food,,,,";

        let result = CsvImporter::new("rex").import_str(csv_data).unwrap();

        assert_eq!(result.rows_processed, 1);
        assert_eq!(result.rows_failed, 5);
        assert_eq!(result.errors.len(), 5);
        assert!(result.errors[0].starts_with("Line 2:"));
        assert_eq!(result.triggers[0].timestamp, 1_714_550_400_000);
    }

    #[test]
    fn test_headers_in_any_order() {
        let csv_data = "kind,notes,category,timestamp,severity
symptom,ears,redness,2024-05-01T10:00:00Z,2";

        let result = CsvImporter::new("rex").import_str(csv_data).unwrap();
        assert_eq!(result.rows_processed, 1);
        assert_eq!(result.symptoms[0].symptom, SymptomCategory::Redness);
        assert_eq!(result.symptoms[0].notes.as_deref(), Some("ears"));
    }

    #[test]
    fn test_errors_are_capped() {
        let mut csv_data = String::from("timestamp,kind,category\n");
        for _ in 0..150 {
            csv_data.push_str("bad,trigger,food\n");
        }

        let result = CsvImporter::new("rex").import_str(&csv_data).unwrap();
        assert_eq!(result.rows_failed, 150);
        assert_eq!(result.errors.len(), MAX_ERRORS + 1);
        assert_eq!(result.errors[MAX_ERRORS], "... and 50 more errors");
    }

    #[test]
    fn test_import_file_into_log() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "2024-05-01,trigger,food,,,,").unwrap();
        writeln!(file, "2024-05-01,symptom,hives,4,food,,").unwrap();

        let result = CsvImporter::new("rex")
            .with_header(false)
            .import(file.path())
            .unwrap();
        let log = result.into_event_log(Subject::new("rex", "Rex"));

        assert_eq!(log.event_count(), 2);
        assert_eq!(log.symptoms[0].subject_id.as_str(), "rex");
    }
}
