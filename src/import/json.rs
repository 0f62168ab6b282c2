//! JSON event log files

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fs;
use std::path::Path;

use super::{ImportError, ImportResult};
use crate::events::{EventLog, Medication, Subject};

/// A parsed log and how many records were dropped on the way
#[derive(Debug, Clone)]
pub struct LoadedLog {
    pub log: EventLog,
    /// Events or medications that failed to parse
    pub skipped: usize,
}

/// Load one event log from a file
pub fn load_event_log(path: &Path) -> ImportResult<LoadedLog> {
    let content = fs::read_to_string(path)?;
    let loaded = parse_event_log(&content)?;
    tracing::info!(
        path = %path.display(),
        subject = %loaded.log.subject.id,
        events = loaded.log.event_count(),
        skipped = loaded.skipped,
        "Loaded event log"
    );
    Ok(loaded)
}

/// Load a file holding either one log object or an array of them
pub fn load_event_logs(path: &Path) -> ImportResult<Vec<LoadedLog>> {
    let content = fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&content)?;

    let logs = match value {
        Value::Array(items) => items
            .into_iter()
            .map(log_from_value)
            .collect::<ImportResult<Vec<_>>>()?,
        other => vec![log_from_value(other)?],
    };

    tracing::info!(path = %path.display(), subjects = logs.len(), "Loaded event logs");
    Ok(logs)
}

/// Parse one event log, skipping malformed events
pub fn parse_event_log(content: &str) -> ImportResult<LoadedLog> {
    let value: Value = serde_json::from_str(content)?;
    log_from_value(value)
}

/// Write a log as pretty JSON
pub fn save_event_log(path: &Path, log: &EventLog) -> ImportResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(log)?)?;
    tracing::info!(path = %path.display(), events = log.event_count(), "Saved event log");
    Ok(())
}

fn log_from_value(value: Value) -> ImportResult<LoadedLog> {
    let Value::Object(mut map) = value else {
        return Err(ImportError::Parse(
            "Event log must be a JSON object".to_string(),
        ));
    };

    let subject: Subject = map
        .remove("subject")
        .ok_or_else(|| ImportError::Parse("Event log is missing \"subject\"".to_string()))
        .and_then(|v| serde_json::from_value(v).map_err(ImportError::from))?;
    subject
        .validate()
        .map_err(|e| ImportError::Parse(e.to_string()))?;

    let mut log = EventLog::new(subject);
    let mut skipped = 0;

    for trigger in parse_records(map.remove("triggers"), "trigger", &mut skipped) {
        log.add_trigger(trigger);
    }
    for symptom in parse_records(map.remove("symptoms"), "symptom", &mut skipped) {
        log.add_symptom(symptom);
    }
    for medication in parse_records::<Medication>(map.remove("medications"), "medication", &mut skipped) {
        if let Err(e) = medication.validate() {
            tracing::warn!(error = %e, "Skipping invalid medication");
            skipped += 1;
            continue;
        }
        log.add_medication(medication);
    }

    Ok(LoadedLog { log, skipped })
}

/// Parse each array element on its own so one bad record cannot sink the rest
fn parse_records<T: DeserializeOwned>(value: Option<Value>, kind: &str, skipped: &mut usize) -> Vec<T> {
    let items = match value {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::Array(items)) => items,
        Some(_) => {
            tracing::warn!(kind, "Expected an array of records, ignoring field");
            *skipped += 1;
            return Vec::new();
        }
    };

    items
        .into_iter()
        .enumerate()
        .filter_map(|(idx, item)| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(kind, index = idx, error = %e, "Skipping malformed record");
                *skipped += 1;
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{Severity, SymptomCategory, SymptomEvent, TriggerCategory, TriggerEvent};
    use tempfile::TempDir;

    const SAMPLE: &str = r#"{
        "subject": {"id": "rex", "name": "Rex", "breed": "Beagle"},
        "triggers": [
            {"category": "food", "timestamp": 1000},
            {"category": "walk-location", "location": "park", "timestamp": 2000},
            {"category": "volcano", "timestamp": 3000},
            {"timestamp": 4000}
        ],
        "symptoms": [
            {"symptom": "itching", "severity": 3, "triggers": ["food", "moon"], "timestamp": 5000},
            {"symptom": "itching", "severity": 9, "timestamp": 6000}
        ],
        "medications": [
            {"name": "Apoquel", "dosage": "16mg", "reminder_times": ["08:00"], "start_date": "2024-01-01"},
            {"name": "Bad", "reminder_times": ["8am"], "start_date": "2024-01-01"}
        ]
    }"#;

    #[test]
    fn test_malformed_events_are_skipped_and_counted() {
        let loaded = parse_event_log(SAMPLE).unwrap();

        assert_eq!(loaded.log.triggers.len(), 2);
        assert_eq!(loaded.log.triggers[1].category, TriggerCategory::WalkLocation);
        assert_eq!(loaded.log.symptoms.len(), 1);
        assert_eq!(loaded.log.symptoms[0].triggers, vec![TriggerCategory::Food]);
        assert_eq!(loaded.log.medications.len(), 1);
        assert_eq!(loaded.skipped, 4);
        assert!(loaded
            .log
            .triggers
            .iter()
            .all(|t| t.subject_id.as_str() == "rex"));
    }

    #[test]
    fn test_missing_subject_is_fatal() {
        let err = parse_event_log(r#"{"triggers": []}"#).unwrap_err();
        assert!(matches!(err, ImportError::Parse(_)));

        let err = parse_event_log("[1, 2").unwrap_err();
        assert!(matches!(err, ImportError::Json(_)));
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("rex.json");

        let mut log = EventLog::new(Subject::new("rex", "Rex"));
        log.add_trigger(TriggerEvent::new("rex", TriggerCategory::Pollen, 10));
        log.add_symptom(
            SymptomEvent::new("rex", SymptomCategory::Sneezing, Severity::new(2).unwrap(), 20)
                .trigger(TriggerCategory::Pollen),
        );

        save_event_log(&path, &log).unwrap();
        let loaded = load_event_log(&path).unwrap();

        assert_eq!(loaded.skipped, 0);
        assert_eq!(loaded.log, log);
    }

    #[test]
    fn test_load_many_logs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("all.json");
        fs::write(
            &path,
            r#"[{"subject": {"id": "rex", "name": "Rex"}}, {"subject": {"id": "bella", "name": "Bella"}}]"#,
        )
        .unwrap();

        let logs = load_event_logs(&path).unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[1].log.subject.name, "Bella");

        let single = dir.path().join("one.json");
        fs::write(&single, SAMPLE).unwrap();
        assert_eq!(load_event_logs(&single).unwrap().len(), 1);
    }
}
