//! In-memory event store
//!
//! One [`EventLog`] per subject behind a Tokio `RwLock`. Readers take a
//! snapshot (a clone of the log) and analyze it without holding the lock,
//! so long reports never block writers.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::events::{EventLog, Medication, Subject, SubjectId, SymptomEvent, TriggerEvent};
use crate::store::error::{StoreError, StoreResult};

/// Counts reported by health checks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub subjects: usize,
    pub trigger_events: usize,
    pub symptom_events: usize,
    pub medications: usize,
}

/// Thread-safe store of event logs keyed by subject
#[derive(Debug, Clone, Default)]
pub struct EventStore {
    logs: Arc<RwLock<HashMap<SubjectId, EventLog>>>,
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from already loaded logs. Later logs for the same
    /// subject replace earlier ones.
    pub fn from_logs(logs: impl IntoIterator<Item = EventLog>) -> Self {
        let map = logs
            .into_iter()
            .map(|log| (log.subject.id.clone(), log))
            .collect();
        Self {
            logs: Arc::new(RwLock::new(map)),
        }
    }

    pub async fn register_subject(&self, subject: Subject) -> StoreResult<Subject> {
        subject.validate()?;

        let mut logs = self.logs.write().await;
        if logs.contains_key(&subject.id) {
            return Err(StoreError::DuplicateSubject(subject.id));
        }

        tracing::info!(subject = %subject.id, name = %subject.name, "Registered subject");
        logs.insert(subject.id.clone(), EventLog::new(subject.clone()));
        Ok(subject)
    }

    /// All subjects, sorted by id
    pub async fn list_subjects(&self) -> Vec<Subject> {
        let logs = self.logs.read().await;
        let mut subjects: Vec<Subject> = logs.values().map(|l| l.subject.clone()).collect();
        subjects.sort_by(|a, b| a.id.cmp(&b.id));
        subjects
    }

    pub async fn add_trigger(&self, id: &SubjectId, event: TriggerEvent) -> StoreResult<TriggerEvent> {
        let mut logs = self.logs.write().await;
        let log = logs
            .get_mut(id)
            .ok_or_else(|| StoreError::SubjectNotFound(id.clone()))?;
        Ok(log.add_trigger(event).clone())
    }

    pub async fn add_symptom(&self, id: &SubjectId, event: SymptomEvent) -> StoreResult<SymptomEvent> {
        let mut logs = self.logs.write().await;
        let log = logs
            .get_mut(id)
            .ok_or_else(|| StoreError::SubjectNotFound(id.clone()))?;
        Ok(log.add_symptom(event).clone())
    }

    pub async fn add_medication(
        &self,
        id: &SubjectId,
        medication: Medication,
    ) -> StoreResult<Medication> {
        medication.validate()?;

        let mut logs = self.logs.write().await;
        let log = logs
            .get_mut(id)
            .ok_or_else(|| StoreError::SubjectNotFound(id.clone()))?;
        Ok(log.add_medication(medication).clone())
    }

    /// Delete a trigger, symptom or medication by id
    pub async fn delete_event(&self, id: &SubjectId, event_id: Uuid) -> StoreResult<()> {
        let mut logs = self.logs.write().await;
        let log = logs
            .get_mut(id)
            .ok_or_else(|| StoreError::SubjectNotFound(id.clone()))?;

        if log.remove_event(event_id) {
            tracing::info!(subject = %id, event = %event_id, "Deleted event");
            Ok(())
        } else {
            Err(StoreError::EventNotFound(event_id))
        }
    }

    /// Copy of the subject's log for analysis
    pub async fn snapshot(&self, id: &SubjectId) -> StoreResult<EventLog> {
        self.logs
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::SubjectNotFound(id.clone()))
    }

    pub async fn stats(&self) -> StoreStats {
        let logs = self.logs.read().await;
        logs.values().fold(
            StoreStats {
                subjects: logs.len(),
                ..StoreStats::default()
            },
            |mut stats, log| {
                stats.trigger_events += log.triggers.len();
                stats.symptom_events += log.symptoms.len();
                stats.medications += log.medications.len();
                stats
            },
        )
    }
}
