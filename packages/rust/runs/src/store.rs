//! In-memory run registry.
//!
//! Each run's record and event log live under a unique key; the run's own
//! worker task is the only writer (plus the cancel entry point, serialized
//! through the same lock). Pollers only ever see cloned snapshots, so no
//! reader can observe a partially applied mutation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use docreview_shared::{
    DocReviewError, EventKind, Mode, Result, RunEvent, RunId, RunPhase, RunRecord, RunStatus,
};

/// One run's registry entry: record, append-only event log, and the final
/// review text once produced.
#[derive(Debug, Clone)]
struct RunEntry {
    record: RunRecord,
    events: Vec<RunEvent>,
    result: Option<String>,
}

/// Copy-on-read view of a run, safe to hold across writer appends.
#[derive(Debug, Clone)]
pub struct RunSnapshot {
    pub record: RunRecord,
    pub events: Vec<RunEvent>,
    pub result: Option<String>,
}

/// Keyed in-memory registry of review runs.
///
/// Cheap to clone; clones share the underlying map.
#[derive(Clone, Default)]
pub struct RunStore {
    inner: Arc<RwLock<HashMap<RunId, RunEntry>>>,
}

impl RunStore {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<RunId, RunEntry>> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<RunId, RunEntry>> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Register a new run in the initial `received`/`running` state.
    pub fn create(&self, mode: Mode) -> RunId {
        let id = RunId::new();
        let entry = RunEntry {
            record: RunRecord::new(id, mode),
            events: Vec::new(),
            result: None,
        };
        self.write().insert(id, entry);
        id
    }

    /// Snapshot a run for polling. `None` for unknown ids.
    pub fn get(&self, id: RunId) -> Option<RunSnapshot> {
        self.read().get(&id).map(|entry| RunSnapshot {
            record: entry.record.clone(),
            events: entry.events.clone(),
            result: entry.result.clone(),
        })
    }

    /// Current status of a run, if known.
    pub fn status(&self, id: RunId) -> Option<RunStatus> {
        self.read().get(&id).map(|entry| entry.record.status)
    }

    /// Whether the run has been canceled.
    pub fn is_canceled(&self, id: RunId) -> bool {
        self.status(id) == Some(RunStatus::Canceled)
    }

    /// Advance the run's phase. Backward writes are ignored so the phase
    /// stays monotonic through the happy path.
    pub fn set_phase(&self, id: RunId, phase: RunPhase) {
        if let Some(entry) = self.write().get_mut(&id) {
            if phase > entry.record.phase {
                entry.record.phase = phase;
            }
        }
    }

    /// Set a terminal status. Only applies while the run is still
    /// `running`; terminal values are written exactly once, ever.
    /// Returns whether the transition happened.
    pub fn set_status(&self, id: RunId, status: RunStatus, error: Option<String>) -> bool {
        let mut map = self.write();
        let Some(entry) = map.get_mut(&id) else {
            return false;
        };
        if entry.record.status != RunStatus::Running {
            return false;
        }
        entry.record.status = status;
        entry.record.error = error;
        true
    }

    /// Append an event to the run's log.
    pub fn add_event(&self, id: RunId, kind: EventKind, message: &str) {
        if let Some(entry) = self.write().get_mut(&id) {
            entry.events.push(RunEvent::now(id, kind, message));
        }
    }

    /// Store the final review text, assign an artifact id, and mark the
    /// run succeeded. Does nothing if the run is already terminal (e.g.
    /// canceled while the finalize call was in flight).
    pub fn finish_success(&self, id: RunId, markdown: String) -> Option<String> {
        let mut map = self.write();
        let entry = map.get_mut(&id)?;
        if entry.record.status != RunStatus::Running {
            return None;
        }
        let artifact_id = uuid::Uuid::now_v7().to_string();
        entry.result = Some(markdown);
        entry.record.artifact_id = Some(artifact_id.clone());
        entry.record.status = RunStatus::Succeeded;
        Some(artifact_id)
    }

    /// Request cancellation of a run.
    ///
    /// Flips `running` → `canceled`; the run's worker observes the flip at
    /// its next checkpoint and emits the single `canceled` event. Returns
    /// the updated record, or an error for unknown ids.
    pub fn cancel(&self, id: RunId) -> Result<RunRecord> {
        let mut map = self.write();
        let entry = map
            .get_mut(&id)
            .ok_or_else(|| DocReviewError::Store(format!("run not found: {id}")))?;
        if entry.record.status == RunStatus::Running {
            entry.record.status = RunStatus::Canceled;
        }
        Ok(entry.record.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_and_snapshot() {
        let store = RunStore::new();
        let id = store.create(Mode::PrdReview);
        let snap = store.get(id).expect("known run");
        assert_eq!(snap.record.status, RunStatus::Running);
        assert_eq!(snap.record.phase, RunPhase::Received);
        assert!(snap.events.is_empty());
        assert!(snap.result.is_none());
        assert!(store.get(RunId::new()).is_none());
    }

    #[test]
    fn phase_is_monotonic() {
        let store = RunStore::new();
        let id = store.create(Mode::PrdReview);
        store.set_phase(id, RunPhase::Executing);
        store.set_phase(id, RunPhase::Planning); // backward, ignored
        assert_eq!(store.get(id).unwrap().record.phase, RunPhase::Executing);
        store.set_phase(id, RunPhase::Producing);
        assert_eq!(store.get(id).unwrap().record.phase, RunPhase::Producing);
    }

    #[test]
    fn terminal_status_set_exactly_once() {
        let store = RunStore::new();
        let id = store.create(Mode::TrdReview);
        assert!(store.set_status(id, RunStatus::Failed, Some("boom".into())));
        assert!(!store.set_status(id, RunStatus::Succeeded, None));
        let record = store.get(id).unwrap().record;
        assert_eq!(record.status, RunStatus::Failed);
        assert_eq!(record.error.as_deref(), Some("boom"));
    }

    #[test]
    fn cancel_flips_running_and_wins_over_success() {
        let store = RunStore::new();
        let id = store.create(Mode::TcReview);
        let record = store.cancel(id).expect("known run");
        assert_eq!(record.status, RunStatus::Canceled);
        // The worker's success path becomes a no-op afterwards.
        assert!(store.finish_success(id, "late result".into()).is_none());
        let snap = store.get(id).unwrap();
        assert_eq!(snap.record.status, RunStatus::Canceled);
        assert!(snap.record.artifact_id.is_none());
        assert!(snap.result.is_none());
    }

    #[test]
    fn cancel_after_terminal_is_a_no_op() {
        let store = RunStore::new();
        let id = store.create(Mode::PrdReview);
        store.set_status(id, RunStatus::Succeeded, None);
        let record = store.cancel(id).expect("known run");
        assert_eq!(record.status, RunStatus::Succeeded);
    }

    #[test]
    fn cancel_unknown_run_errors() {
        let store = RunStore::new();
        assert!(store.cancel(RunId::new()).is_err());
    }

    #[test]
    fn events_append_in_order() {
        let store = RunStore::new();
        let id = store.create(Mode::PrdReview);
        store.add_event(id, EventKind::Info, "received");
        store.add_event(id, EventKind::Todo, "[pending] T1 x");
        let events = store.get(id).unwrap().events;
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].message, "received");
        assert_eq!(events[1].kind, EventKind::Todo);
    }

    #[test]
    fn finish_success_stores_result_and_artifact() {
        let store = RunStore::new();
        let id = store.create(Mode::PrdReview);
        let artifact = store.finish_success(id, "# review".into()).expect("success");
        let snap = store.get(id).unwrap();
        assert_eq!(snap.record.status, RunStatus::Succeeded);
        assert_eq!(snap.record.artifact_id.as_deref(), Some(artifact.as_str()));
        assert_eq!(snap.result.as_deref(), Some("# review"));
    }
}
