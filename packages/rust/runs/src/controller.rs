//! Run controller: one background task per run, mapping pipeline progress
//! onto the run/event state machine.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, instrument};

use docreview_review::{CancelSignal, EventSink, ReviewService};
use docreview_shared::{DocReviewError, EventKind, Mode, Result, RunId, RunPhase};

use crate::document::load_document;
use crate::store::RunStore;

/// Input document for a review run.
#[derive(Debug, Clone)]
pub enum ReviewInput {
    /// Inline document text; the `parsing` phase is skipped.
    Text(String),
    /// Path to a stored document needing text extraction.
    File(PathBuf),
}

/// Everything needed to start a run.
#[derive(Debug, Clone)]
pub struct ReviewRequest {
    pub mode: Mode,
    pub language: String,
    pub input: ReviewInput,
}

// ---------------------------------------------------------------------------
// Store-backed observer seams
// ---------------------------------------------------------------------------

/// Event sink that appends to the run's log and mirrors phase changes
/// into the run record.
struct StoreSink {
    store: RunStore,
    run_id: RunId,
}

impl EventSink for StoreSink {
    fn emit(&self, kind: EventKind, message: &str) {
        self.store.add_event(self.run_id, kind, message);
    }

    fn phase_changed(&self, phase: RunPhase) {
        self.store.set_phase(self.run_id, phase);
    }
}

/// Cancellation signal backed by the run's status in the registry.
struct StoreCancel {
    store: RunStore,
    run_id: RunId,
}

impl CancelSignal for StoreCancel {
    fn is_canceled(&self) -> bool {
        self.store.is_canceled(self.run_id)
    }
}

// ---------------------------------------------------------------------------
// Controller API
// ---------------------------------------------------------------------------

/// Start a review run and return its id immediately.
///
/// The run executes as one independent background task; progress is
/// observable through the store's snapshots. Every run reaches a terminal
/// status: `succeeded` with a stored result and artifact id, `failed`
/// with the error's description, or `canceled` with no artifact.
pub fn start_review(store: &RunStore, service: Arc<ReviewService>, request: ReviewRequest) -> RunId {
    let run_id = store.create(request.mode);
    store.add_event(run_id, EventKind::Info, "received");
    info!(%run_id, mode = %request.mode, "run accepted");

    let store = store.clone();
    tokio::spawn(async move {
        run_worker(store, service, run_id, request).await;
    });

    run_id
}

/// Request cancellation of a run. The worker observes the flip at its
/// next checkpoint; an oracle call already in flight completes first.
pub fn cancel_run(store: &RunStore, run_id: RunId) -> Result<docreview_shared::RunRecord> {
    store.cancel(run_id)
}

/// Drive one run to a terminal state. Never leaves the run `running`.
#[instrument(skip_all, fields(%run_id, mode = %request.mode))]
async fn run_worker(store: RunStore, service: Arc<ReviewService>, run_id: RunId, request: ReviewRequest) {
    let outcome = execute(&store, &service, run_id, request).await;

    match outcome {
        Ok(markdown) => {
            if store.is_canceled(run_id) {
                // Canceled while the last oracle call was in flight: the
                // result is discarded and no artifact is produced.
                store.add_event(run_id, EventKind::Info, "canceled");
                info!(%run_id, "run canceled after completion");
                return;
            }
            match store.finish_success(run_id, markdown) {
                Some(artifact_id) => {
                    store.add_event(run_id, EventKind::Info, "succeeded");
                    info!(%run_id, %artifact_id, "run succeeded");
                }
                None => {
                    store.add_event(run_id, EventKind::Info, "canceled");
                }
            }
        }
        Err(err) if err.is_canceled() => {
            store.set_status(run_id, docreview_shared::RunStatus::Canceled, None);
            store.add_event(run_id, EventKind::Info, "canceled");
            info!(%run_id, "run canceled");
        }
        Err(err) => {
            let description = err.to_string();
            store.set_status(
                run_id,
                docreview_shared::RunStatus::Failed,
                Some(description.clone()),
            );
            store.add_event(run_id, EventKind::Error, &description);
            info!(%run_id, error = %description, "run failed");
        }
    }
}

/// Resolve the document text and run the pipeline.
async fn execute(
    store: &RunStore,
    service: &ReviewService,
    run_id: RunId,
    request: ReviewRequest,
) -> Result<String> {
    let document = match &request.input {
        ReviewInput::Text(text) => text.clone(),
        ReviewInput::File(path) => {
            store.set_phase(run_id, RunPhase::Parsing);
            store.add_event(run_id, EventKind::Info, "parsing");
            load_document(path)?
        }
    };

    if document.trim().is_empty() {
        return Err(DocReviewError::validation("document is empty"));
    }

    let sink = StoreSink {
        store: store.clone(),
        run_id,
    };
    let cancel = StoreCancel {
        store: store.clone(),
        run_id,
    };

    service
        .review(request.mode, &request.language, &document, &sink, &cancel)
        .await
}
