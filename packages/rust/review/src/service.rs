//! In-pipeline orchestration: plan → chunk → review loop → finalize.

use std::sync::Arc;

use tracing::{info, instrument};

use docreview_oracle::Oracle;
use docreview_shared::{DocReviewError, EventKind, Mode, Result, RunPhase};

use crate::chunk::split_chunks;
use crate::coverage::CoverageTracker;
use crate::finalize::finalize;
use crate::plan::generate_plan;
use crate::prompts::prompt_text;
use crate::reviewer::review_chunk;

// ---------------------------------------------------------------------------
// Observer seams
// ---------------------------------------------------------------------------

/// Receiver for pipeline progress.
///
/// `phase_changed` has a no-op default so observers that only care about
/// events (or nothing at all) stay small.
pub trait EventSink: Send + Sync {
    /// Called for every progress event, in emission order.
    fn emit(&self, kind: EventKind, message: &str);

    /// Called when the pipeline moves to a new phase.
    fn phase_changed(&self, _phase: RunPhase) {}
}

/// No-op event sink for headless/test usage.
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _kind: EventKind, _message: &str) {}
}

/// Cooperative cancellation signal, polled at the pipeline checkpoints.
pub trait CancelSignal: Send + Sync {
    /// Whether cancellation has been requested.
    fn is_canceled(&self) -> bool;
}

/// Cancellation signal that never fires.
pub struct NeverCancel;

impl CancelSignal for NeverCancel {
    fn is_canceled(&self) -> bool {
        false
    }
}

/// Return [`DocReviewError::Canceled`] if cancellation has been requested.
fn checkpoint(cancel: &dyn CancelSignal) -> Result<()> {
    if cancel.is_canceled() {
        Err(DocReviewError::Canceled)
    } else {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Stateless driver of the review pipeline for one document.
///
/// Holds no per-run state; a single service can serve many concurrent runs.
/// Oracle calls within one `review` invocation are awaited sequentially,
/// which keeps event emission and partial-finding order deterministic.
pub struct ReviewService {
    oracle: Arc<dyn Oracle>,
    max_chars_per_chunk: usize,
}

impl ReviewService {
    /// Build a service over the given oracle.
    pub fn new(oracle: Arc<dyn Oracle>, max_chars_per_chunk: usize) -> Self {
        Self {
            oracle,
            max_chars_per_chunk,
        }
    }

    /// Run the full pipeline and return the final review Markdown.
    ///
    /// Emits `info`/`todo` events through `events` at every phase
    /// boundary, chunk, and newly completed checklist item. Cancellation
    /// is observed at three checkpoints: after planning, before each
    /// chunk, and before finalization; it surfaces as
    /// [`DocReviewError::Canceled`]. Oracle transport errors propagate
    /// unmodified; malformed oracle output never escapes the planning and
    /// chunk-review parsers. A zero chunk size is rejected up front as a
    /// validation error, before any oracle call.
    #[instrument(skip_all, fields(mode = %mode, language = %language, document_chars = document.chars().count()))]
    pub async fn review(
        &self,
        mode: Mode,
        language: &str,
        document: &str,
        events: &dyn EventSink,
        cancel: &dyn CancelSignal,
    ) -> Result<String> {
        if self.max_chars_per_chunk == 0 {
            return Err(DocReviewError::validation(
                "max_chars_per_chunk must be at least 1",
            ));
        }

        let prompt = prompt_text(mode);

        events.phase_changed(RunPhase::Planning);
        events.emit(EventKind::Info, "planning");
        let checklist = generate_plan(self.oracle.as_ref(), prompt, language, document).await?;
        for item in &checklist {
            events.emit(
                EventKind::Todo,
                &format!("[pending] {} {}", item.id, item.title),
            );
        }

        checkpoint(cancel)?;

        let chunks = split_chunks(document, self.max_chars_per_chunk);
        let total = chunks.len();
        info!(items = checklist.len(), chunks = total, "plan ready");

        let mut tracker = CoverageTracker::new(&checklist);
        let mut partials: Vec<String> = Vec::with_capacity(total);

        events.phase_changed(RunPhase::Executing);
        for (idx, chunk) in chunks.iter().enumerate() {
            checkpoint(cancel)?;
            events.emit(EventKind::Info, &format!("executing {}/{}", idx + 1, total));

            let review = review_chunk(
                self.oracle.as_ref(),
                prompt,
                language,
                &checklist,
                chunk,
                idx + 1,
                total,
            )
            .await?;
            partials.push(review.markdown);

            for id in &review.covered {
                if let Some(item) = tracker.mark_done(id) {
                    events.emit(
                        EventKind::Todo,
                        &format!("[done] {} {}", item.id, item.title),
                    );
                }
            }
        }

        checkpoint(cancel)?;

        events.phase_changed(RunPhase::Producing);
        events.emit(EventKind::Info, "producing");
        let result = finalize(self.oracle.as_ref(), prompt, language, &tracker, &partials).await?;

        info!(
            completed = tracker.completed_count(),
            items = checklist.len(),
            "review complete"
        );
        Ok(result)
    }
}
