//! Final report synthesis: one oracle call over all partial findings.

use tracing::instrument;

use docreview_oracle::{ChatMessage, Oracle};
use docreview_shared::Result;

use crate::coverage::CoverageTracker;

/// Render the checklist with completion marks, in checklist order.
fn render_completion(tracker: &CoverageTracker) -> String {
    tracker
        .checklist()
        .iter()
        .map(|item| {
            let mark = if tracker.is_done(&item.id) { 'x' } else { ' ' };
            format!("- [{mark}] {} {}", item.id, item.title)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Synthesize the final review from the checklist state and all partial
/// findings, concatenated in chunk order. The oracle's raw text response
/// is the terminal output of the pipeline and is returned verbatim.
#[instrument(skip_all, fields(items = tracker.checklist().len(), partials = partials.len()))]
pub async fn finalize(
    oracle: &dyn Oracle,
    system_prompt: &str,
    language: &str,
    tracker: &CoverageTracker,
    partials: &[String],
) -> Result<String> {
    let system = ChatMessage::system(format!("{system_prompt}\n\nLanguage: {language}"));
    let user = ChatMessage::user(format!(
        "Based on the review todos and the per-part findings, produce the\n\
         final review Markdown. It must follow the system prompt.\n\n\
         Todo:\n{}\n\n\
         Findings:\n{}",
        render_completion(tracker),
        partials.join("\n\n")
    ));

    oracle.invoke(&[system, user]).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::ChecklistItem;

    #[test]
    fn completion_marks_follow_checklist_order() {
        let plan = vec![
            ChecklistItem {
                id: "T1".into(),
                title: "scope".into(),
            },
            ChecklistItem {
                id: "T2".into(),
                title: "risks".into(),
            },
        ];
        let mut tracker = CoverageTracker::new(&plan);
        tracker.mark_done("T2");
        assert_eq!(
            render_completion(&tracker),
            "- [ ] T1 scope\n- [x] T2 risks"
        );
    }

    #[test]
    fn empty_checklist_renders_empty() {
        let tracker = CoverageTracker::new(&[]);
        assert_eq!(render_completion(&tracker), "");
    }
}
