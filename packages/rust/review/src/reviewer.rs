//! Per-chunk review: one oracle call per chunk against the checklist.

use serde_json::Value;
use tracing::{debug, instrument};

use docreview_oracle::{ChatMessage, Oracle};
use docreview_shared::Result;

use crate::plan::ChecklistItem;

/// Findings for one chunk, plus the checklist ids the oracle reported
/// covering in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkReview {
    /// Checklist ids covered by this chunk, in the order the oracle
    /// returned them.
    pub covered: Vec<String>,
    /// Markdown findings for this chunk.
    pub markdown: String,
}

/// Outcome of parsing the oracle's chunk response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewOutcome {
    /// Parsed as the requested `{"covered": [...], "markdown": "..."}`.
    Structured(ChunkReview),
    /// Raw response treated as uncovered findings.
    Fallback(ChunkReview),
}

impl ReviewOutcome {
    /// The review, regardless of how it was obtained.
    pub fn into_review(self) -> ChunkReview {
        match self {
            Self::Structured(review) | Self::Fallback(review) => review,
        }
    }
}

/// Parse the oracle's chunk response. Never fails.
///
/// A JSON object with a string `markdown` field is accepted; `covered`
/// is filtered to string elements (empty when absent or mistyped).
/// Anything else degrades to the whole raw response as markdown with no
/// covered ids.
pub fn parse_chunk_response(raw: &str) -> ReviewOutcome {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(raw) {
        if let Some(Value::String(markdown)) = map.get("markdown") {
            let covered = match map.get("covered") {
                Some(Value::Array(elements)) => elements
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect(),
                _ => Vec::new(),
            };
            return ReviewOutcome::Structured(ChunkReview {
                covered,
                markdown: markdown.clone(),
            });
        }
    }

    ReviewOutcome::Fallback(ChunkReview {
        covered: Vec::new(),
        markdown: raw.to_string(),
    })
}

/// Render the checklist as one `- {id} {title}` line per item.
pub(crate) fn render_checklist(checklist: &[ChecklistItem]) -> String {
    checklist
        .iter()
        .map(|item| format!("- {} {}", item.id, item.title))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Review one chunk against the checklist.
///
/// `index` is 1-based; `total` is the chunk count for this run. Transport
/// errors propagate; malformed output never does.
#[instrument(skip_all, fields(index, total, chunk_chars = chunk.chars().count()))]
pub async fn review_chunk(
    oracle: &dyn Oracle,
    system_prompt: &str,
    language: &str,
    checklist: &[ChecklistItem],
    chunk: &str,
    index: usize,
    total: usize,
) -> Result<ChunkReview> {
    let system = ChatMessage::system(format!("{system_prompt}\n\nLanguage: {language}"));
    let user = ChatMessage::user(format!(
        "This is part {index}/{total} of the document.\n\
         Below is the overall review todo list; focus on finding issues and\n\
         suggestions in this part against those todos.\n\
         Output only JSON: {{\"covered\":[\"T1\"],\"markdown\":\"...\"}}.\n\
         `covered` lists the todo ids actually addressed in this part;\n\
         `markdown` holds the findings for this part.\n\n\
         Todo:\n{}\n\n\
         Content:\n{chunk}",
        render_checklist(checklist)
    ));

    let raw = oracle.invoke(&[system, user]).await?;

    let outcome = parse_chunk_response(&raw);
    if let ReviewOutcome::Fallback(review) = &outcome {
        debug!(
            chars = review.markdown.chars().count(),
            "chunk response not structured, treating as uncovered findings"
        );
    }
    Ok(outcome.into_review())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_response_parses() {
        let raw = r#"{"covered":["T1","T3"],"markdown":"findings"}"#;
        let review = parse_chunk_response(raw).into_review();
        assert_eq!(review.covered, vec!["T1", "T3"]);
        assert_eq!(review.markdown, "findings");
    }

    #[test]
    fn covered_filtered_to_strings() {
        let raw = r#"{"covered":["T1",2,null],"markdown":"m"}"#;
        let review = parse_chunk_response(raw).into_review();
        assert_eq!(review.covered, vec!["T1"]);
    }

    #[test]
    fn missing_covered_is_empty() {
        let raw = r#"{"markdown":"m"}"#;
        let review = parse_chunk_response(raw).into_review();
        assert!(review.covered.is_empty());
        assert_eq!(review.markdown, "m");
    }

    #[test]
    fn mistyped_covered_is_empty() {
        let raw = r#"{"covered":"T1","markdown":"m"}"#;
        let review = parse_chunk_response(raw).into_review();
        assert!(review.covered.is_empty());
    }

    #[test]
    fn non_string_markdown_falls_back_to_raw() {
        let raw = r#"{"covered":["T1"],"markdown":7}"#;
        let outcome = parse_chunk_response(raw);
        match outcome {
            ReviewOutcome::Fallback(review) => {
                assert!(review.covered.is_empty());
                assert_eq!(review.markdown, raw);
            }
            other => panic!("expected fallback, got {other:?}"),
        }
    }

    #[test]
    fn free_text_falls_back_to_raw() {
        let raw = "The chunk looks fine overall.";
        let review = parse_chunk_response(raw).into_review();
        assert!(review.covered.is_empty());
        assert_eq!(review.markdown, raw);
    }

    #[test]
    fn checklist_renders_one_line_per_item() {
        let checklist = vec![
            ChecklistItem {
                id: "T1".into(),
                title: "scope".into(),
            },
            ChecklistItem {
                id: "T2".into(),
                title: "risks".into(),
            },
        ];
        assert_eq!(render_checklist(&checklist), "- T1 scope\n- T2 risks");
    }
}
