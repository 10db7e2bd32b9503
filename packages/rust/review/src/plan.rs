//! Checklist planning: one oracle call deriving the review checklist.

use serde_json::Value;
use tracing::{debug, instrument, warn};

use docreview_oracle::{ChatMessage, Oracle};
use docreview_shared::Result;

/// Only the head of the document is sent when planning.
pub const PLAN_DOCUMENT_LIMIT: usize = 6000;

/// Maximum number of checklist items salvaged from free-form output.
pub const FALLBACK_LINE_LIMIT: usize = 10;

/// A single review checklist item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistItem {
    /// Short unique id, e.g. `T1`.
    pub id: String,
    /// Short review todo title.
    pub title: String,
}

/// Outcome of parsing the oracle's plan response.
///
/// Malformed output is a branch, not an error: the caller always gets a
/// checklist (possibly empty), and can see which path produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanOutcome {
    /// The response parsed as the requested JSON array.
    Structured(Vec<ChecklistItem>),
    /// Line-based salvage of free-form output.
    Fallback(Vec<ChecklistItem>),
}

impl PlanOutcome {
    /// The checklist, regardless of how it was obtained.
    pub fn into_items(self) -> Vec<ChecklistItem> {
        match self {
            Self::Structured(items) | Self::Fallback(items) => items,
        }
    }
}

/// Parse the oracle's plan response. Never fails.
///
/// Accepts a JSON array whose elements are plain strings (auto-numbered
/// `T1, T2, …` by array position) or objects with non-empty string `id`
/// and `title`. Elements failing validation are dropped. If no valid
/// items result, falls back to non-blank lines with a leading `- ` bullet
/// stripped, capped at [`FALLBACK_LINE_LIMIT`], ids `T1..Tn` in order.
pub fn parse_plan_response(raw: &str) -> PlanOutcome {
    if let Ok(Value::Array(elements)) = serde_json::from_str::<Value>(raw) {
        let mut items: Vec<ChecklistItem> = Vec::new();
        for (idx, element) in elements.iter().enumerate() {
            let item = match element {
                Value::String(title) => Some(ChecklistItem {
                    id: format!("T{}", idx + 1),
                    title: title.trim().to_string(),
                }),
                Value::Object(map) => match (map.get("id"), map.get("title")) {
                    (Some(Value::String(id)), Some(Value::String(title))) => Some(ChecklistItem {
                        id: id.trim().to_string(),
                        title: title.trim().to_string(),
                    }),
                    _ => None,
                },
                _ => None,
            };
            if let Some(item) = item {
                if !item.id.is_empty() && !item.title.is_empty() {
                    items.push(item);
                }
            }
        }
        if !items.is_empty() {
            return PlanOutcome::Structured(items);
        }
    }

    let items = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.strip_prefix("- ").unwrap_or(line).trim())
        .filter(|title| !title.is_empty())
        .take(FALLBACK_LINE_LIMIT)
        .enumerate()
        .map(|(idx, title)| ChecklistItem {
            id: format!("T{}", idx + 1),
            title: title.to_string(),
        })
        .collect();
    PlanOutcome::Fallback(items)
}

/// Take the first `limit` characters of `text`.
fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Ask the oracle for a review checklist derived from the document head.
///
/// Transport errors propagate; malformed output never does. Duplicate ids
/// are preserved (they still get their own "pending" events downstream)
/// but flagged, since later components resolve titles by last occurrence.
#[instrument(skip_all, fields(language = %language, document_chars = document.chars().count()))]
pub async fn generate_plan(
    oracle: &dyn Oracle,
    system_prompt: &str,
    language: &str,
    document: &str,
) -> Result<Vec<ChecklistItem>> {
    let system = ChatMessage::system(format!(
        "{system_prompt}\n\n\
         Before reviewing, produce a plan of review todos for this document.\n\
         Output a JSON array of objects: {{\"id\":\"T1\",\"title\":\"...\"}}.\n\
         Ids must be short and unique (T1/T2/...). Titles are short review todos.\n\
         Output only the JSON array, nothing else."
    ));
    let user = ChatMessage::user(format!(
        "Language: {language}\n\nDocument:\n{}",
        truncate_chars(document, PLAN_DOCUMENT_LIMIT)
    ));

    let raw = oracle.invoke(&[system, user]).await?;

    let outcome = parse_plan_response(&raw);
    let items = match &outcome {
        PlanOutcome::Structured(items) => {
            debug!(items = items.len(), "plan parsed as structured JSON");
            items
        }
        PlanOutcome::Fallback(items) => {
            debug!(items = items.len(), "plan salvaged from free-form output");
            items
        }
    };

    let mut seen = std::collections::HashSet::new();
    for item in items {
        if !seen.insert(item.id.as_str()) {
            warn!(id = %item.id, "duplicate checklist id in plan, last title wins");
        }
    }

    Ok(outcome.into_items())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_objects_parse() {
        let raw = r#"[{"id":"T1","title":"scope"},{"id":"T2","title":"risks"}]"#;
        let outcome = parse_plan_response(raw);
        assert_eq!(
            outcome,
            PlanOutcome::Structured(vec![
                ChecklistItem {
                    id: "T1".into(),
                    title: "scope".into()
                },
                ChecklistItem {
                    id: "T2".into(),
                    title: "risks".into()
                },
            ])
        );
    }

    #[test]
    fn plain_strings_auto_number_by_position() {
        let raw = r#"["first", "second"]"#;
        let items = parse_plan_response(raw).into_items();
        assert_eq!(items[0].id, "T1");
        assert_eq!(items[1].id, "T2");
        assert_eq!(items[1].title, "second");
    }

    #[test]
    fn invalid_elements_dropped_but_positions_kept() {
        // The number element is dropped; the string at index 2 still gets T3.
        let raw = r#"["first", 42, "third"]"#;
        let items = parse_plan_response(raw).into_items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].id, "T3");
        assert_eq!(items[1].title, "third");
    }

    #[test]
    fn whitespace_trimmed_and_empty_dropped() {
        let raw = r#"[{"id":"  T1 ","title":" scope "},{"id":"T2","title":"  "}]"#;
        let items = parse_plan_response(raw).into_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "T1");
        assert_eq!(items[0].title, "scope");
    }

    #[test]
    fn fallback_strips_bullets() {
        let outcome = parse_plan_response("- a\n- b");
        assert_eq!(
            outcome,
            PlanOutcome::Fallback(vec![
                ChecklistItem {
                    id: "T1".into(),
                    title: "a".into()
                },
                ChecklistItem {
                    id: "T2".into(),
                    title: "b".into()
                },
            ])
        );
    }

    #[test]
    fn fallback_caps_at_ten_lines() {
        let raw = (1..=15).map(|i| format!("item {i}\n")).collect::<String>();
        let items = parse_plan_response(&raw).into_items();
        assert_eq!(items.len(), FALLBACK_LINE_LIMIT);
        assert_eq!(items[0].id, "T1");
        assert_eq!(items[9].id, "T10");
        assert_eq!(items[9].title, "item 10");
    }

    #[test]
    fn fallback_skips_blank_lines() {
        let items = parse_plan_response("a\n\n\nb\n").into_items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].title, "b");
    }

    #[test]
    fn empty_output_gives_empty_checklist() {
        assert_eq!(parse_plan_response(""), PlanOutcome::Fallback(vec![]));
        assert_eq!(parse_plan_response("   \n\n"), PlanOutcome::Fallback(vec![]));
    }

    #[test]
    fn empty_json_array_salvages_its_own_text() {
        // An empty array is an empty result, so the line fallback applies
        // and the literal text becomes the single salvaged item.
        assert_eq!(
            parse_plan_response("[]"),
            PlanOutcome::Fallback(vec![ChecklistItem {
                id: "T1".into(),
                title: "[]".into(),
            }])
        );
    }

    #[test]
    fn json_object_root_falls_back_to_lines() {
        let outcome = parse_plan_response(r#"{"id":"T1","title":"x"}"#);
        assert!(matches!(outcome, PlanOutcome::Fallback(_)));
    }

    #[test]
    fn truncate_chars_is_char_safe() {
        assert_eq!(truncate_chars("日本語テキスト", 3), "日本語");
        assert_eq!(truncate_chars("ab", 10), "ab");
    }
}
