//! Checklist completion tracking.

use std::collections::{HashMap, HashSet};

use crate::plan::ChecklistItem;

/// Tracks which checklist items have been covered during a run.
///
/// The completion set only grows; marking is idempotent and unknown ids
/// are ignored. When the plan contains duplicate ids (a degenerate case
/// the plan generator warns about), the last occurrence is authoritative
/// for title lookup while all occurrences are preserved in plan order.
#[derive(Debug)]
pub struct CoverageTracker {
    items: Vec<ChecklistItem>,
    by_id: HashMap<String, ChecklistItem>,
    done: HashSet<String>,
}

impl CoverageTracker {
    /// Build a tracker over the plan's checklist.
    pub fn new(checklist: &[ChecklistItem]) -> Self {
        let by_id = checklist
            .iter()
            .map(|item| (item.id.clone(), item.clone()))
            .collect();
        Self {
            items: checklist.to_vec(),
            by_id,
            done: HashSet::new(),
        }
    }

    /// Mark `id` as done.
    ///
    /// Returns the item exactly on the first transition of a known id, so
    /// the caller can emit its "done" event once, ever. Repeats and
    /// unknown ids return `None` with no state change.
    pub fn mark_done(&mut self, id: &str) -> Option<&ChecklistItem> {
        if !self.by_id.contains_key(id) {
            return None;
        }
        if !self.done.insert(id.to_string()) {
            return None;
        }
        self.by_id.get(id)
    }

    /// Whether `id` has been marked done.
    pub fn is_done(&self, id: &str) -> bool {
        self.done.contains(id)
    }

    /// The checklist in plan order (duplicates preserved).
    pub fn checklist(&self) -> &[ChecklistItem] {
        &self.items
    }

    /// Number of distinct ids marked done.
    pub fn completed_count(&self) -> usize {
        self.done.len()
    }
}
