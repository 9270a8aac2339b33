//! Back-navigation via structural snapshots.
//!
//! Every successful submission pushes a full copy of the pre-submission
//! state. Going back pops one entry and restores it wholesale, which
//! also un-terminates a finished session. Display overrides live
//! outside [`SessionState`] and are untouched by restores.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::session::SessionState;

/// One history entry: the state as it was before a submission, plus
/// what was submitted (for audit display).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Phase name or qid the submission answered.
    pub label: String,
    pub submitted: Value,
    state: SessionState,
}

/// A stack of pre-submission snapshots.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionHistory {
    entries: Vec<HistoryEntry>,
}

impl SessionHistory {
    pub fn new() -> Self {
        SessionHistory::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record the state as it stands before a submission mutates it.
    pub fn push_snapshot(&mut self, label: impl Into<String>, submitted: &Value, state: &SessionState) {
        self.entries.push(HistoryEntry {
            label: label.into(),
            submitted: submitted.clone(),
            state: state.clone(),
        });
    }

    /// Discard the most recent snapshot. Used when the submission it
    /// was taken for turns out to be invalid.
    pub fn discard_last(&mut self) {
        self.entries.pop();
    }

    /// Restore the most recent snapshot into `state`. Returns false and
    /// leaves `state` untouched when there is nothing to go back to.
    pub fn pop_restore(&mut self, state: &mut SessionState) -> bool {
        match self.entries.pop() {
            Some(entry) => {
                *state = entry.state;
                state.terminated = false;
                state.result = None;
                true
            }
            None => false,
        }
    }

    /// Submission labels, oldest first.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.label.as_str())
    }
}
