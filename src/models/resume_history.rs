use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum entries kept per project
pub const RESUME_HISTORY_CAP: usize = 50;

/// A previously bound assistant session that can be offered for resume
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeHistoryEntry {
    pub bound_assistant_id: String,
    pub session_name: String,
    #[serde(default)]
    pub last_title: Option<String>,
    pub closed_at: DateTime<Utc>,
}

impl ResumeHistoryEntry {
    pub fn new(
        bound_assistant_id: impl Into<String>,
        session_name: impl Into<String>,
        last_title: Option<String>,
    ) -> Self {
        Self {
            bound_assistant_id: bound_assistant_id.into(),
            session_name: session_name.into(),
            last_title,
            closed_at: Utc::now(),
        }
    }
}

/// Ordered oldest to newest, unique by `bound_assistant_id`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResumeHistory {
    entries: Vec<ResumeHistoryEntry>,
}

impl ResumeHistory {
    pub fn from_entries(entries: Vec<ResumeHistoryEntry>) -> Self {
        Self { entries }
    }

    /// Dedup by assistant id, then drop from the front down to `cap`.
    pub fn push(&mut self, entry: ResumeHistoryEntry, cap: usize) {
        self.entries
            .retain(|e| e.bound_assistant_id != entry.bound_assistant_id);
        self.entries.push(entry);
        if self.entries.len() > cap {
            let excess = self.entries.len() - cap;
            self.entries.drain(..excess);
        }
    }

    pub fn remove(&mut self, bound_assistant_id: &str) -> bool {
        let before = self.entries.len();
        self.entries
            .retain(|e| e.bound_assistant_id != bound_assistant_id);
        self.entries.len() != before
    }

    pub fn entries(&self) -> &[ResumeHistoryEntry] {
        &self.entries
    }

    pub fn newest_first(&self) -> Vec<ResumeHistoryEntry> {
        self.entries.iter().rev().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
