//! Resume history persisted per project.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::models::{ResumeHistory, ResumeHistoryEntry, Session, RESUME_HISTORY_CAP};
use crate::persistence::Store;

pub struct ResumeHistoryStore {
    store: Arc<dyn Store>,
    cap: usize,
}

impl ResumeHistoryStore {
    pub fn new(store: Arc<dyn Store>, cap: usize) -> Self {
        Self {
            store,
            cap: cap.max(1),
        }
    }

    pub fn with_default_cap(store: Arc<dyn Store>) -> Self {
        Self::new(store, RESUME_HISTORY_CAP)
    }

    fn load(&self, project_id: &str) -> ResumeHistory {
        match self.store.load_resume_history(project_id) {
            Ok(entries) => ResumeHistory::from_entries(entries),
            Err(e) => {
                warn!(project = %project_id, "failed to read resume history: {}", e);
                ResumeHistory::default()
            }
        }
    }

    fn save(&self, project_id: &str, history: &ResumeHistory) {
        if let Err(e) = self.store.save_resume_history(project_id, history.entries()) {
            warn!(project = %project_id, "failed to write resume history: {}", e);
        }
    }

    /// Dedup, append and cap, then write through. The write is synchronous so
    /// the same call serves the exit-time flush.
    pub fn append(&self, project_id: &str, entry: ResumeHistoryEntry) {
        let mut history = self.load(project_id);
        debug!(project = %project_id, assistant = %entry.bound_assistant_id, "resume history append");
        history.push(entry, self.cap);
        self.save(project_id, &history);
    }

    /// Record a session's current or preserved assistant binding, if it has one
    pub fn record_session(&self, session: &Session) -> bool {
        let Some(assistant_id) = session.resumable_assistant_id() else {
            return false;
        };
        self.append(
            &session.project_id,
            ResumeHistoryEntry {
                bound_assistant_id: assistant_id.to_string(),
                session_name: session.name.clone(),
                last_title: session.last_assistant_title.clone(),
                closed_at: Utc::now(),
            },
        );
        true
    }

    /// Entries newest first
    pub fn list(&self, project_id: &str) -> Vec<ResumeHistoryEntry> {
        self.load(project_id).newest_first()
    }

    pub fn remove(&self, project_id: &str, bound_assistant_id: &str) -> bool {
        let mut history = self.load(project_id);
        if !history.remove(bound_assistant_id) {
            return false;
        }
        self.save(project_id, &history);
        true
    }
}
