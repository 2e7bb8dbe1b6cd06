use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::session::SessionId;

pub type PaneId = Uuid;

/// A tile holding an ordered list of sessions, one of them active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pane {
    pub id: PaneId,
    pub name: String,
    pub session_ids: Vec<SessionId>,
    pub active_session_id: Option<SessionId>,
}

impl Pane {
    pub fn new(name: impl Into<String>, session_id: SessionId) -> Self {
        Self::with_id(Uuid::new_v4(), name, session_id)
    }

    pub fn with_id(id: PaneId, name: impl Into<String>, session_id: SessionId) -> Self {
        Self {
            id,
            name: name.into(),
            session_ids: vec![session_id],
            active_session_id: Some(session_id),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.session_ids.is_empty()
    }

    pub fn contains(&self, session_id: SessionId) -> bool {
        self.session_ids.contains(&session_id)
    }

    /// Append a session and make it active
    pub fn push_session(&mut self, session_id: SessionId) {
        if !self.contains(session_id) {
            self.session_ids.push(session_id);
        }
        self.active_session_id = Some(session_id);
    }

    /// Insert at `index` (clamped to the list length) and make it active
    pub fn insert_session(&mut self, index: usize, session_id: SessionId) {
        self.session_ids.retain(|id| *id != session_id);
        let index = index.min(self.session_ids.len());
        self.session_ids.insert(index, session_id);
        self.active_session_id = Some(session_id);
    }

    /// Remove a session. If it was active, the new last session becomes active.
    pub fn remove_session(&mut self, session_id: SessionId) -> bool {
        let Some(pos) = self.session_ids.iter().position(|id| *id == session_id) else {
            return false;
        };
        self.session_ids.remove(pos);
        if self.active_session_id == Some(session_id) {
            self.active_session_id = self.session_ids.last().copied();
        }
        true
    }

    /// Move a session within this pane's list
    pub fn reorder(&mut self, session_id: SessionId, to_index: usize) -> bool {
        let Some(from) = self.session_ids.iter().position(|id| *id == session_id) else {
            return false;
        };
        let to = to_index.min(self.session_ids.len() - 1);
        if from == to {
            return false;
        }
        let id = self.session_ids.remove(from);
        self.session_ids.insert(to, id);
        true
    }

    pub fn rename(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || name == self.name {
            return false;
        }
        self.name = name.to_string();
        true
    }

    /// Position of the active session, used when persisting
    pub fn active_index(&self) -> Option<usize> {
        let active = self.active_session_id?;
        self.session_ids.iter().position(|id| *id == active)
    }
}

pub fn pane_name(number: u32) -> String {
    format!("Pane {}", number)
}

/// Smallest positive number not already used by a "Pane N" name.
pub fn next_pane_number<'a>(names: impl IntoIterator<Item = &'a str>) -> u32 {
    let used: Vec<u32> = names
        .into_iter()
        .filter_map(|name| name.trim().strip_prefix("Pane "))
        .filter_map(|n| n.parse().ok())
        .collect();
    (1..).find(|n| !used.contains(n)).unwrap_or(1)
}
