use crate::models::{Pane, PaneId, Session, SessionId};

/// Flat session registry plus the pane collection
pub struct DataState {
    pub sessions: Vec<Session>,
    pub panes: Vec<Pane>,
}

impl DataState {
    pub fn new() -> Self {
        Self {
            sessions: Vec::new(),
            panes: Vec::new(),
        }
    }

    pub fn session(&self, id: SessionId) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn session_mut(&mut self, id: SessionId) -> Option<&mut Session> {
        self.sessions.iter_mut().find(|s| s.id == id)
    }

    pub fn remove_session(&mut self, id: SessionId) -> Option<Session> {
        let pos = self.sessions.iter().position(|s| s.id == id)?;
        Some(self.sessions.remove(pos))
    }

    pub fn pane(&self, id: PaneId) -> Option<&Pane> {
        self.panes.iter().find(|p| p.id == id)
    }

    pub fn pane_mut(&mut self, id: PaneId) -> Option<&mut Pane> {
        self.panes.iter_mut().find(|p| p.id == id)
    }

    pub fn has_pane(&self, id: PaneId) -> bool {
        self.panes.iter().any(|p| p.id == id)
    }
}

impl Default for DataState {
    fn default() -> Self {
        Self::new()
    }
}
