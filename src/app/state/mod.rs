mod data;
mod layout;
mod system;

pub use data::DataState;
pub use layout::LayoutState;
pub use system::SystemState;

use std::collections::HashMap;
use std::path::PathBuf;

use crate::layout::{self as algebra, DividerInfo, Rect};
use crate::models::{next_pane_number, pane_name, session_name, Pane, PaneId, Session, SessionId};
use crate::persistence::{PersistedPane, PersistedSession, WorkspaceSnapshot, CURRENT_VERSION};

/// Everything the orchestrator owns for one project's workspace.
///
/// There is exactly one mutator: handlers take `&mut AppState` and leave the
/// tree, pane and session invariants intact before returning.
pub struct AppState {
    pub project_id: String,
    pub data: DataState,
    pub layout: LayoutState,
    pub system: SystemState,
}

impl AppState {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            data: DataState::new(),
            layout: LayoutState::new(),
            system: SystemState::new(),
        }
    }

    pub fn session(&self, id: SessionId) -> Option<&Session> {
        self.data.session(id)
    }

    pub fn session_mut(&mut self, id: SessionId) -> Option<&mut Session> {
        self.data.session_mut(id)
    }

    pub fn pane(&self, id: PaneId) -> Option<&Pane> {
        self.data.pane(id)
    }

    pub fn pane_mut(&mut self, id: PaneId) -> Option<&mut Pane> {
        self.data.pane_mut(id)
    }

    pub fn is_minimized(&self, pane_id: PaneId) -> bool {
        self.layout.is_minimized(pane_id)
    }

    /// Register a new auto-named session and return its id
    pub fn allocate_session(&mut self, cwd: PathBuf) -> SessionId {
        let name = session_name(self.system.next_session_number);
        self.allocate_named_session(name, cwd)
    }

    /// Register a session under an explicit name. The counter still advances so
    /// later auto names do not collide with the session's slot.
    pub fn allocate_named_session(&mut self, name: impl Into<String>, cwd: PathBuf) -> SessionId {
        self.system.next_session_number += 1;
        let session = Session::new(self.project_id.clone(), name, cwd);
        let id = session.id;
        self.data.sessions.push(session);
        id
    }

    /// "Pane N" with the smallest N not already taken
    pub fn next_pane_name(&self) -> String {
        pane_name(next_pane_number(self.data.panes.iter().map(|p| p.name.as_str())))
    }

    /// Tree-order pane ids, minimized panes included
    pub fn pane_ids(&self) -> Vec<PaneId> {
        algebra::pane_ids(self.layout.tree.as_ref())
    }

    /// Tree-order pane ids that are not minimized
    pub fn visible_pane_ids(&self) -> Vec<PaneId> {
        self.pane_ids()
            .into_iter()
            .filter(|id| !self.is_minimized(*id))
            .collect()
    }

    pub fn first_visible_pane(&self) -> Option<PaneId> {
        self.visible_pane_ids().into_iter().next()
    }

    pub fn bounds(&self) -> HashMap<PaneId, Rect> {
        algebra::bounds(self.layout.tree.as_ref(), &self.layout.minimized_pane_ids)
    }

    pub fn dividers(&self) -> Vec<DividerInfo> {
        algebra::dividers(self.layout.tree.as_ref(), &self.layout.minimized_pane_ids)
    }

    /// Drop a session record along with its transient flags
    pub fn forget_session(&mut self, id: SessionId) -> Option<Session> {
        self.system.busy_sessions.remove(&id);
        self.data.remove_session(id)
    }

    /// Remove a pane from the collection, the tree and the minimized set.
    ///
    /// If the pane held focus, focus moves to `focus_fallback` when given,
    /// otherwise to the first remaining pane in the collection.
    pub fn detach_pane(&mut self, pane_id: PaneId, focus_fallback: Option<PaneId>) -> Option<Pane> {
        let pos = self.data.panes.iter().position(|p| p.id == pane_id)?;
        let pane = self.data.panes.remove(pos);

        self.layout.tree = algebra::remove_pane(self.layout.tree.as_ref(), pane_id);
        self.layout.minimized_pane_ids.retain(|id| *id != pane_id);

        if self.layout.focused_pane_id == Some(pane_id) {
            self.layout.focused_pane_id = focus_fallback
                .filter(|id| self.data.has_pane(*id))
                .or_else(|| self.data.panes.first().map(|p| p.id));
        }
        Some(pane)
    }

    /// Serializable shape of the current workspace
    pub fn snapshot(&self) -> WorkspaceSnapshot {
        let panes = self
            .data
            .panes
            .iter()
            .map(|pane| PersistedPane {
                id: pane.id,
                name: pane.name.clone(),
                sessions: pane
                    .session_ids
                    .iter()
                    .filter_map(|sid| self.session(*sid))
                    .map(|s| PersistedSession {
                        name: s.name.clone(),
                        cwd: s.cwd.clone(),
                        worktree_label: s.worktree_label.clone(),
                    })
                    .collect(),
                active_index: pane.active_index(),
            })
            .collect();

        WorkspaceSnapshot {
            version: CURRENT_VERSION,
            panes,
            split_layout: self.layout.tree.clone(),
            focused_pane_id: self.layout.focused_pane_id,
            minimized_pane_ids: self.layout.minimized_pane_ids.clone(),
        }
    }

    /// Panics with a description of the first broken structural invariant
    #[cfg(test)]
    pub fn assert_consistent(&self) {
        use std::collections::HashSet;

        let tree_ids = self.pane_ids();
        let tree_set: HashSet<PaneId> = tree_ids.iter().copied().collect();
        assert_eq!(tree_ids.len(), tree_set.len(), "pane id repeated in tree");

        let pane_set: HashSet<PaneId> = self.data.panes.iter().map(|p| p.id).collect();
        assert_eq!(pane_set.len(), self.data.panes.len(), "pane id repeated in collection");
        assert_eq!(tree_set, pane_set, "tree leaves and pane collection differ");
        assert_eq!(self.layout.tree.is_none(), self.data.panes.is_empty());

        let mut owned = HashSet::new();
        for pane in &self.data.panes {
            assert!(!pane.is_empty(), "empty pane {} survived", pane.id);
            match pane.active_session_id {
                Some(active) => assert!(pane.contains(active)),
                None => panic!("pane {} has sessions but none active", pane.id),
            }
            for sid in &pane.session_ids {
                assert!(owned.insert(*sid), "session {} in two panes", sid);
                assert!(self.session(*sid).is_some(), "session {} has no record", sid);
            }
        }
        assert_eq!(owned.len(), self.data.sessions.len(), "orphan session record");

        for id in &self.layout.minimized_pane_ids {
            assert!(pane_set.contains(id), "minimized pane {} unknown", id);
        }
        if let Some(focused) = self.layout.focused_pane_id {
            assert!(pane_set.contains(&focused), "focus on unknown pane {}", focused);
        }
    }
}
