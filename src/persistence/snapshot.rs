use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::layout::{SplitDirection, SplitNode};
use crate::models::PaneId;

pub const CURRENT_VERSION: u32 = 2;
pub const LEGACY_VERSION: u32 = 1;

/// Persisted workspace layout (schema version 2).
///
/// Only the shape is stored. Sessions are recreated on load with fresh ids and
/// no assistant binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceSnapshot {
    pub version: u32,
    pub panes: Vec<PersistedPane>,
    pub split_layout: Option<SplitNode>,
    pub focused_pane_id: Option<PaneId>,
    #[serde(default)]
    pub minimized_pane_ids: Vec<PaneId>,
}

impl WorkspaceSnapshot {
    pub fn empty() -> Self {
        Self {
            version: CURRENT_VERSION,
            panes: Vec::new(),
            split_layout: None,
            focused_pane_id: None,
            minimized_pane_ids: Vec::new(),
        }
    }

    pub fn pane_ids(&self) -> Vec<PaneId> {
        self.panes.iter().map(|p| p.id).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedPane {
    pub id: PaneId,
    pub name: String,
    pub sessions: Vec<PersistedSession>,
    #[serde(default)]
    pub active_index: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSession {
    pub name: String,
    pub cwd: PathBuf,
    #[serde(default)]
    pub worktree_label: Option<String>,
}

/// Version 1 layout. Minimized panes were cut out of the tree and the cut
/// recorded so they could be spliced back on restore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyWorkspace {
    pub version: u32,
    pub panes: Vec<PersistedPane>,
    pub split_layout: Option<SplitNode>,
    pub focused_pane_id: Option<PaneId>,
    #[serde(default)]
    pub minimized_panes: Vec<LegacyMinimizedPane>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyMinimizedPane {
    pub pane_id: PaneId,
    pub sibling_pane_id: Option<PaneId>,
    pub direction: SplitDirection,
    pub pane_was_first: bool,
}
