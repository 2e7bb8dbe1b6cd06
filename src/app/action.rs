use crate::layout::{SplitDirection, SplitPath};
use crate::models::{BindingEvent, PaneId, SessionId};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub enum Action {
    // Session operations
    CreateFirstSession {
        cwd: PathBuf,
    },
    CreateSessionInPane {
        pane_id: PaneId,
        cwd: PathBuf,
    },
    ResumeSessionInPane {
        pane_id: PaneId,
        cwd: PathBuf,
        assistant_id: String,
    },
    CloseSessionInPane {
        pane_id: PaneId,
        session_id: SessionId,
    },
    /// Drop onto another pane's tab strip (or reorder within one)
    MoveSessionToPane {
        session_id: SessionId,
        source_pane_id: PaneId,
        target_pane_id: PaneId,
        to_index: usize,
    },
    /// Drop onto an edge of another pane's content area
    MoveSessionToNewSplit {
        session_id: SessionId,
        source_pane_id: PaneId,
        target_pane_id: PaneId,
        direction: SplitDirection,
        new_pane_first: bool,
    },
    ReorderSession {
        pane_id: PaneId,
        session_id: SessionId,
        to_index: usize,
    },
    RenameSession {
        session_id: SessionId,
        name: String,
    },
    SetWorktreeLabel {
        session_id: SessionId,
        label: Option<String>,
    },

    // Terminal pass-through
    SendInput(SessionId, Vec<u8>),
    ResizeSession {
        session_id: SessionId,
        rows: u16,
        cols: u16,
    },

    // Pane operations
    SplitPane {
        direction: SplitDirection,
        cwd: PathBuf,
    },
    ClosePane(PaneId),
    MinimizePane(PaneId),
    RestorePane(PaneId),
    UpdateSplitRatio {
        path: SplitPath,
        ratio: f64,
    },
    RenamePane {
        pane_id: PaneId,
        name: String,
    },
    FocusPane(PaneId),
    CycleFocus {
        forward: bool,
    },

    // Assistant lifecycle
    Binding {
        session_id: SessionId,
        event: BindingEvent,
    },
    AssistantActivity {
        session_id: SessionId,
        title: Option<String>,
        busy: bool,
    },
}
