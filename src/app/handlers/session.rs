use std::path::PathBuf;
use tracing::{debug, warn};

use crate::app::process_ops::{resize_session, start_session, stop_session, write_input};
use crate::app::{Action, AppState, Services};
use crate::layout::{split_pane_node_at, SplitDirection, SplitNode};
use crate::models::{Pane, PaneId, SessionId};
use crate::terminal::StartRequest;

/// Returns true when persisted workspace state changed
pub fn handle_session_action(state: &mut AppState, action: Action, services: &Services) -> bool {
    match action {
        Action::CreateFirstSession { cwd } => create_first_session(state, cwd, services),
        Action::CreateSessionInPane { pane_id, cwd } => {
            create_session_in_pane(state, pane_id, cwd, None, services).is_some()
        }
        Action::ResumeSessionInPane {
            pane_id,
            cwd,
            assistant_id,
        } => resume_session_in_pane(state, pane_id, cwd, assistant_id, services),
        Action::CloseSessionInPane { pane_id, session_id } => {
            close_session_in_pane(state, pane_id, session_id, services)
        }
        Action::MoveSessionToPane {
            session_id,
            source_pane_id,
            target_pane_id,
            to_index,
        } => move_session_to_pane(state, session_id, source_pane_id, target_pane_id, to_index),
        Action::MoveSessionToNewSplit {
            session_id,
            source_pane_id,
            target_pane_id,
            direction,
            new_pane_first,
        } => move_session_to_new_split(
            state,
            session_id,
            source_pane_id,
            target_pane_id,
            direction,
            new_pane_first,
        ),
        Action::ReorderSession {
            pane_id,
            session_id,
            to_index,
        } => reorder_session(state, pane_id, session_id, to_index),
        Action::RenameSession { session_id, name } => rename_session(state, session_id, &name),
        Action::SetWorktreeLabel { session_id, label } => {
            set_worktree_label(state, session_id, label.as_deref())
        }
        Action::SendInput(session_id, data) => {
            if state.session(session_id).is_some() {
                write_input(services.terminal.as_ref(), session_id, &data);
            } else {
                warn!(session = %session_id, "input for unknown session dropped");
            }
            false
        }
        Action::ResizeSession {
            session_id,
            rows,
            cols,
        } => {
            if state.session(session_id).is_some() {
                resize_session(services.terminal.as_ref(), session_id, rows, cols);
            } else {
                warn!(session = %session_id, "resize for unknown session dropped");
            }
            false
        }
        _ => false,
    }
}

/// Seed an empty workspace with one pane holding one session
pub fn create_first_session(state: &mut AppState, cwd: PathBuf, services: &Services) -> bool {
    if !state.data.panes.is_empty() || state.layout.tree.is_some() {
        warn!(project = %state.project_id, "workspace already has panes; first session not created");
        return false;
    }

    let session_id = state.allocate_session(cwd.clone());
    let pane = Pane::new(state.next_pane_name(), session_id);
    let pane_id = pane.id;
    state.data.panes.push(pane);
    state.layout.tree = Some(SplitNode::leaf(pane_id));
    state.layout.focused_pane_id = Some(pane_id);

    start_session(services.terminal.as_ref(), &StartRequest::new(session_id, cwd));
    true
}

/// Append a new active session to an existing pane and focus that pane.
/// Unknown panes are rejected before any session is allocated.
pub fn create_session_in_pane(
    state: &mut AppState,
    pane_id: PaneId,
    cwd: PathBuf,
    resume_assistant_id: Option<String>,
    services: &Services,
) -> Option<SessionId> {
    if !state.data.has_pane(pane_id) {
        warn!(pane = %pane_id, "create session: unknown pane");
        return None;
    }

    let session_id = state.allocate_session(cwd.clone());
    if let Some(assistant_id) = &resume_assistant_id {
        if let Some(session) = state.session_mut(session_id) {
            session.last_bound_assistant_id = Some(assistant_id.clone());
        }
    }
    if let Some(pane) = state.pane_mut(pane_id) {
        pane.push_session(session_id);
    }
    state.layout.focused_pane_id = Some(pane_id);

    let request = StartRequest {
        resume_assistant_id,
        ..StartRequest::new(session_id, cwd)
    };
    start_session(services.terminal.as_ref(), &request);
    Some(session_id)
}

/// Open a session that resumes an assistant conversation from history
pub fn resume_session_in_pane(
    state: &mut AppState,
    pane_id: PaneId,
    cwd: PathBuf,
    assistant_id: String,
    services: &Services,
) -> bool {
    let created = create_session_in_pane(state, pane_id, cwd, Some(assistant_id.clone()), services);
    if created.is_none() {
        return false;
    }
    services.history.remove(&state.project_id, &assistant_id);
    true
}

pub fn close_session_in_pane(
    state: &mut AppState,
    pane_id: PaneId,
    session_id: SessionId,
    services: &Services,
) -> bool {
    let Some(pane) = state.pane(pane_id) else {
        warn!(pane = %pane_id, "close session: unknown pane");
        return false;
    };
    if !pane.contains(session_id) {
        warn!(pane = %pane_id, session = %session_id, "close session: not in pane");
        return false;
    }

    if let Some(session) = state.session(session_id) {
        services.history.record_session(session);
    }
    stop_session(services.terminal.as_ref(), session_id);

    let now_empty = match state.pane_mut(pane_id) {
        Some(pane) => {
            pane.remove_session(session_id);
            pane.is_empty()
        }
        None => false,
    };
    state.forget_session(session_id);

    if now_empty {
        debug!(pane = %pane_id, "last session closed; removing pane");
        state.detach_pane(pane_id, None);
    }
    true
}

/// Move a session onto another pane's tab strip at `to_index`.
/// Moving within the same pane is a reorder.
pub fn move_session_to_pane(
    state: &mut AppState,
    session_id: SessionId,
    source_pane_id: PaneId,
    target_pane_id: PaneId,
    to_index: usize,
) -> bool {
    if source_pane_id == target_pane_id {
        return reorder_session(state, source_pane_id, session_id, to_index);
    }
    if !check_move(state, session_id, source_pane_id, target_pane_id) {
        return false;
    }

    let source_empty = match state.pane_mut(source_pane_id) {
        Some(source) => {
            source.remove_session(session_id);
            source.is_empty()
        }
        None => false,
    };
    if let Some(target) = state.pane_mut(target_pane_id) {
        target.insert_session(to_index, session_id);
    }

    if source_empty {
        state.detach_pane(source_pane_id, Some(target_pane_id));
    }
    true
}

/// Move a session into a brand-new pane split next to `target_pane_id`
pub fn move_session_to_new_split(
    state: &mut AppState,
    session_id: SessionId,
    source_pane_id: PaneId,
    target_pane_id: PaneId,
    direction: SplitDirection,
    new_pane_first: bool,
) -> bool {
    if !check_move(state, session_id, source_pane_id, target_pane_id) {
        return false;
    }
    let in_tree = state
        .layout
        .tree
        .as_ref()
        .is_some_and(|tree| tree.contains(target_pane_id));
    if !in_tree {
        warn!(pane = %target_pane_id, "move to split: target pane not in layout");
        return false;
    }
    if source_pane_id == target_pane_id
        && state.pane(source_pane_id).is_some_and(|p| p.session_ids.len() == 1)
    {
        debug!(pane = %source_pane_id, "move to split: pane would split against itself");
        return false;
    }

    let source_empty = match state.pane_mut(source_pane_id) {
        Some(source) => {
            source.remove_session(session_id);
            source.is_empty()
        }
        None => false,
    };
    if source_empty {
        state.detach_pane(source_pane_id, Some(target_pane_id));
    }

    let pane = Pane::new(state.next_pane_name(), session_id);
    let new_pane_id = pane.id;
    state.layout.tree = split_pane_node_at(
        state.layout.tree.as_ref(),
        target_pane_id,
        new_pane_id,
        direction,
        new_pane_first,
    );
    state.data.panes.push(pane);
    state.layout.focused_pane_id = Some(new_pane_id);
    true
}

fn check_move(
    state: &AppState,
    session_id: SessionId,
    source_pane_id: PaneId,
    target_pane_id: PaneId,
) -> bool {
    let Some(source) = state.pane(source_pane_id) else {
        warn!(pane = %source_pane_id, "move session: unknown source pane");
        return false;
    };
    if !source.contains(session_id) {
        warn!(pane = %source_pane_id, session = %session_id, "move session: not in source pane");
        return false;
    }
    if !state.data.has_pane(target_pane_id) {
        warn!(pane = %target_pane_id, "move session: unknown target pane");
        return false;
    }
    true
}

pub fn reorder_session(state: &mut AppState, pane_id: PaneId, session_id: SessionId, to_index: usize) -> bool {
    match state.pane_mut(pane_id) {
        Some(pane) => pane.reorder(session_id, to_index),
        None => {
            warn!(pane = %pane_id, "reorder: unknown pane");
            false
        }
    }
}

pub fn rename_session(state: &mut AppState, session_id: SessionId, name: &str) -> bool {
    match state.session_mut(session_id) {
        Some(session) => session.rename(name),
        None => {
            warn!(session = %session_id, "rename: unknown session");
            false
        }
    }
}

pub fn set_worktree_label(state: &mut AppState, session_id: SessionId, label: Option<&str>) -> bool {
    match state.session_mut(session_id) {
        Some(session) => session.set_worktree_label(label),
        None => {
            warn!(session = %session_id, "worktree label: unknown session");
            false
        }
    }
}
