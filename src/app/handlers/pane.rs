use std::path::PathBuf;
use tracing::{debug, warn};

use crate::app::process_ops::{start_session, stop_session};
use crate::app::{Action, AppState, Services};
use crate::layout::{split_pane_node_at, update_ratio_at_path, SplitDirection, SplitNode, SplitPath};
use crate::models::{Pane, PaneId};
use crate::terminal::StartRequest;

/// Returns true when persisted workspace state changed
pub fn handle_pane_action(state: &mut AppState, action: Action, services: &Services) -> bool {
    match action {
        Action::SplitPane { direction, cwd } => split_pane(state, direction, cwd, services).is_some(),
        Action::ClosePane(pane_id) => close_pane(state, pane_id, services),
        Action::MinimizePane(pane_id) => minimize_pane(state, pane_id),
        Action::RestorePane(pane_id) => restore_pane(state, pane_id),
        Action::UpdateSplitRatio { path, ratio } => update_split_ratio(state, &path, ratio),
        Action::RenamePane { pane_id, name } => rename_pane(state, pane_id, &name),
        Action::FocusPane(pane_id) => focus_pane(state, pane_id),
        Action::CycleFocus { forward } => cycle_focus(state, forward),
        _ => false,
    }
}

/// Split the focused pane, placing a new pane holding a new session second.
/// Returns the new pane's id.
pub fn split_pane(
    state: &mut AppState,
    direction: SplitDirection,
    cwd: PathBuf,
    services: &Services,
) -> Option<PaneId> {
    let Some(focused) = state.layout.focused_pane_id else {
        warn!("split: no focused pane");
        return None;
    };
    let in_tree = state
        .layout
        .tree
        .as_ref()
        .is_some_and(|tree| tree.contains(focused));
    if !in_tree {
        warn!(pane = %focused, "split: focused pane not in layout");
        return None;
    }

    let session_id = state.allocate_session(cwd.clone());
    let pane = Pane::new(state.next_pane_name(), session_id);
    let pane_id = pane.id;
    state.layout.tree = split_pane_node_at(state.layout.tree.as_ref(), focused, pane_id, direction, false);
    state.data.panes.push(pane);
    state.layout.focused_pane_id = Some(pane_id);

    start_session(services.terminal.as_ref(), &StartRequest::new(session_id, cwd));
    Some(pane_id)
}

/// Close every session in the pane, then remove the pane
pub fn close_pane(state: &mut AppState, pane_id: PaneId, services: &Services) -> bool {
    let Some(pane) = state.pane(pane_id) else {
        warn!(pane = %pane_id, "close pane: unknown pane");
        return false;
    };

    let session_ids = pane.session_ids.clone();
    for session_id in session_ids {
        if let Some(session) = state.session(session_id) {
            services.history.record_session(session);
        }
        stop_session(services.terminal.as_ref(), session_id);
        state.forget_session(session_id);
    }

    state.detach_pane(pane_id, None);
    true
}

/// Hide a pane without touching the tree
pub fn minimize_pane(state: &mut AppState, pane_id: PaneId) -> bool {
    if !state.data.has_pane(pane_id) {
        warn!(pane = %pane_id, "minimize: unknown pane");
        return false;
    }
    if state.is_minimized(pane_id) {
        return false;
    }

    state.layout.minimized_pane_ids.push(pane_id);
    if state.layout.focused_pane_id == Some(pane_id) {
        state.layout.focused_pane_id = state.first_visible_pane();
    }
    true
}

pub fn restore_pane(state: &mut AppState, pane_id: PaneId) -> bool {
    if !state.is_minimized(pane_id) {
        debug!(pane = %pane_id, "restore: pane is not minimized");
        return false;
    }
    state.layout.minimized_pane_ids.retain(|id| *id != pane_id);
    state.layout.focused_pane_id = Some(pane_id);
    true
}

/// Move the divider at `path`. Dividers next to a minimized side are locked.
pub fn update_split_ratio(state: &mut AppState, path: &SplitPath, ratio: f64) -> bool {
    let Some(tree) = state.layout.tree.as_ref() else {
        warn!(path = %path, "ratio: empty layout");
        return false;
    };
    let Some(SplitNode::Branch { ratio: current, .. }) = tree.node_at(path) else {
        warn!(path = %path, "ratio: path does not name a divider");
        return false;
    };
    let current = *current;

    let disabled = state
        .dividers()
        .iter()
        .any(|d| d.path == *path && d.disabled);
    if disabled {
        warn!(path = %path, "ratio: divider next to a minimized pane is locked");
        return false;
    }

    let updated = update_ratio_at_path(Some(tree), path, ratio);
    let changed = match updated.as_ref().and_then(|t| t.node_at(path)) {
        Some(SplitNode::Branch { ratio: new, .. }) => *new != current,
        _ => false,
    };
    if changed {
        state.layout.tree = updated;
    }
    changed
}

pub fn rename_pane(state: &mut AppState, pane_id: PaneId, name: &str) -> bool {
    match state.pane_mut(pane_id) {
        Some(pane) => pane.rename(name),
        None => {
            warn!(pane = %pane_id, "rename: unknown pane");
            false
        }
    }
}

/// Focus is accepted for any id; callers pass ids from the tree
pub fn focus_pane(state: &mut AppState, pane_id: PaneId) -> bool {
    if state.layout.focused_pane_id == Some(pane_id) {
        return false;
    }
    if !state.data.has_pane(pane_id) {
        debug!(pane = %pane_id, "focusing a pane that is not in the collection");
    }
    state.layout.focused_pane_id = Some(pane_id);
    true
}

/// Step focus through visible panes in tree order, wrapping at either end
pub fn cycle_focus(state: &mut AppState, forward: bool) -> bool {
    let visible = state.visible_pane_ids();
    if visible.is_empty() {
        return false;
    }

    let len = visible.len();
    let current = state
        .layout
        .focused_pane_id
        .and_then(|id| visible.iter().position(|v| *v == id));
    let next = match (current, forward) {
        (Some(i), true) => (i + 1) % len,
        (Some(i), false) => (i + len - 1) % len,
        (None, _) => 0,
    };

    focus_pane(state, visible[next])
}
