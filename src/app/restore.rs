//! Rebuild orchestrator state from a stored workspace.
//!
//! Only the shape comes back: pane ids, names, the tree and the session count
//! per pane. Every session is recreated with a fresh id and no assistant
//! binding, and its process is started again.

use serde_json::Value;
use std::collections::HashSet;
use tracing::{info, warn};

use crate::app::process_ops::start_session;
use crate::app::AppState;
use crate::layout::{remove_pane, SplitNode};
use crate::models::{is_auto_session_name, session_name, Pane, PaneId};
use crate::persistence::{migrate_workspace, PersistedPane};
use crate::terminal::{StartRequest, TerminalHost};

/// Returns the rebuilt state and every recovery step taken along the way
pub fn restore_workspace(
    project_id: &str,
    raw: Option<&Value>,
    terminal: &dyn TerminalHost,
) -> (AppState, Vec<String>) {
    let mut state = AppState::new(project_id);
    let Some(raw) = raw else {
        return (state, Vec::new());
    };

    let (snapshot, migration_warnings) = migrate_workspace(raw);
    let mut warnings: Vec<String> = migration_warnings.iter().map(ToString::to_string).collect();

    let mut seen = HashSet::new();
    let mut emptied = Vec::new();
    let mut stored: Vec<PersistedPane> = Vec::new();
    for pane in snapshot.panes {
        if pane.sessions.is_empty() {
            warnings.push(format!("pane {} has no sessions; dropped", pane.id));
            emptied.push(pane.id);
        } else if !seen.insert(pane.id) {
            warnings.push(format!("pane {} stored twice; later copy dropped", pane.id));
        } else {
            stored.push(pane);
        }
    }
    // A surviving copy under the same id keeps its leaf
    emptied.retain(|id| !seen.contains(id));

    let tree = resolve_tree(snapshot.split_layout, &emptied, &mut stored, &mut warnings);

    for persisted in &stored {
        let mut session_ids = Vec::with_capacity(persisted.sessions.len());
        for stored_session in &persisted.sessions {
            let name = if is_auto_session_name(&stored_session.name) {
                session_name(state.system.next_session_number)
            } else {
                stored_session.name.clone()
            };
            let id = state.allocate_named_session(name, stored_session.cwd.clone());
            if let Some(session) = state.session_mut(id) {
                session.worktree_label = stored_session.worktree_label.clone();
            }
            session_ids.push(id);
        }

        let active_session_id = persisted
            .active_index
            .and_then(|i| session_ids.get(i).copied())
            .or_else(|| session_ids.last().copied());
        state.data.panes.push(Pane {
            id: persisted.id,
            name: persisted.name.clone(),
            session_ids,
            active_session_id,
        });
    }
    state.layout.tree = tree;

    let mut minimized = Vec::new();
    for id in snapshot.minimized_pane_ids {
        if state.data.has_pane(id) && !minimized.contains(&id) {
            minimized.push(id);
        }
    }
    state.layout.minimized_pane_ids = minimized;

    state.layout.focused_pane_id = snapshot
        .focused_pane_id
        .filter(|id| state.data.has_pane(*id) && !state.is_minimized(*id))
        .or_else(|| state.first_visible_pane());

    start_all(&state, terminal);

    for warning in &warnings {
        warn!(project = %project_id, "workspace restore: {}", warning);
    }
    info!(
        project = %project_id,
        panes = state.data.panes.len(),
        sessions = state.data.sessions.len(),
        "workspace restored"
    );
    (state, warnings)
}

/// Validate the stored tree against the surviving panes.
///
/// Leaves of panes dropped while loading (`dropped`) are removed first, their
/// siblings taking their space. A tree that still names an unknown pane, or
/// names one twice, is replaced by a single leaf wrapping the first pane.
/// Panes the chosen tree does not reference are dropped.
fn resolve_tree(
    stored_tree: Option<SplitNode>,
    dropped: &[PaneId],
    panes: &mut Vec<PersistedPane>,
    warnings: &mut Vec<String>,
) -> Option<SplitNode> {
    let known: HashSet<PaneId> = panes.iter().map(|p| p.id).collect();

    let pruned = dropped
        .iter()
        .fold(stored_tree, |tree, id| remove_pane(tree.as_ref(), *id));

    let valid = pruned.map(|t| t.clamped()).filter(|tree| {
        let ids = tree.pane_ids();
        let unique: HashSet<PaneId> = ids.iter().copied().collect();
        unique.len() == ids.len() && ids.iter().all(|id| known.contains(id))
    });

    let tree = match valid {
        Some(tree) => tree,
        None => {
            let first = panes.first()?.id;
            warnings.push("stored layout is missing or names unknown panes; using a single pane".to_string());
            SplitNode::leaf(first)
        }
    };

    panes.retain(|pane| {
        let keep = tree.contains(pane.id);
        if !keep {
            warnings.push(format!("pane {} is not in the layout; dropped", pane.id));
        }
        keep
    });
    Some(tree)
}

/// Start every session, walking panes in tree order
fn start_all(state: &AppState, terminal: &dyn TerminalHost) {
    for pane_id in state.pane_ids() {
        let Some(pane) = state.pane(pane_id) else {
            continue;
        };
        for session_id in &pane.session_ids {
            if let Some(session) = state.session(*session_id) {
                start_session(terminal, &StartRequest::new(session.id, session.cwd.clone()));
            }
        }
    }
}
