use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::app::{Action, AppState, Services};
use crate::continuity::spawn_copy;
use crate::models::{BindingEvent, BindingSource, SessionId};

/// Assistant lifecycle events. None of this is persisted in the workspace,
/// so no save is ever requested.
pub fn handle_binding_action(state: &mut AppState, action: Action, services: &Services) -> bool {
    match action {
        Action::Binding { session_id, event } => {
            apply_binding_event(state, session_id, event, services);
        }
        Action::AssistantActivity {
            session_id,
            title,
            busy,
        } => apply_activity(state, session_id, title, busy),
        _ => {}
    }
    false
}

pub fn apply_binding_event(state: &mut AppState, session_id: SessionId, event: BindingEvent, services: &Services) {
    let project_id = state.project_id.clone();
    let Some(session) = state.data.session_mut(session_id) else {
        warn!(session = %session_id, source = ?event.source, "binding event for unknown session");
        return;
    };

    if event.source == BindingSource::Stop {
        let preserved = session
            .bound_assistant_id
            .take()
            .or(event.bound_assistant_id)
            .or_else(|| session.last_bound_assistant_id.clone());
        session.last_bound_assistant_id = preserved.clone();
        session.assistant_model = None;
        state.system.busy_sessions.remove(&session_id);

        if let Some(assistant_id) = preserved {
            info!(session = %session_id, assistant = %assistant_id, "assistant stopped");
            if let Some(session) = state.data.session(session_id) {
                services.history.record_session(session);
            }
        }
        return;
    }

    let Some(new_id) = event.bound_assistant_id else {
        debug!(session = %session_id, source = ?event.source, "binding event without an id ignored");
        return;
    };

    if event.source.starts_fresh() {
        if let Some(previous) = session.resumable_assistant_id().filter(|prev| *prev != new_id) {
            debug!(session = %session_id, from = %previous, to = %new_id, "carrying continuity forward");
            spawn_copy(
                Arc::clone(&services.continuity),
                project_id,
                previous.to_string(),
                new_id.clone(),
            );
        }
    }

    info!(session = %session_id, assistant = %new_id, source = ?event.source, "assistant bound");
    session.bind(new_id, event.model);
}

pub fn apply_activity(state: &mut AppState, session_id: SessionId, title: Option<String>, busy: bool) {
    let Some(session) = state.data.session_mut(session_id) else {
        warn!(session = %session_id, "activity for unknown session");
        return;
    };
    if let Some(title) = title {
        session.last_assistant_title = Some(title);
    }
    if busy {
        state.system.busy_sessions.insert(session_id);
    } else {
        state.system.busy_sessions.remove(&session_id);
    }
}
