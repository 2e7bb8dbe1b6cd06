use tracing::debug;

use crate::app::handlers::binding::handle_binding_action;
use crate::app::handlers::pane::handle_pane_action;
use crate::app::handlers::session::handle_session_action;
use crate::app::{Action, AppState, Services};

/// Apply one intent. Returns true when the persisted workspace changed and a
/// save should be scheduled.
pub fn process_action(state: &mut AppState, action: Action, services: &Services) -> bool {
    debug!(?action, "process action");
    match action {
        Action::CreateFirstSession { .. }
        | Action::CreateSessionInPane { .. }
        | Action::ResumeSessionInPane { .. }
        | Action::CloseSessionInPane { .. }
        | Action::MoveSessionToPane { .. }
        | Action::MoveSessionToNewSplit { .. }
        | Action::ReorderSession { .. }
        | Action::RenameSession { .. }
        | Action::SetWorktreeLabel { .. }
        | Action::SendInput(..)
        | Action::ResizeSession { .. } => handle_session_action(state, action, services),

        Action::SplitPane { .. }
        | Action::ClosePane(_)
        | Action::MinimizePane(_)
        | Action::RestorePane(_)
        | Action::UpdateSplitRatio { .. }
        | Action::RenamePane { .. }
        | Action::FocusPane(_)
        | Action::CycleFocus { .. } => handle_pane_action(state, action, services),

        Action::Binding { .. } | Action::AssistantActivity { .. } => {
            handle_binding_action(state, action, services)
        }
    }
}
