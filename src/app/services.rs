use std::sync::Arc;

use crate::continuity::ContinuityStore;
use crate::history::ResumeHistoryStore;
use crate::terminal::TerminalHost;

/// Collaborators the action handlers call out to
pub struct Services {
    pub terminal: Arc<dyn TerminalHost>,
    pub continuity: Arc<dyn ContinuityStore>,
    pub history: ResumeHistoryStore,
}

impl Services {
    pub fn new(
        terminal: Arc<dyn TerminalHost>,
        continuity: Arc<dyn ContinuityStore>,
        history: ResumeHistoryStore,
    ) -> Self {
        Self {
            terminal,
            continuity,
            history,
        }
    }
}
