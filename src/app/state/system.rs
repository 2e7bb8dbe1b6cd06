use std::collections::HashSet;

use crate::models::SessionId;

/// Transient bookkeeping that is never persisted
pub struct SystemState {
    /// Sessions whose assistant is currently working
    pub busy_sessions: HashSet<SessionId>,
    /// Number used for the next auto-named session; reset on every load
    pub next_session_number: u32,
}

impl SystemState {
    pub fn new() -> Self {
        Self {
            busy_sessions: HashSet::new(),
            next_session_number: 1,
        }
    }
}

impl Default for SystemState {
    fn default() -> Self {
        Self::new()
    }
}
