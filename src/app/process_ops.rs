//! Best-effort calls into the terminal collaborator. Failures are logged and
//! never undo the state change that triggered them.

use tracing::warn;

use crate::models::SessionId;
use crate::terminal::{StartRequest, TerminalHost};

pub(crate) fn start_session(terminal: &dyn TerminalHost, request: &StartRequest) -> bool {
    match terminal.start(request) {
        Ok(()) => true,
        Err(e) => {
            warn!(session = %request.session_id, "failed to start process: {:#}", e);
            false
        }
    }
}

pub(crate) fn stop_session(terminal: &dyn TerminalHost, session_id: SessionId) {
    if let Err(e) = terminal.stop(session_id) {
        warn!(session = %session_id, "failed to stop process: {:#}", e);
    }
}

pub(crate) fn write_input(terminal: &dyn TerminalHost, session_id: SessionId, data: &[u8]) {
    if let Err(e) = terminal.write(session_id, data) {
        warn!(session = %session_id, "failed to write input: {:#}", e);
    }
}

pub(crate) fn resize_session(terminal: &dyn TerminalHost, session_id: SessionId, rows: u16, cols: u16) {
    if let Err(e) = terminal.resize(session_id, rows, cols) {
        warn!(session = %session_id, rows, cols, "failed to resize process: {:#}", e);
    }
}
