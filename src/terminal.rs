//! Terminal process collaborator. The engine only starts, writes to, resizes
//! and stops processes; rendering and escape handling live elsewhere.

use anyhow::Result;
use std::path::PathBuf;
use tracing::info;

use crate::models::SessionId;

/// Everything the terminal surface needs to spawn a session's process
#[derive(Debug, Clone, PartialEq)]
pub struct StartRequest {
    pub session_id: SessionId,
    pub cwd: PathBuf,
    /// Assistant session to resume instead of starting a new conversation
    pub resume_assistant_id: Option<String>,
}

impl StartRequest {
    pub fn new(session_id: SessionId, cwd: PathBuf) -> Self {
        Self {
            session_id,
            cwd,
            resume_assistant_id: None,
        }
    }
}

/// Best-effort process operations. Errors are logged by callers, never
/// propagated into layout state.
pub trait TerminalHost: Send + Sync {
    fn start(&self, request: &StartRequest) -> Result<()>;
    fn write(&self, session_id: SessionId, data: &[u8]) -> Result<()>;
    fn resize(&self, session_id: SessionId, rows: u16, cols: u16) -> Result<()>;
    fn stop(&self, session_id: SessionId) -> Result<()>;
}

/// Host used by the CLI: records intent in the log without spawning anything.
pub struct LoggingTerminalHost {
    shell: String,
}

impl LoggingTerminalHost {
    pub fn new(shell: Option<String>) -> Self {
        let shell = shell
            .or_else(|| std::env::var("SHELL").ok())
            .unwrap_or_else(|| "bash".to_string());
        Self { shell }
    }
}

impl TerminalHost for LoggingTerminalHost {
    fn start(&self, request: &StartRequest) -> Result<()> {
        info!(
            session = %request.session_id,
            cwd = %request.cwd.display(),
            shell = %self.shell,
            resume = ?request.resume_assistant_id,
            "start process"
        );
        Ok(())
    }

    fn write(&self, session_id: SessionId, data: &[u8]) -> Result<()> {
        info!(session = %session_id, bytes = data.len(), "write to process");
        Ok(())
    }

    fn resize(&self, session_id: SessionId, rows: u16, cols: u16) -> Result<()> {
        info!(session = %session_id, rows, cols, "resize process");
        Ok(())
    }

    fn stop(&self, session_id: SessionId) -> Result<()> {
        info!(session = %session_id, "stop process");
        Ok(())
    }
}
