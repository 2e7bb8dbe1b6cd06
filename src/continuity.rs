//! Cross-session continuity: when an assistant starts a fresh conversation in a
//! session, the task list kept under the previous assistant id is copied to the
//! new one. The copy is detached from the bind that triggers it.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::persistence::file_stem;

pub trait ContinuityStore: Send + Sync {
    fn copy(&self, project_id: &str, from_assistant_id: &str, to_assistant_id: &str) -> Result<()>;
}

/// Task lists stored as `<root>/<project>/<assistant id>.json`
pub struct FileContinuityStore {
    root: PathBuf,
}

impl FileContinuityStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn path(&self, project_id: &str, assistant_id: &str) -> PathBuf {
        self.root
            .join(file_stem(project_id))
            .join(format!("{}.json", file_stem(assistant_id)))
    }
}

impl ContinuityStore for FileContinuityStore {
    fn copy(&self, project_id: &str, from_assistant_id: &str, to_assistant_id: &str) -> Result<()> {
        let from = self.path(project_id, from_assistant_id);
        if !from.exists() {
            debug!(from = %from.display(), "no task list to carry over");
            return Ok(());
        }
        let to = self.path(project_id, to_assistant_id);
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(&from, &to)
            .with_context(|| format!("copying {} to {}", from.display(), to.display()))?;
        Ok(())
    }
}

/// Run a copy without blocking the caller. Inside a tokio runtime the copy runs
/// on the blocking pool and its handle is returned; otherwise it runs inline.
/// Failures are logged only.
pub fn spawn_copy(
    store: Arc<dyn ContinuityStore>,
    project_id: String,
    from_assistant_id: String,
    to_assistant_id: String,
) -> Option<JoinHandle<()>> {
    let run = move || {
        if let Err(e) = store.copy(&project_id, &from_assistant_id, &to_assistant_id) {
            warn!(
                project = %project_id,
                from = %from_assistant_id,
                to = %to_assistant_id,
                "continuity copy failed: {:#}",
                e
            );
        }
    };

    match Handle::try_current() {
        Ok(handle) => Some(handle.spawn_blocking(run)),
        Err(_) => {
            run();
            None
        }
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::sync::{Mutex, PoisonError};

    /// Records (project, from, to) triples; can be made to fail
    #[derive(Default)]
    pub struct RecordingContinuity {
        copies: Mutex<Vec<(String, String, String)>>,
        fail: bool,
    }

    impl RecordingContinuity {
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        pub fn copies(&self) -> Vec<(String, String, String)> {
            self.copies
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }
    }

    impl ContinuityStore for RecordingContinuity {
        fn copy(&self, project_id: &str, from: &str, to: &str) -> Result<()> {
            self.copies
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push((project_id.to_string(), from.to_string(), to.to_string()));
            if self.fail {
                anyhow::bail!("task store unavailable");
            }
            Ok(())
        }
    }
}
