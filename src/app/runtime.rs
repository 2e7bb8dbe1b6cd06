use std::sync::Arc;
use tracing::{info, warn};

use crate::app::handler::process_action;
use crate::app::restore::restore_workspace;
use crate::app::{Action, AppState, Services};
use crate::config::WorkbenchConfig;
use crate::continuity::ContinuityStore;
use crate::history::ResumeHistoryStore;
use crate::persistence::{SaveScheduler, Store};
use crate::terminal::TerminalHost;

/// One project's live workspace: state, collaborators and the save scheduler
pub struct Workbench {
    state: AppState,
    services: Services,
    saver: SaveScheduler,
    restore_warnings: Vec<String>,
    /// A stored workspace existed but nothing could be restored from it; it is
    /// left on disk until the user changes something
    keep_stored: bool,
}

impl Workbench {
    /// Load (and migrate) the stored workspace, restarting every session
    pub fn open(
        project_id: &str,
        config: &WorkbenchConfig,
        store: Arc<dyn Store>,
        terminal: Arc<dyn TerminalHost>,
        continuity: Arc<dyn ContinuityStore>,
    ) -> Self {
        let raw = match store.load_workspace(project_id) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(project = %project_id, "failed to read workspace, starting empty: {}", e);
                None
            }
        };
        let (state, restore_warnings) = restore_workspace(project_id, raw.as_ref(), terminal.as_ref());
        let keep_stored = raw.is_some() && state.data.panes.is_empty();

        let history = ResumeHistoryStore::new(Arc::clone(&store), config.resume_history_cap);
        let saver = SaveScheduler::new(store, project_id, config.save_debounce());

        Self {
            state,
            services: Services::new(terminal, continuity, history),
            saver,
            restore_warnings,
            keep_stored,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn history(&self) -> &ResumeHistoryStore {
        &self.services.history
    }

    pub fn restore_warnings(&self) -> &[String] {
        &self.restore_warnings
    }

    pub fn has_pending_save(&self) -> bool {
        self.saver.has_pending()
    }

    /// Apply an intent and debounce a save if the workspace changed
    pub fn dispatch(&mut self, action: Action) -> bool {
        let changed = process_action(&mut self.state, action, &self.services);
        if changed {
            self.keep_stored = false;
            self.saver.schedule(self.state.snapshot());
        }
        changed
    }

    /// Write the workspace now, replacing any pending save
    pub fn save_now(&mut self) {
        self.saver.flush(&self.state.snapshot());
    }

    /// Exit path: final workspace write, then a resume-history entry for every
    /// session that is or was bound to an assistant.
    ///
    /// An unrestorable stored workspace that was never edited is not
    /// overwritten with the empty state.
    pub fn shutdown(mut self) {
        if self.keep_stored {
            self.saver.cancel();
            warn!(
                project = %self.state.project_id,
                "stored workspace could not be restored; leaving it untouched"
            );
        } else {
            self.save_now();
        }

        let recorded = self
            .state
            .data
            .sessions
            .iter()
            .filter(|session| self.services.history.record_session(session))
            .count();
        info!(
            project = %self.state.project_id,
            sessions = self.state.data.sessions.len(),
            recorded,
            "workspace flushed"
        );
    }
}
