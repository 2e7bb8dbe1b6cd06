use std::path::PathBuf;
use std::sync::Arc;

use crate::app::{AppState, Services};
use crate::continuity::testing::RecordingContinuity;
use crate::history::ResumeHistoryStore;
use crate::persistence::MemoryStore;
use crate::terminal::testing::RecordingTerminalHost;

/// Services backed by recording fakes, with handles kept for assertions
pub struct TestServices {
    pub services: Services,
    pub terminal: Arc<RecordingTerminalHost>,
    pub continuity: Arc<RecordingContinuity>,
    pub store: Arc<MemoryStore>,
}

pub fn create_test_services() -> TestServices {
    let terminal = Arc::new(RecordingTerminalHost::default());
    let continuity = Arc::new(RecordingContinuity::default());
    let store = Arc::new(MemoryStore::new());
    let services = Services::new(
        terminal.clone(),
        continuity.clone(),
        ResumeHistoryStore::with_default_cap(store.clone()),
    );
    TestServices {
        services,
        terminal,
        continuity,
        store,
    }
}

pub fn create_test_state() -> AppState {
    AppState::new("proj")
}

pub fn cwd() -> PathBuf {
    PathBuf::from("/work")
}
