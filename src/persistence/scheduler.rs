use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::snapshot::WorkspaceSnapshot;
use super::store::Store;

pub const DEFAULT_SAVE_DEBOUNCE: Duration = Duration::from_millis(500);

/// Debounced workspace writer.
///
/// At most one save is pending at a time; scheduling a new one aborts it, so a
/// burst of mutations produces a single write of the last snapshot. Writes are
/// tagged with a generation so that a debounced write which wakes up after a
/// newer schedule or a flush never lands.
pub struct SaveScheduler {
    store: Arc<dyn Store>,
    project_id: String,
    debounce: Duration,
    generation: Arc<Mutex<u64>>,
    pending: Option<JoinHandle<()>>,
}

impl SaveScheduler {
    pub fn new(store: Arc<dyn Store>, project_id: impl Into<String>, debounce: Duration) -> Self {
        Self {
            store,
            project_id: project_id.into(),
            debounce,
            generation: Arc::new(Mutex::new(0)),
            pending: None,
        }
    }

    /// Replace any pending save with one for `snapshot`.
    /// Outside a tokio runtime the snapshot is written immediately.
    pub fn schedule(&mut self, snapshot: WorkspaceSnapshot) {
        self.cancel();
        let ticket = self.bump_generation();

        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                write_snapshot(self.store.as_ref(), &self.project_id, &snapshot);
                return;
            }
        };

        let store = Arc::clone(&self.store);
        let project_id = self.project_id.clone();
        let generation = Arc::clone(&self.generation);
        let debounce = self.debounce;

        self.pending = Some(handle.spawn(async move {
            tokio::time::sleep(debounce).await;
            let current = generation.lock().unwrap_or_else(PoisonError::into_inner);
            if *current != ticket {
                debug!(project = %project_id, "debounced save superseded");
                return;
            }
            write_snapshot(store.as_ref(), &project_id, &snapshot);
        }));
    }

    /// Write `snapshot` now, discarding anything pending
    pub fn flush(&mut self, snapshot: &WorkspaceSnapshot) {
        self.cancel();
        let mut generation = self.generation.lock().unwrap_or_else(PoisonError::into_inner);
        *generation += 1;
        write_snapshot(self.store.as_ref(), &self.project_id, snapshot);
    }

    pub fn cancel(&mut self) {
        if let Some(task) = self.pending.take() {
            task.abort();
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|task| !task.is_finished())
    }

    fn bump_generation(&self) -> u64 {
        let mut generation = self.generation.lock().unwrap_or_else(PoisonError::into_inner);
        *generation += 1;
        *generation
    }
}

fn write_snapshot(store: &dyn Store, project_id: &str, snapshot: &WorkspaceSnapshot) {
    match store.save_workspace(project_id, snapshot) {
        Ok(()) => debug!(project = %project_id, panes = snapshot.panes.len(), "workspace saved"),
        Err(e) => warn!(project = %project_id, "failed to save workspace: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::store::MemoryStore;
    use uuid::Uuid;

    fn snapshot_focused_on(id: Uuid) -> WorkspaceSnapshot {
        WorkspaceSnapshot {
            focused_pane_id: Some(id),
            ..WorkspaceSnapshot::empty()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_coalesces_into_one_write() {
        let store = Arc::new(MemoryStore::new());
        let mut scheduler = SaveScheduler::new(store.clone(), "proj", DEFAULT_SAVE_DEBOUNCE);

        let last = Uuid::new_v4();
        scheduler.schedule(snapshot_focused_on(Uuid::new_v4()));
        scheduler.schedule(snapshot_focused_on(Uuid::new_v4()));
        scheduler.schedule(snapshot_focused_on(last));
        assert!(scheduler.has_pending());
        assert_eq!(store.workspace_writes(), 0);

        tokio::time::sleep(Duration::from_millis(600)).await;

        assert_eq!(store.workspace_writes(), 1);
        assert_eq!(store.saved_snapshot("proj").unwrap().focused_pane_id, Some(last));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_restarts_debounce() {
        let store = Arc::new(MemoryStore::new());
        let mut scheduler = SaveScheduler::new(store.clone(), "proj", DEFAULT_SAVE_DEBOUNCE);

        scheduler.schedule(WorkspaceSnapshot::empty());
        tokio::time::sleep(Duration::from_millis(400)).await;
        scheduler.schedule(WorkspaceSnapshot::empty());
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(store.workspace_writes(), 0);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(store.workspace_writes(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_wins_over_pending() {
        let store = Arc::new(MemoryStore::new());
        let mut scheduler = SaveScheduler::new(store.clone(), "proj", DEFAULT_SAVE_DEBOUNCE);

        let flushed = Uuid::new_v4();
        scheduler.schedule(snapshot_focused_on(Uuid::new_v4()));
        scheduler.flush(&snapshot_focused_on(flushed));
        assert!(!scheduler.has_pending());

        tokio::time::sleep(Duration::from_millis(1000)).await;

        assert_eq!(store.workspace_writes(), 1);
        assert_eq!(store.saved_snapshot("proj").unwrap().focused_pane_id, Some(flushed));
    }

    #[test]
    fn test_without_runtime_writes_immediately() {
        let store = Arc::new(MemoryStore::new());
        let mut scheduler = SaveScheduler::new(store.clone(), "proj", DEFAULT_SAVE_DEBOUNCE);

        scheduler.schedule(WorkspaceSnapshot::empty());

        assert!(!scheduler.has_pending());
        assert_eq!(store.workspace_writes(), 1);
    }
}
