mod migration;
mod scheduler;
mod snapshot;
mod store;

pub use migration::{migrate_workspace, MigrationWarning};
pub use scheduler::{SaveScheduler, DEFAULT_SAVE_DEBOUNCE};
pub use snapshot::{
    LegacyMinimizedPane, LegacyWorkspace, PersistedPane, PersistedSession, WorkspaceSnapshot,
    CURRENT_VERSION, LEGACY_VERSION,
};
pub use store::{file_stem, JsonFileStore, MemoryStore, Store, StoreError};
