use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

use super::snapshot::WorkspaceSnapshot;
use crate::models::ResumeHistoryEntry;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Per-project key-value persistence for workspaces and resume history.
///
/// Workspaces are loaded as raw JSON so that older schema versions can be
/// migrated before they are interpreted.
pub trait Store: Send + Sync {
    fn load_workspace(&self, project_id: &str) -> Result<Option<Value>, StoreError>;
    fn save_workspace(&self, project_id: &str, snapshot: &WorkspaceSnapshot) -> Result<(), StoreError>;
    fn load_resume_history(&self, project_id: &str) -> Result<Vec<ResumeHistoryEntry>, StoreError>;
    fn save_resume_history(
        &self,
        project_id: &str,
        entries: &[ResumeHistoryEntry],
    ) -> Result<(), StoreError>;
}

/// Map a project or assistant id onto a safe file name
pub fn file_stem(id: &str) -> String {
    let stem: String = id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() {
        "_".to_string()
    } else {
        stem
    }
}

/// Pretty JSON files under a data directory:
/// `workspaces/<project>.json` and `resume-history/<project>.json`.
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn workspace_path(&self, project_id: &str) -> PathBuf {
        self.root
            .join("workspaces")
            .join(format!("{}.json", file_stem(project_id)))
    }

    fn history_path(&self, project_id: &str) -> PathBuf {
        self.root
            .join("resume-history")
            .join(format!("{}.json", file_stem(project_id)))
    }
}

/// Write via a temp file and rename so readers never see a partial file
fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    let contents = serde_json::to_string_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

impl Store for JsonFileStore {
    fn load_workspace(&self, project_id: &str) -> Result<Option<Value>, StoreError> {
        let path = self.workspace_path(project_id);
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&contents)?))
    }

    fn save_workspace(&self, project_id: &str, snapshot: &WorkspaceSnapshot) -> Result<(), StoreError> {
        write_json_atomic(&self.workspace_path(project_id), snapshot)
    }

    fn load_resume_history(&self, project_id: &str) -> Result<Vec<ResumeHistoryEntry>, StoreError> {
        let path = self.history_path(project_id);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn save_resume_history(
        &self,
        project_id: &str,
        entries: &[ResumeHistoryEntry],
    ) -> Result<(), StoreError> {
        write_json_atomic(&self.history_path(project_id), entries)
    }
}

/// In-process store for tests and dry runs
#[derive(Default)]
pub struct MemoryStore {
    workspaces: Mutex<HashMap<String, Value>>,
    histories: Mutex<HashMap<String, Vec<ResumeHistoryEntry>>>,
    workspace_writes: Mutex<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw (possibly legacy) workspace value
    pub fn insert_raw_workspace(&self, project_id: &str, raw: Value) {
        self.workspaces
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(project_id.to_string(), raw);
    }

    pub fn workspace_writes(&self) -> usize {
        *self
            .workspace_writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn saved_snapshot(&self, project_id: &str) -> Option<WorkspaceSnapshot> {
        self.workspaces
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(project_id)
            .and_then(|raw| serde_json::from_value(raw.clone()).ok())
    }
}

impl Store for MemoryStore {
    fn load_workspace(&self, project_id: &str) -> Result<Option<Value>, StoreError> {
        Ok(self
            .workspaces
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(project_id)
            .cloned())
    }

    fn save_workspace(&self, project_id: &str, snapshot: &WorkspaceSnapshot) -> Result<(), StoreError> {
        let value = serde_json::to_value(snapshot)?;
        self.workspaces
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(project_id.to_string(), value);
        *self
            .workspace_writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner) += 1;
        Ok(())
    }

    fn load_resume_history(&self, project_id: &str) -> Result<Vec<ResumeHistoryEntry>, StoreError> {
        Ok(self
            .histories
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(project_id)
            .cloned()
            .unwrap_or_default())
    }

    fn save_resume_history(
        &self,
        project_id: &str,
        entries: &[ResumeHistoryEntry],
    ) -> Result<(), StoreError> {
        self.histories
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(project_id.to_string(), entries.to_vec());
        Ok(())
    }
}
