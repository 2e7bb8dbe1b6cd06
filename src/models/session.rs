use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::OnceLock;
use uuid::Uuid;

pub type SessionId = Uuid;

/// One interactive process slot, optionally bound to an external assistant session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: SessionId,
    pub project_id: String,
    pub name: String,
    pub cwd: PathBuf,
    pub created_at: DateTime<Utc>,
    /// The assistant's own session id while attached
    #[serde(default)]
    pub bound_assistant_id: Option<String>,
    #[serde(default)]
    pub assistant_model: Option<String>,
    /// Most recent activity caption reported by the assistant
    #[serde(default)]
    pub last_assistant_title: Option<String>,
    /// Survives unbinding so the session can be offered for resume
    #[serde(default)]
    pub last_bound_assistant_id: Option<String>,
    #[serde(default)]
    pub worktree_label: Option<String>,
}

impl Session {
    pub fn new(project_id: impl Into<String>, name: impl Into<String>, cwd: PathBuf) -> Self {
        Self {
            id: Uuid::new_v4(),
            project_id: project_id.into(),
            name: name.into(),
            cwd,
            created_at: Utc::now(),
            bound_assistant_id: None,
            assistant_model: None,
            last_assistant_title: None,
            last_bound_assistant_id: None,
            worktree_label: None,
        }
    }

    /// Attach an assistant session. The new id is also recorded as the last bound id.
    pub fn bind(&mut self, assistant_id: String, model: Option<String>) {
        self.bound_assistant_id = Some(assistant_id.clone());
        self.last_bound_assistant_id = Some(assistant_id);
        self.assistant_model = model;
    }

    /// Detach the assistant, keeping its id in `last_bound_assistant_id`.
    /// Returns the id that can still be resumed, if any.
    pub fn unbind(&mut self) -> Option<String> {
        if let Some(previous) = self.bound_assistant_id.take() {
            self.last_bound_assistant_id = Some(previous);
        }
        self.assistant_model = None;
        self.last_bound_assistant_id.clone()
    }

    /// Current binding, or the preserved one after an unbind.
    pub fn resumable_assistant_id(&self) -> Option<&str> {
        self.bound_assistant_id
            .as_deref()
            .or(self.last_bound_assistant_id.as_deref())
    }

    pub fn is_bound(&self) -> bool {
        self.bound_assistant_id.is_some()
    }

    /// Rename; whitespace-only names are rejected.
    pub fn rename(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || name == self.name {
            return false;
        }
        self.name = name.to_string();
        true
    }

    pub fn set_worktree_label(&mut self, label: Option<&str>) -> bool {
        let label = label
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string);
        if label == self.worktree_label {
            return false;
        }
        self.worktree_label = label;
        true
    }
}

/// Default display name for the n-th session of a workspace load.
pub fn session_name(number: u32) -> String {
    format!("Session {}", number)
}

/// True for names produced by [`session_name`], i.e. not chosen by the user.
pub fn is_auto_session_name(name: &str) -> bool {
    static AUTO_NAME: OnceLock<Option<Regex>> = OnceLock::new();
    AUTO_NAME
        .get_or_init(|| Regex::new(r"^Session \d+$").ok())
        .as_ref()
        .is_some_and(|re| re.is_match(name.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_session() -> Session {
        Session::new("proj", session_name(1), PathBuf::from("/tmp/proj"))
    }

    #[test]
    fn test_bind_records_last_bound() {
        let mut session = create_test_session();
        session.bind("abc".to_string(), Some("opus".to_string()));

        assert_eq!(session.bound_assistant_id.as_deref(), Some("abc"));
        assert_eq!(session.last_bound_assistant_id.as_deref(), Some("abc"));
        assert_eq!(session.assistant_model.as_deref(), Some("opus"));
    }

    #[test]
    fn test_unbind_preserves_id() {
        let mut session = create_test_session();
        session.bind("abc".to_string(), None);

        let preserved = session.unbind();

        assert_eq!(preserved.as_deref(), Some("abc"));
        assert!(session.bound_assistant_id.is_none());
        assert!(session.assistant_model.is_none());
        assert_eq!(session.last_bound_assistant_id.as_deref(), Some("abc"));

        // A second unbind never clears the preserved id
        assert_eq!(session.unbind().as_deref(), Some("abc"));
        assert_eq!(session.resumable_assistant_id(), Some("abc"));
    }

    #[test]
    fn test_rebind_replaces_last_bound() {
        let mut session = create_test_session();
        session.bind("first".to_string(), None);
        session.bind("second".to_string(), None);
        assert_eq!(session.last_bound_assistant_id.as_deref(), Some("second"));
    }

    #[test]
    fn test_rename_trims_and_rejects_empty() {
        let mut session = create_test_session();
        assert!(!session.rename("   "));
        assert_eq!(session.name, "Session 1");

        assert!(session.rename("  build  "));
        assert_eq!(session.name, "build");
    }

    #[test]
    fn test_worktree_label() {
        let mut session = create_test_session();
        assert!(session.set_worktree_label(Some(" feature/x ")));
        assert_eq!(session.worktree_label.as_deref(), Some("feature/x"));
        assert!(session.set_worktree_label(Some("")));
        assert!(session.worktree_label.is_none());
        assert!(!session.set_worktree_label(None));
    }

    #[test]
    fn test_auto_session_name() {
        assert!(is_auto_session_name("Session 1"));
        assert!(is_auto_session_name("Session 42"));
        assert!(!is_auto_session_name("Session"));
        assert!(!is_auto_session_name("api server"));
    }
}
