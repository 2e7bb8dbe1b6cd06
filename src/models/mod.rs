mod binding;
mod pane;
mod resume_history;
mod session;

pub use binding::{BindingEvent, BindingSource};
pub use pane::{next_pane_number, pane_name, Pane, PaneId};
pub use resume_history::{ResumeHistory, ResumeHistoryEntry, RESUME_HISTORY_CAP};
pub use session::{is_auto_session_name, session_name, Session, SessionId};
