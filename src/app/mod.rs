mod action;
mod handler;
pub mod handlers;
mod process_ops;
mod restore;
mod runtime;
mod services;
mod state;

pub use action::Action;
pub use handler::process_action;
pub use restore::restore_workspace;
pub use runtime::Workbench;
pub use services::Services;
pub use state::{AppState, DataState, LayoutState, SystemState};
