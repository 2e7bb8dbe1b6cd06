//! Pane-layout and session-orchestration engine for a terminal workbench.
//!
//! Sessions live in panes, panes are the leaves of an immutable split tree,
//! and the workspace shape is persisted per project with debounced writes.

pub mod app;
pub mod config;
pub mod continuity;
pub mod history;
pub mod layout;
pub mod models;
pub mod persistence;
pub mod terminal;
