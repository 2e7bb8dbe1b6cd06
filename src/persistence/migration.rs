//! Schema migration for stored workspaces.
//!
//! `migrate_workspace` is total: any stored value yields a current-schema
//! snapshot plus the warnings collected on the way. Version 1 is only ever
//! read, never written.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;

use super::snapshot::{
    LegacyMinimizedPane, LegacyWorkspace, PersistedPane, WorkspaceSnapshot, CURRENT_VERSION,
    LEGACY_VERSION,
};
use crate::layout::{split_pane_node_at, SplitDirection, SplitNode};
use crate::models::PaneId;

#[derive(Debug, Clone, PartialEq)]
pub enum MigrationWarning {
    /// The value could not be read as the schema its version names
    Unreadable { version: Option<u64>, reason: String },
    UnsupportedVersion(u64),
    MissingVersion,
    /// One entry of the pane list was malformed and dropped
    UnreadablePane { index: usize, reason: String },
    /// The stored tree was malformed and dropped
    UnreadableLayout(String),
    /// A legacy minimized entry lacked fields; defaults were filled in
    IncompleteMinimizedEntry { pane_id: PaneId, reason: String },
    /// A legacy minimized entry had no readable pane id and was dropped
    UnreadableMinimizedEntry { index: usize, reason: String },
    /// A legacy minimized entry named a pane that is not in the pane list
    UnknownMinimizedPane(PaneId),
    /// The recorded sibling is gone; the pane was wrapped around the whole tree
    SiblingNotFound { pane_id: PaneId },
}

impl fmt::Display for MigrationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationWarning::Unreadable { version, reason } => match version {
                Some(v) => write!(f, "stored workspace (v{}) is unreadable: {}", v, reason),
                None => write!(f, "stored workspace is unreadable: {}", reason),
            },
            MigrationWarning::UnsupportedVersion(v) => {
                write!(f, "stored workspace has unsupported version {}", v)
            }
            MigrationWarning::MissingVersion => write!(f, "stored workspace has no version"),
            MigrationWarning::UnreadablePane { index, reason } => {
                write!(f, "stored pane #{} is unreadable and was dropped: {}", index, reason)
            }
            MigrationWarning::UnreadableLayout(reason) => {
                write!(f, "stored layout is unreadable and was dropped: {}", reason)
            }
            MigrationWarning::IncompleteMinimizedEntry { pane_id, reason } => write!(
                f,
                "legacy minimized pane {} is incomplete, using defaults: {}",
                pane_id, reason
            ),
            MigrationWarning::UnreadableMinimizedEntry { index, reason } => write!(
                f,
                "legacy minimized entry #{} is unreadable and was dropped: {}",
                index, reason
            ),
            MigrationWarning::UnknownMinimizedPane(id) => {
                write!(f, "legacy minimized pane {} is not in the pane list", id)
            }
            MigrationWarning::SiblingNotFound { pane_id } => write!(
                f,
                "legacy minimized pane {} lost its sibling; attached at the root",
                pane_id
            ),
        }
    }
}

/// Bring any stored workspace value to the current schema.
///
/// Each part (every pane, the tree, every legacy minimized entry) is read on
/// its own, so one malformed part is dropped with a warning instead of costing
/// the whole workspace.
pub fn migrate_workspace(raw: &Value) -> (WorkspaceSnapshot, Vec<MigrationWarning>) {
    let mut warnings = Vec::new();

    let version = raw.get("version").and_then(Value::as_u64);
    let snapshot = match version {
        Some(v) if v == u64::from(CURRENT_VERSION) => {
            let panes = read_panes(raw, v, &mut warnings);
            let split_layout = read_layout(raw, &mut warnings);
            let minimized_pane_ids = match raw.get("minimizedPaneIds") {
                Some(Value::Array(items)) => items.iter().filter_map(read::<PaneId>).collect(),
                _ => Vec::new(),
            };
            WorkspaceSnapshot {
                version: CURRENT_VERSION,
                panes,
                split_layout,
                focused_pane_id: read_focus(raw),
                minimized_pane_ids,
            }
        }
        Some(v) if v == u64::from(LEGACY_VERSION) => {
            let legacy = LegacyWorkspace {
                version: LEGACY_VERSION,
                panes: read_panes(raw, v, &mut warnings),
                split_layout: read_layout(raw, &mut warnings),
                focused_pane_id: read_focus(raw),
                minimized_panes: read_legacy_minimized(raw, &mut warnings),
            };
            migrate_v1(legacy, &mut warnings)
        }
        Some(v) => {
            warnings.push(MigrationWarning::UnsupportedVersion(v));
            WorkspaceSnapshot::empty()
        }
        None => {
            warnings.push(MigrationWarning::MissingVersion);
            WorkspaceSnapshot::empty()
        }
    };

    (snapshot, warnings)
}

fn read<T: DeserializeOwned>(value: &Value) -> Option<T> {
    serde_json::from_value(value.clone()).ok()
}

fn read_panes(raw: &Value, version: u64, warnings: &mut Vec<MigrationWarning>) -> Vec<PersistedPane> {
    let Some(items) = raw.get("panes").and_then(Value::as_array) else {
        warnings.push(MigrationWarning::Unreadable {
            version: Some(version),
            reason: "`panes` is not a list".to_string(),
        });
        return Vec::new();
    };

    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item.clone()) {
            Ok(pane) => Some(pane),
            Err(e) => {
                warnings.push(MigrationWarning::UnreadablePane {
                    index,
                    reason: e.to_string(),
                });
                None
            }
        })
        .collect()
}

/// Absent or null means no tree; a malformed tree is dropped with a warning
fn read_layout(raw: &Value, warnings: &mut Vec<MigrationWarning>) -> Option<SplitNode> {
    let value = raw.get("splitLayout").filter(|v| !v.is_null())?;
    match serde_json::from_value(value.clone()) {
        Ok(tree) => Some(tree),
        Err(e) => {
            warnings.push(MigrationWarning::UnreadableLayout(e.to_string()));
            None
        }
    }
}

fn read_focus(raw: &Value) -> Option<PaneId> {
    raw.get("focusedPaneId").and_then(read)
}

/// Legacy minimized entries. An entry missing anything but its pane id is
/// kept with defaults: no sibling, horizontal, pane second.
fn read_legacy_minimized(raw: &Value, warnings: &mut Vec<MigrationWarning>) -> Vec<LegacyMinimizedPane> {
    let Some(items) = raw.get("minimizedPanes").and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut entries = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let err = match serde_json::from_value::<LegacyMinimizedPane>(item.clone()) {
            Ok(entry) => {
                entries.push(entry);
                continue;
            }
            Err(e) => e.to_string(),
        };

        let Some(pane_id) = item.get("paneId").and_then(read::<PaneId>) else {
            warnings.push(MigrationWarning::UnreadableMinimizedEntry { index, reason: err });
            continue;
        };
        warnings.push(MigrationWarning::IncompleteMinimizedEntry { pane_id, reason: err });
        entries.push(LegacyMinimizedPane {
            pane_id,
            sibling_pane_id: item.get("siblingPaneId").and_then(read),
            direction: item
                .get("direction")
                .and_then(read)
                .unwrap_or(SplitDirection::Horizontal),
            pane_was_first: item
                .get("paneWasFirst")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        });
    }
    entries
}

/// Splice every excised minimized pane back into the tree, next to its recorded
/// sibling when that sibling is present, otherwise around the whole tree.
fn migrate_v1(legacy: LegacyWorkspace, warnings: &mut Vec<MigrationWarning>) -> WorkspaceSnapshot {
    let known: Vec<PaneId> = legacy.panes.iter().map(|p| p.id).collect();
    let mut tree = legacy.split_layout;
    let mut minimized = Vec::new();

    for entry in &legacy.minimized_panes {
        if !known.contains(&entry.pane_id) {
            warnings.push(MigrationWarning::UnknownMinimizedPane(entry.pane_id));
            continue;
        }
        if tree.as_ref().is_some_and(|t| t.contains(entry.pane_id)) {
            // Already in the tree; only the minimized flag needs carrying over
            if !minimized.contains(&entry.pane_id) {
                minimized.push(entry.pane_id);
            }
            continue;
        }

        let sibling = entry
            .sibling_pane_id
            .filter(|id| tree.as_ref().is_some_and(|t| t.contains(*id)));

        tree = match (sibling, tree.take()) {
            (Some(sibling), current) => split_pane_node_at(
                current.as_ref(),
                sibling,
                entry.pane_id,
                entry.direction,
                entry.pane_was_first,
            ),
            (None, Some(current)) => {
                warnings.push(MigrationWarning::SiblingNotFound {
                    pane_id: entry.pane_id,
                });
                let pane = SplitNode::leaf(entry.pane_id);
                Some(if entry.pane_was_first {
                    SplitNode::branch(entry.direction, 0.5, pane, current)
                } else {
                    SplitNode::branch(entry.direction, 0.5, current, pane)
                })
            }
            (None, None) => Some(SplitNode::leaf(entry.pane_id)),
        };
        minimized.push(entry.pane_id);
    }

    WorkspaceSnapshot {
        version: CURRENT_VERSION,
        panes: legacy.panes,
        split_layout: tree,
        focused_pane_id: legacy.focused_pane_id,
        minimized_pane_ids: minimized,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::pane_ids;
    use crate::persistence::snapshot::PersistedSession;
    use serde_json::json;
    use std::path::PathBuf;
    use uuid::Uuid;

    fn persisted_pane(id: PaneId, name: &str) -> PersistedPane {
        PersistedPane {
            id,
            name: name.to_string(),
            sessions: vec![PersistedSession {
                name: "Session 1".to_string(),
                cwd: PathBuf::from("/tmp"),
                worktree_label: None,
            }],
            active_index: Some(0),
        }
    }

    fn legacy_value(
        panes: &[(PaneId, &str)],
        tree: Option<SplitNode>,
        minimized: Value,
    ) -> Value {
        let panes: Vec<PersistedPane> = panes.iter().map(|(id, n)| persisted_pane(*id, n)).collect();
        json!({
            "version": 1,
            "panes": panes,
            "splitLayout": tree,
            "focusedPaneId": panes[0].id,
            "minimizedPanes": minimized,
        })
    }

    #[test]
    fn test_v1_sibling_known() {
        let (p1, p2) = (Uuid::new_v4(), Uuid::new_v4());
        let raw = legacy_value(
            &[(p1, "Pane 1"), (p2, "Pane 2")],
            Some(SplitNode::leaf(p1)),
            json!([{ "paneId": p2, "siblingPaneId": p1, "direction": "horizontal", "paneWasFirst": false }]),
        );

        let (snapshot, warnings) = migrate_workspace(&raw);

        assert!(warnings.is_empty());
        assert_eq!(snapshot.version, CURRENT_VERSION);
        assert_eq!(snapshot.pane_ids(), vec![p1, p2]);
        assert_eq!(snapshot.minimized_pane_ids, vec![p2]);
        assert_eq!(
            snapshot.split_layout,
            Some(SplitNode::branch(
                SplitDirection::Horizontal,
                0.5,
                SplitNode::leaf(p1),
                SplitNode::leaf(p2),
            ))
        );
    }

    #[test]
    fn test_v1_pane_was_first() {
        let (p1, p2) = (Uuid::new_v4(), Uuid::new_v4());
        let raw = legacy_value(
            &[(p1, "Pane 1"), (p2, "Pane 2")],
            Some(SplitNode::leaf(p1)),
            json!([{ "paneId": p2, "siblingPaneId": p1, "direction": "vertical", "paneWasFirst": true }]),
        );

        let (snapshot, _) = migrate_workspace(&raw);
        assert_eq!(pane_ids(snapshot.split_layout.as_ref()), vec![p2, p1]);
    }

    #[test]
    fn test_v1_missing_sibling_wraps_tree() {
        let (p1, p2, p3) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let raw = legacy_value(
            &[(p1, "Pane 1"), (p2, "Pane 2"), (p3, "Pane 3")],
            Some(SplitNode::branch(
                SplitDirection::Vertical,
                0.6,
                SplitNode::leaf(p1),
                SplitNode::leaf(p2),
            )),
            json!([{ "paneId": p3, "siblingPaneId": Uuid::new_v4(), "direction": "horizontal", "paneWasFirst": false }]),
        );

        let (snapshot, warnings) = migrate_workspace(&raw);

        assert_eq!(warnings, vec![MigrationWarning::SiblingNotFound { pane_id: p3 }]);
        match snapshot.split_layout.unwrap() {
            SplitNode::Branch { direction, ratio, first, second } => {
                assert_eq!(direction, SplitDirection::Horizontal);
                assert_eq!(ratio, 0.5);
                assert_eq!(first.pane_ids(), vec![p1, p2]);
                assert_eq!(*second, SplitNode::leaf(p3));
            }
            SplitNode::Leaf { .. } => panic!("expected a branch"),
        }
        assert_eq!(snapshot.minimized_pane_ids, vec![p3]);
    }

    #[test]
    fn test_v1_chained_minimized_uses_growing_tree() {
        // p3 was minimized next to p2, which was itself minimized
        let (p1, p2, p3) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let raw = legacy_value(
            &[(p1, "Pane 1"), (p2, "Pane 2"), (p3, "Pane 3")],
            Some(SplitNode::leaf(p1)),
            json!([
                { "paneId": p2, "siblingPaneId": p1, "direction": "horizontal", "paneWasFirst": false },
                { "paneId": p3, "siblingPaneId": p2, "direction": "vertical", "paneWasFirst": false },
            ]),
        );

        let (snapshot, warnings) = migrate_workspace(&raw);

        assert!(warnings.is_empty());
        assert_eq!(pane_ids(snapshot.split_layout.as_ref()), vec![p1, p2, p3]);
        assert_eq!(snapshot.minimized_pane_ids, vec![p2, p3]);
    }

    #[test]
    fn test_v1_unknown_minimized_pane_is_skipped() {
        let p1 = Uuid::new_v4();
        let stray = Uuid::new_v4();
        let raw = legacy_value(
            &[(p1, "Pane 1")],
            Some(SplitNode::leaf(p1)),
            json!([{ "paneId": stray, "siblingPaneId": p1, "direction": "horizontal", "paneWasFirst": false }]),
        );

        let (snapshot, warnings) = migrate_workspace(&raw);
        assert_eq!(warnings, vec![MigrationWarning::UnknownMinimizedPane(stray)]);
        assert_eq!(snapshot.split_layout, Some(SplitNode::leaf(p1)));
        assert!(snapshot.minimized_pane_ids.is_empty());
    }

    #[test]
    fn test_v2_passes_through() {
        let p1 = Uuid::new_v4();
        let snapshot = WorkspaceSnapshot {
            version: CURRENT_VERSION,
            panes: vec![persisted_pane(p1, "Pane 1")],
            split_layout: Some(SplitNode::leaf(p1)),
            focused_pane_id: Some(p1),
            minimized_pane_ids: vec![],
        };
        let raw = serde_json::to_value(&snapshot).unwrap();

        let (migrated, warnings) = migrate_workspace(&raw);
        assert!(warnings.is_empty());
        assert_eq!(migrated, snapshot);
    }

    #[test]
    fn test_bad_input_yields_empty() {
        let (snapshot, warnings) = migrate_workspace(&json!({ "version": 7 }));
        assert_eq!(snapshot, WorkspaceSnapshot::empty());
        assert_eq!(warnings, vec![MigrationWarning::UnsupportedVersion(7)]);

        let (snapshot, warnings) = migrate_workspace(&json!("garbage"));
        assert_eq!(snapshot, WorkspaceSnapshot::empty());
        assert_eq!(warnings, vec![MigrationWarning::MissingVersion]);

        let (snapshot, warnings) = migrate_workspace(&json!({ "version": 2, "panes": 3 }));
        assert!(snapshot.panes.is_empty());
        assert!(matches!(warnings[0], MigrationWarning::Unreadable { version: Some(2), .. }));
    }

    // ==================== Partial damage ====================

    #[test]
    fn test_v1_entry_missing_flag_keeps_every_pane() {
        let (p1, p2) = (Uuid::new_v4(), Uuid::new_v4());
        let raw = legacy_value(
            &[(p1, "Pane 1"), (p2, "Pane 2")],
            Some(SplitNode::leaf(p1)),
            json!([{ "paneId": p2, "siblingPaneId": p1, "direction": "vertical" }]),
        );

        let (snapshot, warnings) = migrate_workspace(&raw);

        assert_eq!(snapshot.pane_ids(), vec![p1, p2]);
        assert_eq!(snapshot.minimized_pane_ids, vec![p2]);
        assert_eq!(
            snapshot.split_layout,
            Some(SplitNode::branch(
                SplitDirection::Vertical,
                0.5,
                SplitNode::leaf(p1),
                SplitNode::leaf(p2),
            ))
        );
        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            &warnings[0],
            MigrationWarning::IncompleteMinimizedEntry { pane_id, .. } if *pane_id == p2
        ));
    }

    #[test]
    fn test_v1_entry_without_pane_id_is_dropped() {
        let p1 = Uuid::new_v4();
        let raw = legacy_value(
            &[(p1, "Pane 1")],
            Some(SplitNode::leaf(p1)),
            json!([{ "paneId": "not-a-uuid", "direction": "vertical", "paneWasFirst": true }]),
        );

        let (snapshot, warnings) = migrate_workspace(&raw);

        assert_eq!(snapshot.pane_ids(), vec![p1]);
        assert_eq!(snapshot.split_layout, Some(SplitNode::leaf(p1)));
        assert!(matches!(
            warnings.as_slice(),
            [MigrationWarning::UnreadableMinimizedEntry { index: 0, .. }]
        ));
    }

    #[test]
    fn test_v2_unknown_layout_type_keeps_panes() {
        let (p1, p2) = (Uuid::new_v4(), Uuid::new_v4());
        let raw = json!({
            "version": 2,
            "panes": [persisted_pane(p1, "Pane 1"), persisted_pane(p2, "Pane 2")],
            "splitLayout": { "type": "grid", "cells": [p1, p2] },
            "focusedPaneId": p2,
            "minimizedPaneIds": [p2],
        });

        let (snapshot, warnings) = migrate_workspace(&raw);

        assert_eq!(snapshot.pane_ids(), vec![p1, p2]);
        assert_eq!(snapshot.split_layout, None);
        assert_eq!(snapshot.focused_pane_id, Some(p2));
        assert_eq!(snapshot.minimized_pane_ids, vec![p2]);
        assert!(matches!(warnings.as_slice(), [MigrationWarning::UnreadableLayout(_)]));
    }

    #[test]
    fn test_v2_malformed_pane_is_dropped_alone() {
        let (p1, p2) = (Uuid::new_v4(), Uuid::new_v4());
        let raw = json!({
            "version": 2,
            "panes": [
                persisted_pane(p1, "Pane 1"),
                { "id": Uuid::new_v4(), "name": "Pane 2" },
                persisted_pane(p2, "Pane 3"),
            ],
            "splitLayout": null,
            "focusedPaneId": "bogus",
        });

        let (snapshot, warnings) = migrate_workspace(&raw);

        assert_eq!(snapshot.pane_ids(), vec![p1, p2]);
        assert_eq!(snapshot.focused_pane_id, None);
        assert!(snapshot.minimized_pane_ids.is_empty());
        assert!(matches!(
            warnings.as_slice(),
            [MigrationWarning::UnreadablePane { index: 1, .. }]
        ));
    }
}
