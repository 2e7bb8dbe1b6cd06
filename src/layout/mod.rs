//! Layout algebra: pure functions over an optional split tree.

mod geometry;
mod tree;

pub use geometry::{bounds, dividers, pane_at, DividerInfo, Rect};
pub use tree::{
    clamp_ratio, pane_ids, remove_pane, split_pane_node_at, update_ratio_at_path, PathParseError,
    PathStep, SplitDirection, SplitNode, SplitPath, MAX_RATIO, MIN_RATIO,
};
