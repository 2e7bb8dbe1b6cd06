//! `SplitNode` — immutable binary tree describing how panes partition the screen.
//!
//! Every mutation returns a new tree; unchanged subtrees are cloned, never edited
//! in place, so callers can keep the previous value as a snapshot.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::models::PaneId;

pub const MIN_RATIO: f64 = 0.15;
pub const MAX_RATIO: f64 = 0.85;

/// Clamp a divider ratio into `[MIN_RATIO, MAX_RATIO]`. NaN maps to an even split.
pub fn clamp_ratio(ratio: f64) -> f64 {
    if ratio.is_nan() {
        return 0.5;
    }
    ratio.clamp(MIN_RATIO, MAX_RATIO)
}

/// `Horizontal` places children side by side (splits width),
/// `Vertical` stacks them (splits height).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitDirection {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SplitNode {
    #[serde(rename_all = "camelCase")]
    Leaf { pane_id: PaneId },
    Branch {
        direction: SplitDirection,
        /// Share of the parent's extent given to `first`
        ratio: f64,
        first: Box<SplitNode>,
        second: Box<SplitNode>,
    },
}

impl SplitNode {
    pub fn leaf(pane_id: PaneId) -> Self {
        SplitNode::Leaf { pane_id }
    }

    pub fn branch(direction: SplitDirection, ratio: f64, first: SplitNode, second: SplitNode) -> Self {
        SplitNode::Branch {
            direction,
            ratio: clamp_ratio(ratio),
            first: Box::new(first),
            second: Box::new(second),
        }
    }

    /// Pre-order list of leaf pane ids
    pub fn pane_ids(&self) -> Vec<PaneId> {
        let mut ids = Vec::new();
        self.collect_ids(&mut ids);
        ids
    }

    fn collect_ids(&self, ids: &mut Vec<PaneId>) {
        match self {
            SplitNode::Leaf { pane_id } => ids.push(*pane_id),
            SplitNode::Branch { first, second, .. } => {
                first.collect_ids(ids);
                second.collect_ids(ids);
            }
        }
    }

    pub fn contains(&self, id: PaneId) -> bool {
        match self {
            SplitNode::Leaf { pane_id } => *pane_id == id,
            SplitNode::Branch { first, second, .. } => first.contains(id) || second.contains(id),
        }
    }

    pub fn node_at(&self, path: &SplitPath) -> Option<&SplitNode> {
        path.steps().iter().try_fold(self, |node, step| match node {
            SplitNode::Leaf { .. } => None,
            SplitNode::Branch { first, second, .. } => Some(match step {
                PathStep::First => first.as_ref(),
                PathStep::Second => second.as_ref(),
            }),
        })
    }

    /// Copy of the tree with every branch ratio clamped (used on load)
    pub fn clamped(&self) -> SplitNode {
        match self {
            SplitNode::Leaf { .. } => self.clone(),
            SplitNode::Branch {
                direction,
                ratio,
                first,
                second,
            } => SplitNode::branch(*direction, *ratio, first.clamped(), second.clamped()),
        }
    }

    fn without(&self, id: PaneId) -> Option<SplitNode> {
        match self {
            SplitNode::Leaf { pane_id } if *pane_id == id => None,
            SplitNode::Leaf { .. } => Some(self.clone()),
            SplitNode::Branch {
                direction,
                ratio,
                first,
                second,
            } => match (first.without(id), second.without(id)) {
                (Some(first), Some(second)) => Some(SplitNode::Branch {
                    direction: *direction,
                    ratio: *ratio,
                    first: Box::new(first),
                    second: Box::new(second),
                }),
                (Some(only), None) | (None, Some(only)) => Some(only),
                (None, None) => None,
            },
        }
    }

    fn split_at(
        &self,
        target: PaneId,
        new_id: PaneId,
        direction: SplitDirection,
        new_first: bool,
    ) -> SplitNode {
        match self {
            SplitNode::Leaf { pane_id } if *pane_id == target => {
                let existing = self.clone();
                let added = SplitNode::leaf(new_id);
                if new_first {
                    SplitNode::branch(direction, 0.5, added, existing)
                } else {
                    SplitNode::branch(direction, 0.5, existing, added)
                }
            }
            SplitNode::Leaf { .. } => self.clone(),
            SplitNode::Branch {
                direction: d,
                ratio,
                first,
                second,
            } => SplitNode::Branch {
                direction: *d,
                ratio: *ratio,
                first: Box::new(first.split_at(target, new_id, direction, new_first)),
                second: Box::new(second.split_at(target, new_id, direction, new_first)),
            },
        }
    }

    fn with_ratio_at(&self, steps: &[PathStep], new_ratio: f64) -> SplitNode {
        let SplitNode::Branch {
            direction,
            ratio,
            first,
            second,
        } = self
        else {
            return self.clone();
        };

        match steps.split_first() {
            None => SplitNode::Branch {
                direction: *direction,
                ratio: clamp_ratio(new_ratio),
                first: first.clone(),
                second: second.clone(),
            },
            Some((PathStep::First, rest)) => SplitNode::Branch {
                direction: *direction,
                ratio: *ratio,
                first: Box::new(first.with_ratio_at(rest, new_ratio)),
                second: second.clone(),
            },
            Some((PathStep::Second, rest)) => SplitNode::Branch {
                direction: *direction,
                ratio: *ratio,
                first: first.clone(),
                second: Box::new(second.with_ratio_at(rest, new_ratio)),
            },
        }
    }
}

pub fn pane_ids(tree: Option<&SplitNode>) -> Vec<PaneId> {
    tree.map(SplitNode::pane_ids).unwrap_or_default()
}

/// Remove a leaf. A branch left with one child collapses into it; an empty tree is `None`.
pub fn remove_pane(tree: Option<&SplitNode>, id: PaneId) -> Option<SplitNode> {
    tree.and_then(|node| node.without(id))
}

/// Replace the `target` leaf with an even branch holding `target` and `new_id`.
pub fn split_pane_node_at(
    tree: Option<&SplitNode>,
    target: PaneId,
    new_id: PaneId,
    direction: SplitDirection,
    new_first: bool,
) -> Option<SplitNode> {
    tree.map(|node| node.split_at(target, new_id, direction, new_first))
}

/// Set the ratio of the branch at `path`. Paths ending on (or passing through) a leaf are a no-op.
pub fn update_ratio_at_path(tree: Option<&SplitNode>, path: &SplitPath, ratio: f64) -> Option<SplitNode> {
    tree.map(|node| node.with_ratio_at(path.steps(), ratio))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathStep {
    First,
    Second,
}

impl PathStep {
    fn as_str(&self) -> &'static str {
        match self {
            PathStep::First => "first",
            PathStep::Second => "second",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathParseError {
    #[error("unknown split path token `{0}` (expected `first` or `second`)")]
    UnknownToken(String),
}

/// Address of a node: `/`-joined `first`/`second` tokens, empty for the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SplitPath(Vec<PathStep>);

impl SplitPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn child(&self, step: PathStep) -> Self {
        let mut steps = self.0.clone();
        steps.push(step);
        Self(steps)
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SplitPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tokens: Vec<&str> = self.0.iter().map(PathStep::as_str).collect();
        write!(f, "{}", tokens.join("/"))
    }
}

impl FromStr for SplitPath {
    type Err = PathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .split('/')
            .filter(|token| !token.is_empty())
            .map(|token| match token {
                "first" => Ok(PathStep::First),
                "second" => Ok(PathStep::Second),
                other => Err(PathParseError::UnknownToken(other.to_string())),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(SplitPath)
    }
}
