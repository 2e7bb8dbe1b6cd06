//! Normalized geometry for a split tree: pane rectangles and dividers in `[0,1]²`.

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use super::tree::{PathStep, SplitDirection, SplitNode, SplitPath};
use crate::models::PaneId;

/// Rectangle in normalized screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub const UNIT: Rect = Rect {
        x: 0.0,
        y: 0.0,
        w: 1.0,
        h: 1.0,
    };

    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn is_empty(&self) -> bool {
        self.w <= 0.0 || self.h <= 0.0
    }

    /// Half-open containment, except that an edge lying on the screen's outer
    /// border is inclusive. Empty rectangles contain nothing.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        !self.is_empty()
            && x >= self.x
            && y >= self.y
            && within_far_edge(x, self.x + self.w)
            && within_far_edge(y, self.y + self.h)
    }

    /// Split at `ratio` along `direction`. The second part is derived from the
    /// first so the two always cover the original exactly.
    fn split(&self, direction: SplitDirection, ratio: f64) -> (Rect, Rect) {
        match direction {
            SplitDirection::Horizontal => {
                let first_w = self.w * ratio;
                (
                    Rect::new(self.x, self.y, first_w, self.h),
                    Rect::new(self.x + first_w, self.y, self.w - first_w, self.h),
                )
            }
            SplitDirection::Vertical => {
                let first_h = self.h * ratio;
                (
                    Rect::new(self.x, self.y, self.w, first_h),
                    Rect::new(self.x, self.y + first_h, self.w, self.h - first_h),
                )
            }
        }
    }
}

/// Tolerance for treating a far edge as the screen border
const BORDER_EPS: f64 = 1e-9;

fn within_far_edge(v: f64, edge: f64) -> bool {
    v < edge || (edge >= 1.0 - BORDER_EPS && v <= edge.max(1.0))
}

/// A draggable boundary between the two children of a branch
#[derive(Debug, Clone, PartialEq)]
pub struct DividerInfo {
    pub path: SplitPath,
    pub direction: SplitDirection,
    /// Zero-thickness line along the split
    pub bounds: Rect,
    pub ratio: f64,
    /// Set when either side has zero extent because all of its panes are minimized
    pub disabled: bool,
}

/// True when every pane under `node` is minimized
fn is_collapsed(node: &SplitNode, minimized: &HashSet<PaneId>) -> bool {
    match node {
        SplitNode::Leaf { pane_id } => minimized.contains(pane_id),
        SplitNode::Branch { first, second, .. } => {
            is_collapsed(first, minimized) && is_collapsed(second, minimized)
        }
    }
}

/// A fully minimized side gets nothing and its sibling takes the whole extent.
/// When both sides are minimized the stored ratio still applies, so the parent
/// rectangle stays partitioned.
fn effective_ratio(ratio: f64, first_collapsed: bool, second_collapsed: bool) -> f64 {
    match (first_collapsed, second_collapsed) {
        (true, false) => 0.0,
        (false, true) => 1.0,
        _ => ratio,
    }
}

/// Rectangle for every pane in the tree. Minimized panes keep their leaf but
/// resolve to zero width (horizontal branch) or zero height (vertical branch).
pub fn bounds(tree: Option<&SplitNode>, minimized: &[PaneId]) -> HashMap<PaneId, Rect> {
    let minimized: HashSet<PaneId> = minimized.iter().copied().collect();
    let mut out = HashMap::new();
    if let Some(root) = tree {
        collect_bounds(root, Rect::UNIT, &minimized, &mut out);
    }
    out
}

fn collect_bounds(
    node: &SplitNode,
    rect: Rect,
    minimized: &HashSet<PaneId>,
    out: &mut HashMap<PaneId, Rect>,
) {
    match node {
        SplitNode::Leaf { pane_id } => {
            out.insert(*pane_id, rect);
        }
        SplitNode::Branch {
            direction,
            ratio,
            first,
            second,
        } => {
            let ratio = effective_ratio(
                *ratio,
                is_collapsed(first, minimized),
                is_collapsed(second, minimized),
            );
            let (first_rect, second_rect) = rect.split(*direction, ratio);
            collect_bounds(first, first_rect, minimized, out);
            collect_bounds(second, second_rect, minimized, out);
        }
    }
}

/// One divider per branch, in pre-order.
pub fn dividers(tree: Option<&SplitNode>, minimized: &[PaneId]) -> Vec<DividerInfo> {
    let minimized: HashSet<PaneId> = minimized.iter().copied().collect();
    let mut out = Vec::new();
    if let Some(root) = tree {
        collect_dividers(root, SplitPath::root(), Rect::UNIT, &minimized, &mut out);
    }
    out
}

fn collect_dividers(
    node: &SplitNode,
    path: SplitPath,
    rect: Rect,
    minimized: &HashSet<PaneId>,
    out: &mut Vec<DividerInfo>,
) {
    let SplitNode::Branch {
        direction,
        ratio,
        first,
        second,
    } = node
    else {
        return;
    };

    let first_collapsed = is_collapsed(first, minimized);
    let second_collapsed = is_collapsed(second, minimized);
    let (first_rect, second_rect) =
        rect.split(*direction, effective_ratio(*ratio, first_collapsed, second_collapsed));

    let line = match direction {
        SplitDirection::Horizontal => Rect::new(second_rect.x, rect.y, 0.0, rect.h),
        SplitDirection::Vertical => Rect::new(rect.x, second_rect.y, rect.w, 0.0),
    };

    out.push(DividerInfo {
        path: path.clone(),
        direction: *direction,
        bounds: line,
        ratio: *ratio,
        disabled: first_collapsed || second_collapsed,
    });

    collect_dividers(first, path.child(PathStep::First), first_rect, minimized, out);
    collect_dividers(second, path.child(PathStep::Second), second_rect, minimized, out);
}

/// Visible pane under a normalized point
pub fn pane_at(bounds: &HashMap<PaneId, Rect>, x: f64, y: f64) -> Option<PaneId> {
    bounds
        .iter()
        .find(|(_, rect)| rect.contains(x, y))
        .map(|(id, _)| *id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::tree::split_pane_node_at;
    use uuid::Uuid;

    const EPS: f64 = 1e-9;

    fn ids(n: usize) -> Vec<PaneId> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    /// Deep tree built by repeatedly splitting the newest pane, alternating direction
    fn deep_tree(p: &[PaneId]) -> SplitNode {
        let mut tree = SplitNode::leaf(p[0]);
        for (i, window) in p.windows(2).enumerate() {
            let direction = if i % 2 == 0 {
                SplitDirection::Horizontal
            } else {
                SplitDirection::Vertical
            };
            tree = split_pane_node_at(Some(&tree), window[0], window[1], direction, i % 3 == 0)
                .unwrap();
        }
        tree
    }

    /// Recursively check that each branch's children partition its rectangle
    fn assert_partition(node: &SplitNode, rect: Rect, b: &HashMap<PaneId, Rect>) -> Rect {
        match node {
            SplitNode::Leaf { pane_id } => {
                let r = b[pane_id];
                assert!((r.x - rect.x).abs() < EPS && (r.y - rect.y).abs() < EPS);
                assert!((r.w - rect.w).abs() < EPS && (r.h - rect.h).abs() < EPS);
                r
            }
            SplitNode::Branch { direction, first, second, .. } => {
                let f = envelope(first, b);
                let s = envelope(second, b);
                match direction {
                    SplitDirection::Horizontal => {
                        assert!((f.x - rect.x).abs() < EPS);
                        assert!((f.x + f.w - s.x).abs() < EPS, "gap or overlap");
                        assert!((s.x + s.w - (rect.x + rect.w)).abs() < EPS);
                        assert!((f.h - rect.h).abs() < EPS && (s.h - rect.h).abs() < EPS);
                    }
                    SplitDirection::Vertical => {
                        assert!((f.y - rect.y).abs() < EPS);
                        assert!((f.y + f.h - s.y).abs() < EPS, "gap or overlap");
                        assert!((s.y + s.h - (rect.y + rect.h)).abs() < EPS);
                        assert!((f.w - rect.w).abs() < EPS && (s.w - rect.w).abs() < EPS);
                    }
                }
                assert_partition(first, f, b);
                assert_partition(second, s, b);
                rect
            }
        }
    }

    /// Bounding box of all leaves under `node`
    fn envelope(node: &SplitNode, b: &HashMap<PaneId, Rect>) -> Rect {
        let rects: Vec<Rect> = node.pane_ids().iter().map(|id| b[id]).collect();
        let x0 = rects.iter().map(|r| r.x).fold(f64::INFINITY, f64::min);
        let y0 = rects.iter().map(|r| r.y).fold(f64::INFINITY, f64::min);
        let x1 = rects.iter().map(|r| r.x + r.w).fold(f64::NEG_INFINITY, f64::max);
        let y1 = rects.iter().map(|r| r.y + r.h).fold(f64::NEG_INFINITY, f64::max);
        Rect::new(x0, y0, x1 - x0, y1 - y0)
    }

    #[test]
    fn test_bounds_partition_deep_tree() {
        let p = ids(9);
        let tree = deep_tree(&p);
        let b = bounds(Some(&tree), &[]);

        assert_eq!(b.len(), 9);
        assert_partition(&tree, Rect::UNIT, &b);
        for rect in b.values() {
            assert!(rect.x >= -EPS && rect.y >= -EPS);
            assert!(rect.x + rect.w <= 1.0 + EPS && rect.y + rect.h <= 1.0 + EPS);
        }
        let area: f64 = b.values().map(|r| r.w * r.h).sum();
        assert!((area - 1.0).abs() < EPS);
    }

    #[test]
    fn test_bounds_partition_with_minimized() {
        let p = ids(7);
        let tree = deep_tree(&p);
        let b = bounds(Some(&tree), &[p[2], p[5]]);

        let area: f64 = b.values().map(|r| r.w * r.h).sum();
        assert!((area - 1.0).abs() < EPS);
        assert!(b[&p[2]].w * b[&p[2]].h < EPS);
        assert!(b[&p[5]].w * b[&p[5]].h < EPS);
    }

    #[test]
    fn test_minimized_side_frees_width() {
        let p = ids(2);
        let tree = SplitNode::branch(
            SplitDirection::Horizontal,
            0.5,
            SplitNode::leaf(p[0]),
            SplitNode::leaf(p[1]),
        );

        let b = bounds(Some(&tree), &[p[0]]);
        assert_eq!(b[&p[0]].w, 0.0);
        assert_eq!(b[&p[1]].w, 1.0);
        assert_eq!(b[&p[1]].x, 0.0);
    }

    #[test]
    fn test_minimized_side_frees_height() {
        let p = ids(2);
        let tree = SplitNode::branch(
            SplitDirection::Vertical,
            0.3,
            SplitNode::leaf(p[0]),
            SplitNode::leaf(p[1]),
        );

        let b = bounds(Some(&tree), &[p[1]]);
        assert_eq!(b[&p[0]].h, 1.0);
        assert_eq!(b[&p[1]].h, 0.0);
        assert_eq!(b[&p[0]].w, 1.0);
    }

    #[test]
    fn test_minimized_subtree_collapses_as_unit() {
        let p = ids(3);
        // a | (b / c), both b and c minimized
        let tree = SplitNode::branch(
            SplitDirection::Horizontal,
            0.4,
            SplitNode::leaf(p[0]),
            SplitNode::branch(
                SplitDirection::Vertical,
                0.5,
                SplitNode::leaf(p[1]),
                SplitNode::leaf(p[2]),
            ),
        );

        let b = bounds(Some(&tree), &[p[1], p[2]]);
        assert_eq!(b[&p[0]].w, 1.0);
        assert_eq!(b[&p[1]].w, 0.0);
        assert_eq!(b[&p[2]].w, 0.0);
    }

    #[test]
    fn test_dividers_paths_and_disabled() {
        let p = ids(3);
        let tree = SplitNode::branch(
            SplitDirection::Horizontal,
            0.4,
            SplitNode::leaf(p[0]),
            SplitNode::branch(
                SplitDirection::Vertical,
                0.5,
                SplitNode::leaf(p[1]),
                SplitNode::leaf(p[2]),
            ),
        );

        let all = dividers(Some(&tree), &[]);
        assert_eq!(all.len(), 2);
        assert!(all[0].path.is_root());
        assert_eq!(all[1].path.to_string(), "second");
        assert!(all.iter().all(|d| !d.disabled));
        assert!((all[0].bounds.x - 0.4).abs() < EPS);
        assert_eq!(all[0].bounds.w, 0.0);
        assert!((all[1].bounds.y - 0.5).abs() < EPS);
        assert!((all[1].bounds.x - 0.4).abs() < EPS);

        let with_min = dividers(Some(&tree), &[p[2]]);
        assert!(!with_min[0].disabled);
        assert!(with_min[1].disabled);

        // Both sides minimized: still disabled
        let both = dividers(Some(&tree), &[p[1], p[2]]);
        assert!(both[0].disabled);
        assert!(both[1].disabled);
    }

    #[test]
    fn test_leaf_and_empty_tree() {
        let p = ids(1);
        let leaf = SplitNode::leaf(p[0]);
        assert_eq!(bounds(Some(&leaf), &[])[&p[0]], Rect::UNIT);
        assert!(dividers(Some(&leaf), &[]).is_empty());
        assert!(bounds(None, &[]).is_empty());
    }

    #[test]
    fn test_pane_at_skips_minimized() {
        let p = ids(2);
        let tree = SplitNode::branch(
            SplitDirection::Horizontal,
            0.5,
            SplitNode::leaf(p[0]),
            SplitNode::leaf(p[1]),
        );

        let b = bounds(Some(&tree), &[]);
        assert_eq!(pane_at(&b, 0.1, 0.5), Some(p[0]));
        assert_eq!(pane_at(&b, 0.9, 0.5), Some(p[1]));
        assert_eq!(pane_at(&b, 1.5, 0.5), None);

        let b = bounds(Some(&tree), &[p[0]]);
        assert_eq!(pane_at(&b, 0.0, 0.5), Some(p[1]));
    }

    #[test]
    fn test_pane_at_includes_outer_border() {
        let p = ids(3);
        let tree = SplitNode::branch(
            SplitDirection::Horizontal,
            0.3,
            SplitNode::leaf(p[0]),
            SplitNode::branch(
                SplitDirection::Vertical,
                0.7,
                SplitNode::leaf(p[1]),
                SplitNode::leaf(p[2]),
            ),
        );
        let b = bounds(Some(&tree), &[]);

        assert_eq!(pane_at(&b, 1.0, 1.0), Some(p[2]));
        assert_eq!(pane_at(&b, 1.0, 0.1), Some(p[1]));
        assert_eq!(pane_at(&b, 0.0, 1.0), Some(p[0]));
        // Inner edges stay half-open: the shared boundary belongs to the second pane
        assert_eq!(pane_at(&b, 0.3, 0.1), Some(p[1]));
        assert_eq!(pane_at(&b, 1.0 + 1e-3, 0.5), None);

        let leaf = SplitNode::leaf(p[0]);
        assert_eq!(pane_at(&bounds(Some(&leaf), &[]), 1.0, 1.0), Some(p[0]));
    }
}
