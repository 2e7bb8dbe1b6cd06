use crate::layout::SplitNode;
use crate::models::PaneId;

/// Split tree, focus and minimized set
pub struct LayoutState {
    pub tree: Option<SplitNode>,
    pub focused_pane_id: Option<PaneId>,
    /// Hidden panes; they stay in the tree with zero extent
    pub minimized_pane_ids: Vec<PaneId>,
}

impl LayoutState {
    pub fn new() -> Self {
        Self {
            tree: None,
            focused_pane_id: None,
            minimized_pane_ids: Vec::new(),
        }
    }

    pub fn is_minimized(&self, pane_id: PaneId) -> bool {
        self.minimized_pane_ids.contains(&pane_id)
    }
}

impl Default for LayoutState {
    fn default() -> Self {
        Self::new()
    }
}
