use std::collections::BTreeMap;

use egui::{Pos2, Rect};

use crate::geometry;
use crate::pane::{
    ContentId, PaneId, PaneKind, SPLITTER_WIDTH, Split, SplitDirection, SplitPane, Tabs,
    clamp_ratio,
};

/// Arena holding the split tree.
///
/// The root node is created with the tree and is never removed: it only flips between leaf and
/// split. Every other node is created by a split and destroyed by an unsplit.
#[derive(Clone, Debug)]
pub struct PaneTree {
    nodes: BTreeMap<PaneId, SplitPane>,
    root: PaneId,
    next_id: u64,
}

impl PaneTree {
    /// A single root leaf showing `initial`.
    pub fn new(initial: ContentId) -> Self {
        let mut tree = Self {
            nodes: BTreeMap::new(),
            root: PaneId::from_raw(1),
            next_id: 1,
        };
        let root = tree.alloc_id();
        tree.root = root;
        tree.nodes
            .insert(root, SplitPane::leaf(root, None, Tabs::single(initial)));
        tree
    }

    /// Assemble a tree from pre-validated parts (used by layout restore).
    pub(crate) fn from_parts(nodes: BTreeMap<PaneId, SplitPane>, root: PaneId, next_id: u64) -> Self {
        Self {
            nodes,
            root,
            next_id,
        }
    }

    pub(crate) fn next_id(&self) -> u64 {
        self.next_id
    }

    fn alloc_id(&mut self) -> PaneId {
        let id = PaneId::from_raw(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    pub fn root(&self) -> PaneId {
        self.root
    }

    pub fn root_pane(&self) -> Option<&SplitPane> {
        self.nodes.get(&self.root)
    }

    pub fn get(&self, id: PaneId) -> Option<&SplitPane> {
        self.nodes.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: PaneId) -> Option<&mut SplitPane> {
        self.nodes.get_mut(&id)
    }

    /// Same as [`Self::get`]; named after the tree search it replaces.
    pub fn find_by_id(&self, id: PaneId) -> Option<&SplitPane> {
        self.get(id)
    }

    /// All nodes in the arena, reachable or not, in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &SplitPane> + '_ {
        self.nodes.values()
    }

    /// Total number of nodes (leaves and splits).
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves().len()
    }

    pub fn is_split(&self) -> bool {
        self.root_pane().is_some_and(SplitPane::is_split)
    }

    // ------------------------------------------------------------------------
    // Traversal

    /// Leaf ids in depth-first order (first child before second).
    pub fn leaves(&self) -> Vec<PaneId> {
        self.preorder()
            .into_iter()
            .filter(|id| self.get(*id).is_some_and(SplitPane::is_leaf))
            .collect()
    }

    /// Leaves in depth-first order.
    pub fn leaf_panes(&self) -> impl Iterator<Item = &SplitPane> + '_ {
        self.leaves().into_iter().filter_map(move |id| self.get(id))
    }

    /// All reachable node ids in preorder (node, first subtree, second subtree).
    pub fn preorder(&self) -> Vec<PaneId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.get(id) else {
                continue;
            };
            out.push(id);
            if let PaneKind::Split(split) = &node.kind {
                stack.push(split.second);
                stack.push(split.first);
            }
        }
        out
    }

    /// Ids of `id` and every node below it.
    fn subtree(&self, id: PaneId) -> Vec<PaneId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            let Some(node) = self.get(id) else {
                continue;
            };
            out.push(id);
            if let PaneKind::Split(split) = &node.kind {
                stack.push(split.second);
                stack.push(split.first);
            }
        }
        out
    }

    /// First leaf (depth-first) of the subtree rooted at `id`.
    pub fn first_leaf(&self, id: PaneId) -> Option<PaneId> {
        let mut current = id;
        loop {
            match &self.get(current)?.kind {
                PaneKind::Leaf(_) => return Some(current),
                PaneKind::Split(split) => current = split.first,
            }
        }
    }

    /// The leaf whose tab list holds `content`.
    pub fn find_by_content(&self, content: ContentId) -> Option<PaneId> {
        self.leaf_panes()
            .find(|pane| pane.has_figure(content))
            .map(SplitPane::id)
    }

    pub fn contains_content(&self, content: ContentId) -> bool {
        self.find_by_content(content).is_some()
    }

    /// Every content id in depth-first leaf order, each leaf's tabs in tab order.
    pub fn all_contents(&self) -> Vec<ContentId> {
        self.leaf_panes()
            .flat_map(|pane| pane.contents().iter().copied())
            .collect()
    }

    // ------------------------------------------------------------------------
    // Hit testing

    /// The leaf under `pos`, descending through whichever child contains it.
    ///
    /// Points in a gutter, or outside the last laid-out root bounds, hit nothing.
    pub fn find_at_point(&self, pos: Pos2) -> Option<PaneId> {
        let mut current = self.root_pane()?;
        if !geometry::contains(current.bounds, pos) {
            return None;
        }
        loop {
            match &current.kind {
                PaneKind::Leaf(_) => return Some(current.id),
                PaneKind::Split(split) => {
                    current = [split.first, split.second]
                        .into_iter()
                        .filter_map(|id| self.get(id))
                        .find(|child| geometry::contains(child.bounds, pos))?;
                }
            }
        }
    }

    /// The split whose gutter (widened by `tolerance`) is under `pos`.
    ///
    /// Splits are tested in preorder, so an outer split wins over a nested one.
    pub fn find_splitter_at(&self, pos: Pos2, tolerance: f32) -> Option<PaneId> {
        self.preorder().into_iter().find(|&id| {
            self.get(id).is_some_and(|node| match &node.kind {
                PaneKind::Split(split) => {
                    let hit = geometry::splitter_hit_rect(
                        node.splitter_rect(),
                        split.direction,
                        tolerance,
                    );
                    geometry::has_area(node.bounds) && geometry::contains(hit, pos)
                }
                PaneKind::Leaf(_) => false,
            })
        })
    }

    // ------------------------------------------------------------------------
    // Layout

    /// Assign bounds to every node, starting with `bounds` at the root.
    pub fn compute_layout(&mut self, bounds: Rect) {
        self.layout_subtree(self.root, bounds);
    }

    fn layout_subtree(&mut self, id: PaneId, bounds: Rect) {
        let mut stack = vec![(id, bounds)];
        while let Some((id, bounds)) = stack.pop() {
            let Some(node) = self.get_mut(id) else {
                continue;
            };
            node.bounds = bounds;
            if let PaneKind::Split(split) = &node.kind {
                let (first, second) =
                    geometry::split_rect(bounds, split.direction, split.ratio, SPLITTER_WIDTH);
                stack.push((split.second, second));
                stack.push((split.first, first));
            }
        }
    }

    /// Re-run layout below `id` using its current bounds, if it has any.
    fn relayout_node(&mut self, id: PaneId) {
        if let Some(bounds) = self.get(id).map(SplitPane::bounds)
            && geometry::has_area(bounds)
        {
            self.layout_subtree(id, bounds);
        }
    }

    // ------------------------------------------------------------------------
    // Mutation

    /// Convert leaf `leaf` into a split in place.
    ///
    /// The leaf's tabs (order and active index) move into a new first child; a new second child
    /// holds `new_content`. The node keeps its id. Returns the id of the new second child, or
    /// `None` if `leaf` is not a leaf.
    pub fn split_leaf(
        &mut self,
        leaf: PaneId,
        direction: SplitDirection,
        new_content: ContentId,
        ratio: f32,
    ) -> Option<PaneId> {
        if !self.get(leaf)?.is_leaf() {
            return None;
        }
        let first = self.alloc_id();
        let second = self.alloc_id();

        let node = self.get_mut(leaf)?;
        let tabs = node.take_tabs();
        node.kind = PaneKind::Split(Split {
            direction,
            ratio: clamp_ratio(ratio),
            first,
            second,
        });

        self.nodes
            .insert(first, SplitPane::leaf(first, Some(leaf), tabs));
        self.nodes.insert(
            second,
            SplitPane::leaf(second, Some(leaf), Tabs::single(new_content)),
        );
        self.relayout_node(leaf);
        Some(second)
    }

    /// Replace split `node` by one of its children, in place.
    ///
    /// The surviving child's kind (tabs, or direction/ratio/children) is moved into `node`, which
    /// keeps its own id; grandchildren are reparented; the discarded subtree and the surviving
    /// child's now-empty slot are dropped. Returns `false` if `node` is not a split.
    pub fn unsplit(&mut self, node: PaneId, keep_first: bool) -> bool {
        let Some(split) = self.get(node).and_then(SplitPane::split).copied() else {
            return false;
        };
        let (kept, discarded) = if keep_first {
            (split.first, split.second)
        } else {
            (split.second, split.first)
        };

        for id in self.subtree(discarded) {
            self.nodes.remove(&id);
        }
        let Some(kept) = self.nodes.remove(&kept) else {
            return false;
        };
        if let PaneKind::Split(grand) = &kept.kind {
            for child in [grand.first, grand.second] {
                if let Some(child) = self.get_mut(child) {
                    child.parent = Some(node);
                }
            }
        }
        if let Some(target) = self.get_mut(node) {
            target.kind = kept.kind;
        }
        self.relayout_node(node);
        true
    }

    /// Collapse the tree to a single root leaf holding `tabs`.
    pub(crate) fn reset_to_leaf(&mut self, tabs: Tabs) {
        let root = self.root;
        self.nodes.retain(|&id, _| id == root);
        if let Some(node) = self.get_mut(root) {
            node.kind = PaneKind::Leaf(tabs);
        }
        self.relayout_node(root);
    }

    /// Remove `content` from every leaf except `keep`. Returns how many leaves were touched.
    pub(crate) fn remove_content_except(&mut self, content: ContentId, keep: PaneId) -> usize {
        let mut removed = 0;
        for id in self.leaves() {
            if id == keep {
                continue;
            }
            if let Some(pane) = self.get_mut(id)
                && pane.remove_figure(content)
            {
                removed += 1;
            }
        }
        removed
    }

    /// Swap the tab lists of two leaves. Returns `false` unless both are leaves.
    pub(crate) fn swap_leaf_contents(&mut self, a: PaneId, b: PaneId) -> bool {
        if a == b {
            return false;
        }
        let (Some(mut pane_a), Some(mut pane_b)) = (self.nodes.remove(&a), self.nodes.remove(&b))
        else {
            return false;
        };
        let swapped = pane_a.swap_contents(&mut pane_b);
        self.nodes.insert(a, pane_a);
        self.nodes.insert(b, pane_b);
        swapped
    }

    /// Unsplit the parent of every empty non-root leaf (keeping the sibling) until none remain.
    ///
    /// Returns the number of unsplits performed.
    pub fn collapse_empty_leaves(&mut self) -> usize {
        let mut collapsed = 0;
        loop {
            let empty = self.leaf_panes().find_map(|pane| {
                let parent = pane.parent?;
                (pane.figure_count() == 0).then_some((pane.id, parent))
            });
            let Some((leaf, parent)) = empty else {
                break;
            };
            let keep_first = self.get(parent).and_then(SplitPane::second) == Some(leaf);
            if !self.unsplit(parent, keep_first) {
                break;
            }
            collapsed += 1;
        }
        collapsed
    }
}

#[cfg(test)]
mod tests {
    use egui::{pos2, vec2};

    use super::*;

    fn canvas() -> Rect {
        Rect::from_min_size(pos2(0.0, 0.0), vec2(1000.0, 600.0))
    }

    fn c(n: u64) -> ContentId {
        ContentId(n)
    }

    #[test]
    fn new_tree_is_single_leaf() {
        let tree = PaneTree::new(c(0));
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.leaf_count(), 1);
        assert!(!tree.is_split());
        let root = tree.root_pane().unwrap();
        assert!(root.is_leaf());
        assert_eq!(root.parent(), None);
        assert_eq!(root.active_content(), Some(c(0)));
    }

    #[test]
    fn split_leaf_moves_tabs_to_first_child_and_keeps_root_id() {
        let mut tree = PaneTree::new(c(0));
        let root = tree.root();
        tree.get_mut(root).unwrap().add_figure(c(1));
        tree.get_mut(root).unwrap().set_active_local_index(0);

        let second = tree
            .split_leaf(root, SplitDirection::Horizontal, c(2), 0.3)
            .unwrap();

        assert_eq!(tree.root(), root);
        let root_pane = tree.get(root).unwrap();
        assert!(root_pane.is_split());
        assert_eq!(root_pane.ratio(), Some(0.3));
        assert_eq!(root_pane.second(), Some(second));

        let first = tree.get(root_pane.first().unwrap()).unwrap();
        assert_eq!(first.contents(), &[c(0), c(1)]);
        assert_eq!(first.active_content(), Some(c(0)));
        assert_eq!(first.parent(), Some(root));

        let second = tree.get(second).unwrap();
        assert_eq!(second.contents(), &[c(2)]);
        assert_eq!(tree.node_count(), 3);
    }

    #[test]
    fn split_of_split_is_rejected() {
        let mut tree = PaneTree::new(c(0));
        let root = tree.root();
        tree.split_leaf(root, SplitDirection::Horizontal, c(1), 0.5);
        assert_eq!(tree.split_leaf(root, SplitDirection::Vertical, c(2), 0.5), None);
    }

    #[test]
    fn split_ratio_is_clamped() {
        let mut tree = PaneTree::new(c(0));
        let root = tree.root();
        tree.split_leaf(root, SplitDirection::Horizontal, c(1), 0.0);
        assert_eq!(tree.get(root).unwrap().ratio(), Some(crate::MIN_RATIO));
    }

    #[test]
    fn ids_are_never_reused() {
        let mut tree = PaneTree::new(c(0));
        let root = tree.root();
        let a = tree.split_leaf(root, SplitDirection::Horizontal, c(1), 0.5).unwrap();
        assert!(tree.unsplit(root, true));
        let b = tree.split_leaf(root, SplitDirection::Horizontal, c(1), 0.5).unwrap();
        assert_ne!(a, b);
        assert!(tree.get(a).is_none());
    }

    #[test]
    fn unsplit_keep_first_and_second() {
        let mut tree = PaneTree::new(c(0));
        let root = tree.root();
        tree.split_leaf(root, SplitDirection::Horizontal, c(1), 0.5);
        assert!(tree.unsplit(root, true));
        assert_eq!(tree.get(root).unwrap().contents(), &[c(0)]);
        assert_eq!(tree.node_count(), 1);

        tree.split_leaf(root, SplitDirection::Horizontal, c(1), 0.5);
        assert!(tree.unsplit(root, false));
        assert_eq!(tree.get(root).unwrap().contents(), &[c(1)]);
        assert_eq!(tree.node_count(), 1);

        assert!(!tree.unsplit(root, true), "a leaf cannot be unsplit");
    }

    #[test]
    fn unsplit_adopts_nested_subtree() {
        let mut tree = PaneTree::new(c(0));
        let root = tree.root();
        let right = tree.split_leaf(root, SplitDirection::Horizontal, c(1), 0.5).unwrap();
        let bottom = tree.split_leaf(right, SplitDirection::Vertical, c(2), 0.7).unwrap();

        // Drop the left leaf; the right split takes over the root slot.
        assert!(tree.unsplit(root, false));
        let root_pane = tree.get(root).unwrap();
        assert_eq!(root_pane.direction(), Some(SplitDirection::Vertical));
        assert_eq!(root_pane.ratio(), Some(0.7));
        assert_eq!(root_pane.second(), Some(bottom));
        assert_eq!(tree.get(bottom).unwrap().parent(), Some(root));
        assert!(tree.get(right).is_none());
        assert_eq!(tree.leaf_count(), 2);
        assert_eq!(tree.all_contents(), vec![c(1), c(2)]);
    }

    #[test]
    fn layout_partitions_bounds() {
        let mut tree = PaneTree::new(c(0));
        let root = tree.root();
        let right = tree.split_leaf(root, SplitDirection::Horizontal, c(1), 0.5).unwrap();
        tree.compute_layout(canvas());

        let left = tree.get(tree.get(root).unwrap().first().unwrap()).unwrap();
        assert_eq!(left.bounds().width(), 497.0);
        let right = tree.get(right).unwrap();
        assert_eq!(right.bounds().min.x, 503.0);
        assert_eq!(right.bounds().width(), 497.0);
    }

    #[test]
    fn split_after_layout_lays_out_new_children() {
        let mut tree = PaneTree::new(c(0));
        tree.compute_layout(canvas());
        let root = tree.root();
        let second = tree.split_leaf(root, SplitDirection::Vertical, c(1), 0.5).unwrap();
        assert_eq!(tree.get(second).unwrap().bounds().min.y, 303.0);
    }

    #[test]
    fn find_at_point_descends_and_misses_gutter() {
        let mut tree = PaneTree::new(c(0));
        let root = tree.root();
        let right = tree.split_leaf(root, SplitDirection::Horizontal, c(1), 0.5).unwrap();
        tree.compute_layout(canvas());

        let left = tree.get(root).unwrap().first().unwrap();
        assert_eq!(tree.find_at_point(pos2(100.0, 100.0)), Some(left));
        assert_eq!(tree.find_at_point(pos2(900.0, 100.0)), Some(right));
        assert_eq!(tree.find_at_point(pos2(500.0, 100.0)), None);
        assert_eq!(tree.find_at_point(pos2(-1.0, 100.0)), None);
        assert_eq!(tree.find_at_point(pos2(100.0, 600.0)), None);
    }

    #[test]
    fn find_splitter_uses_tolerance() {
        let mut tree = PaneTree::new(c(0));
        let root = tree.root();
        tree.split_leaf(root, SplitDirection::Horizontal, c(1), 0.5);
        tree.compute_layout(canvas());

        assert_eq!(tree.find_splitter_at(pos2(500.0, 300.0), 4.0), Some(root));
        assert_eq!(tree.find_splitter_at(pos2(494.0, 300.0), 4.0), Some(root));
        assert_eq!(tree.find_splitter_at(pos2(494.0, 300.0), 0.0), None);
        assert_eq!(tree.find_splitter_at(pos2(300.0, 300.0), 4.0), None);
    }

    #[test]
    fn find_splitter_without_layout_hits_nothing() {
        let mut tree = PaneTree::new(c(0));
        let root = tree.root();
        tree.split_leaf(root, SplitDirection::Horizontal, c(1), 0.5);
        assert_eq!(tree.find_splitter_at(pos2(0.0, 0.0), 4.0), None);
    }

    #[test]
    fn collapse_empty_leaves_cascades() {
        let mut tree = PaneTree::new(c(0));
        let root = tree.root();
        let right = tree.split_leaf(root, SplitDirection::Horizontal, c(1), 0.5).unwrap();
        let bottom = tree.split_leaf(right, SplitDirection::Vertical, c(2), 0.5).unwrap();

        tree.get_mut(bottom).unwrap().remove_figure(c(2));
        let right_top = tree.get(right).unwrap().first().unwrap();
        tree.get_mut(right_top).unwrap().remove_figure(c(1));

        assert_eq!(tree.collapse_empty_leaves(), 2);
        assert_eq!(tree.leaf_count(), 1);
        assert_eq!(tree.all_contents(), vec![c(0)]);
    }

    #[test]
    fn leaves_are_depth_first() {
        let mut tree = PaneTree::new(c(0));
        let root = tree.root();
        let right = tree.split_leaf(root, SplitDirection::Horizontal, c(1), 0.5).unwrap();
        let left = tree.get(root).unwrap().first().unwrap();
        tree.split_leaf(left, SplitDirection::Vertical, c(2), 0.5);
        tree.split_leaf(right, SplitDirection::Vertical, c(3), 0.5);
        assert_eq!(tree.all_contents(), vec![c(0), c(2), c(1), c(3)]);
    }
}
