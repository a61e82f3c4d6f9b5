use std::collections::VecDeque;

use egui::{Pos2, Rect};

use crate::geometry;
use crate::integrity;
use crate::options::DockOptions;
use crate::pane::{ContentId, PaneId, SplitDirection, SplitPane, Tabs, clamp_ratio};
use crate::tree::PaneTree;

type PaneCallback = Box<dyn FnMut(PaneId)>;
type ContentCallback = Box<dyn FnMut(ContentId)>;

/// An in-progress splitter (ratio) drag.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct SplitterDrag {
    pub pane: PaneId,
    pub start_pos: f32,
    pub start_ratio: f32,
}

/// Owns the split tree and the manager-level active content.
///
/// Every operation on unknown ids is a no-op that reports failure through its return value.
pub struct SplitViewManager {
    pub options: DockOptions,

    tree: PaneTree,
    active: ContentId,
    canvas: Option<Rect>,
    splitter_drag: Option<SplitterDrag>,

    on_split: Option<PaneCallback>,
    on_unsplit: Option<PaneCallback>,
    on_active_changed: Option<ContentCallback>,

    pub(crate) debug_log: VecDeque<String>,
    pub(crate) debug_frame: u64,
    pub(crate) debug_last_integrity_hash: u64,
}

impl std::fmt::Debug for SplitViewManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SplitViewManager")
            .field("options", &self.options)
            .field("tree", &self.tree)
            .field("active", &self.active)
            .field("canvas", &self.canvas)
            .field("splitter_drag", &self.splitter_drag)
            .finish_non_exhaustive()
    }
}

impl Default for SplitViewManager {
    fn default() -> Self {
        Self::new(ContentId(0))
    }
}

impl SplitViewManager {
    /// A single pane showing `initial`.
    pub fn new(initial: ContentId) -> Self {
        Self::with_options(initial, DockOptions::default())
    }

    pub fn with_options(initial: ContentId, options: DockOptions) -> Self {
        Self {
            options,
            tree: PaneTree::new(initial),
            active: initial,
            canvas: None,
            splitter_drag: None,
            on_split: None,
            on_unsplit: None,
            on_active_changed: None,
            debug_log: VecDeque::new(),
            debug_frame: 0,
            debug_last_integrity_hash: 0,
        }
    }

    // ------------------------------------------------------------------------
    // Split operations

    /// Split the leaf holding `existing`, placing `new_content` in a new second child.
    ///
    /// Returns the new leaf, or `None` if `existing` is not in the tree, `new_content` already is,
    /// or the pane limit is reached.
    pub fn split_pane(
        &mut self,
        existing: ContentId,
        direction: SplitDirection,
        new_content: ContentId,
        ratio: f32,
    ) -> Option<PaneId> {
        if !self.options.allows_another_pane(self.tree.leaf_count()) {
            log::debug!(
                "split {existing} rejected: pane limit {:?} reached",
                self.options.max_panes
            );
            return None;
        }
        if self.tree.contains_content(new_content) {
            log::debug!("split {existing} rejected: {new_content} is already docked");
            return None;
        }
        let leaf = self.tree.find_by_content(existing)?;
        let new_pane = self.tree.split_leaf(leaf, direction, new_content, ratio)?;
        self.recompute_layout();

        log::debug!("split {leaf} {direction:?} ratio={} new={new_pane} ({new_content})", clamp_ratio(ratio));
        self.debug_log_event(format!("split {leaf} {direction:?} -> {new_pane} ({new_content})"));
        if let Some(cb) = &mut self.on_split {
            cb(new_pane);
        }
        self.after_mutation();
        Some(new_pane)
    }

    /// [`Self::split_pane`] on the active content.
    pub fn split_active(
        &mut self,
        direction: SplitDirection,
        new_content: ContentId,
        ratio: f32,
    ) -> Option<PaneId> {
        self.split_pane(self.active, direction, new_content, ratio)
    }

    /// Remove `content` from its leaf. A leaf left empty is closed: its parent is unsplit and the
    /// sibling takes the parent's place.
    ///
    /// Returns `false` if `content` is not in the tree, or is the only tab of the only pane.
    pub fn close_pane(&mut self, content: ContentId) -> bool {
        let Some(leaf) = self.tree.find_by_content(content) else {
            return false;
        };
        let Some(pane) = self.tree.get(leaf) else {
            return false;
        };
        let parent = pane.parent();
        if parent.is_none() && pane.figure_count() <= 1 {
            log::debug!("close {content} rejected: last pane");
            return false;
        }

        let mut next_active = None;
        if let Some(pane) = self.tree.get_mut(leaf) {
            pane.remove_figure(content);
            next_active = pane.active_content();
        }

        if next_active.is_none()
            && let Some(parent) = parent
        {
            let keep_first = self.tree.get(parent).and_then(SplitPane::second) == Some(leaf);
            if let Some(cb) = &mut self.on_unsplit {
                cb(leaf);
            }
            self.tree.unsplit(parent, keep_first);
            // `parent` now holds the survivor's split, so a drag on it would resize the wrong one.
            self.splitter_drag = None;
            next_active = self
                .tree
                .first_leaf(parent)
                .and_then(|id| self.tree.get(id))
                .and_then(SplitPane::active_content);
            log::debug!("close {content}: collapsed {leaf} into {parent}");
            self.debug_log_event(format!("close {content} collapsed {leaf} into {parent}"));
        } else {
            log::debug!("close {content}: removed tab from {leaf}");
            self.debug_log_event(format!("close {content} tab of {leaf}"));
        }
        self.recompute_layout();

        if self.active == content
            && let Some(next) = next_active
        {
            self.set_active_inner(next);
        }
        self.after_mutation();
        true
    }

    /// Collapse the whole tree into a single pane.
    ///
    /// All tabs are kept, concatenated in depth-first leaf order; the active content stays active.
    pub fn unsplit_all(&mut self) {
        let contents = self.tree.all_contents();
        let active_index = contents
            .iter()
            .position(|&c| c == self.active)
            .unwrap_or(0);
        let count = contents.len();
        self.splitter_drag = None;
        self.tree.reset_to_leaf(Tabs::new(contents, active_index));
        self.recompute_layout();
        log::debug!("unsplit all: {count} tabs in one pane");
        self.debug_log_event(format!("unsplit all ({count} tabs)"));
        self.after_mutation();
    }

    // ------------------------------------------------------------------------
    // Active content

    pub fn active_content(&self) -> ContentId {
        self.active
    }

    /// Make `content` the active content and select its tab.
    ///
    /// Returns `false` (and changes nothing) if `content` is not in the tree.
    pub fn set_active_content(&mut self, content: ContentId) -> bool {
        if !self.tree.contains_content(content) {
            return false;
        }
        self.set_active_inner(content);
        true
    }

    fn set_active_inner(&mut self, content: ContentId) {
        if let Some(leaf) = self.tree.find_by_content(content)
            && let Some(pane) = self.tree.get_mut(leaf)
            && let Some(index) = pane.contents().iter().position(|&c| c == content)
        {
            pane.set_active_local_index(index);
        }
        if content != self.active {
            self.active = content;
            if let Some(cb) = &mut self.on_active_changed {
                cb(content);
            }
        }
    }

    /// Select tab `local_index` of leaf `pane` and make its content the active content.
    pub fn activate_local_tab(&mut self, pane: PaneId, local_index: usize) -> bool {
        let Some(node) = self.tree.get_mut(pane) else {
            return false;
        };
        if !node.set_active_local_index(local_index) {
            return false;
        }
        let Some(content) = node.active_content() else {
            return false;
        };
        self.set_active_inner(content);
        true
    }

    /// Append `content` as a new (selected) tab of leaf `pane`.
    ///
    /// Returns `false` if `pane` is not a leaf or `content` is already docked somewhere.
    pub fn add_tab(&mut self, pane: PaneId, content: ContentId) -> bool {
        if self.tree.contains_content(content) {
            return false;
        }
        let Some(node) = self.tree.get_mut(pane) else {
            return false;
        };
        if !node.add_figure(content) {
            return false;
        }
        log::debug!("add tab {content} to {pane}");
        self.debug_log_event(format!("add tab {content} to {pane}"));
        self.after_mutation();
        true
    }

    /// The leaf holding the active content.
    pub fn active_pane(&self) -> Option<&SplitPane> {
        self.pane_for_content(self.active)
            .and_then(|id| self.tree.get(id))
    }

    // ------------------------------------------------------------------------
    // Layout

    /// Lay the tree out inside `canvas`. Also advances the debug frame counter.
    pub fn update_layout(&mut self, canvas: Rect) {
        self.debug_frame = self.debug_frame.wrapping_add(1);
        self.canvas = Some(canvas);
        self.tree.compute_layout(canvas);
    }

    /// The rect passed to the last [`Self::update_layout`].
    pub fn canvas_bounds(&self) -> Option<Rect> {
        self.canvas
    }

    fn recompute_layout(&mut self) {
        if let Some(canvas) = self.canvas
            && geometry::has_area(canvas)
        {
            self.tree.compute_layout(canvas);
        }
    }

    // ------------------------------------------------------------------------
    // Queries

    pub fn tree(&self) -> &PaneTree {
        &self.tree
    }

    pub fn root_id(&self) -> PaneId {
        self.tree.root()
    }

    pub fn is_split(&self) -> bool {
        self.tree.is_split()
    }

    /// Number of leaves.
    pub fn pane_count(&self) -> usize {
        self.tree.leaf_count()
    }

    /// Leaves in depth-first order.
    pub fn all_panes(&self) -> Vec<&SplitPane> {
        self.tree.leaf_panes().collect()
    }

    pub fn pane(&self, id: PaneId) -> Option<&SplitPane> {
        self.tree.get(id)
    }

    pub fn pane_at_point(&self, pos: Pos2) -> Option<PaneId> {
        self.tree.find_at_point(pos)
    }

    pub fn pane_for_content(&self, content: ContentId) -> Option<PaneId> {
        self.tree.find_by_content(content)
    }

    /// Whether `content` is the selected tab of some leaf (and therefore on screen).
    pub fn is_content_visible(&self, content: ContentId) -> bool {
        self.pane_for_content(content)
            .and_then(|id| self.tree.get(id))
            .is_some_and(|pane| pane.active_content() == Some(content))
    }

    /// Structural problems of the current layout; empty when healthy.
    pub fn integrity_issues(&self) -> Vec<String> {
        integrity::layout_integrity_issues(&self.tree, self.active)
    }

    // ------------------------------------------------------------------------
    // Splitter interaction

    /// The split whose gutter is under `pos`.
    pub fn splitter_at_point(&self, pos: Pos2) -> Option<PaneId> {
        self.tree
            .find_splitter_at(pos, self.options.splitter_hit_tolerance)
    }

    /// Start dragging the gutter of split `pane`, with the pointer at `axis_pos` along its axis.
    pub fn begin_splitter_drag(&mut self, pane: PaneId, axis_pos: f32) -> bool {
        if self.splitter_drag.is_some() {
            return false;
        }
        let Some(start_ratio) = self.tree.get(pane).and_then(SplitPane::ratio) else {
            return false;
        };
        self.splitter_drag = Some(SplitterDrag {
            pane,
            start_pos: axis_pos,
            start_ratio,
        });
        self.debug_log_event(format!("splitter drag START {pane} ratio={start_ratio}"));
        true
    }

    /// Move the dragged gutter to `axis_pos`: the ratio becomes the pointer's clamped fraction of
    /// the split's extent.
    pub fn update_splitter_drag(&mut self, axis_pos: f32) -> bool {
        let Some(drag) = self.splitter_drag else {
            return false;
        };
        let Some(node) = self.tree.get_mut(drag.pane) else {
            self.splitter_drag = None;
            return false;
        };
        let Some(direction) = node.direction() else {
            self.splitter_drag = None;
            return false;
        };
        let (origin, extent) = geometry::axis_span(node.bounds(), direction);
        if extent < 1.0 {
            return false;
        }
        node.set_ratio((axis_pos - origin) / extent);
        log::trace!(
            "splitter {} ratio={:?} moved={}",
            drag.pane,
            node.ratio(),
            axis_pos - drag.start_pos
        );
        self.recompute_layout();
        true
    }

    /// Finish the splitter drag, keeping the current ratio.
    pub fn end_splitter_drag(&mut self) -> bool {
        let Some(drag) = self.splitter_drag.take() else {
            return false;
        };
        let ratio = self.tree.get(drag.pane).and_then(SplitPane::ratio);
        log::debug!("splitter {} drag end ratio={ratio:?}", drag.pane);
        self.debug_log_event(format!("splitter drag END {} ratio={ratio:?}", drag.pane));
        self.after_mutation();
        true
    }

    /// Abort the splitter drag and restore the ratio it started with.
    pub fn cancel_splitter_drag(&mut self) -> bool {
        let Some(drag) = self.splitter_drag.take() else {
            return false;
        };
        if let Some(node) = self.tree.get_mut(drag.pane) {
            node.set_ratio(drag.start_ratio);
        }
        self.recompute_layout();
        self.debug_log_event(format!("splitter drag CANCEL {}", drag.pane));
        true
    }

    pub fn is_dragging_splitter(&self) -> bool {
        self.splitter_drag.is_some()
    }

    /// The split being resized, if any.
    pub fn dragging_splitter(&self) -> Option<PaneId> {
        self.splitter_drag.map(|drag| drag.pane)
    }

    // ------------------------------------------------------------------------
    // Callbacks

    /// Called with the new leaf after every successful split.
    pub fn set_on_split(&mut self, cb: impl FnMut(PaneId) + 'static) {
        self.on_split = Some(Box::new(cb));
    }

    /// Called with the closing leaf just before its parent is unsplit.
    pub fn set_on_unsplit(&mut self, cb: impl FnMut(PaneId) + 'static) {
        self.on_unsplit = Some(Box::new(cb));
    }

    /// Called whenever the active content changes.
    pub fn set_on_active_changed(&mut self, cb: impl FnMut(ContentId) + 'static) {
        self.on_active_changed = Some(Box::new(cb));
    }

    // ------------------------------------------------------------------------
    // Crate-internal commit points

    /// Tree id counter, so scratch trees built elsewhere never reuse ids.
    pub(crate) fn next_pane_id(&self) -> u64 {
        self.tree.next_id()
    }

    /// Replace the live tree with `tree` (already validated) and activate `active`.
    ///
    /// Ends any splitter drag, since its node may be gone.
    pub(crate) fn commit_tree(&mut self, tree: PaneTree, active: ContentId) {
        self.tree = tree;
        self.splitter_drag = None;
        self.recompute_layout();
        if self.tree.contains_content(active) {
            self.set_active_inner(active);
        } else if let Some(fallback) = self
            .tree
            .first_leaf(self.tree.root())
            .and_then(|id| self.tree.get(id))
            .and_then(SplitPane::active_content)
        {
            self.set_active_inner(fallback);
        }
        self.after_mutation();
    }

    fn after_mutation(&mut self) {
        if self.options.debug_integrity {
            self.debug_check_integrity();
        }
    }
}

#[cfg(test)]
#[path = "split_view_tests.rs"]
mod split_view_tests;
