//! Drag-to-dock orchestration on top of [`SplitViewManager`].

mod drop_apply;
mod drop_target;
mod session;


use egui::{Pos2, Rect};

use crate::geometry;
use crate::options::DockOptions;
use crate::pane::{ContentId, PaneId, SplitDirection, SplitPane};
use crate::persistence::{LayoutPersistenceError, LayoutSnapshot};
use crate::split_view::SplitViewManager;

use drop_apply::{DropRules, apply_drop};
use session::DragSession;

pub use drop_target::{DropTarget, DropZone};

/// What the host needs to draw one leaf.
#[derive(Clone, Debug, PartialEq)]
pub struct PaneInfo {
    pub pane_id: PaneId,
    /// The leaf's selected tab.
    pub content_id: ContentId,
    /// Where to draw `content_id`: the leaf bounds minus its tab strip.
    pub bounds: Rect,
    pub tab_strip: Rect,
    pub tabs: Vec<ContentId>,
    pub active_tab: usize,
    /// Whether this leaf holds the manager's active content.
    pub is_active: bool,
}

/// Per-frame docking front end: static splits, splitter resizing and drag-to-dock.
///
/// Call [`Self::update_layout`] once per frame before any query or hit test.
pub struct DockSystem {
    split_view: SplitViewManager,
    drag: DragSession,
    on_layout_changed: Option<Box<dyn FnMut()>>,
}

impl std::fmt::Debug for DockSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DockSystem")
            .field("split_view", &self.split_view)
            .field("drag", &self.drag)
            .finish_non_exhaustive()
    }
}

impl Default for DockSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl From<SplitViewManager> for DockSystem {
    fn from(split_view: SplitViewManager) -> Self {
        Self {
            split_view,
            drag: DragSession::Idle,
            on_layout_changed: None,
        }
    }
}

impl DockSystem {
    /// A single pane showing `ContentId(0)`.
    pub fn new() -> Self {
        Self::from(SplitViewManager::default())
    }

    pub fn with_options(initial: ContentId, options: DockOptions) -> Self {
        Self::from(SplitViewManager::with_options(initial, options))
    }

    pub fn split_view(&self) -> &SplitViewManager {
        &self.split_view
    }

    /// Direct access to the manager. Changes made through it do not fire `on_layout_changed`.
    pub fn split_view_mut(&mut self) -> &mut SplitViewManager {
        &mut self.split_view
    }

    pub fn options(&self) -> &DockOptions {
        &self.split_view.options
    }

    pub fn options_mut(&mut self) -> &mut DockOptions {
        &mut self.split_view.options
    }

    /// Called after every change to the layout's shape or ratios.
    pub fn set_on_layout_changed(&mut self, cb: impl FnMut() + 'static) {
        self.on_layout_changed = Some(Box::new(cb));
    }

    fn layout_changed(&mut self) {
        if let Some(cb) = &mut self.on_layout_changed {
            cb();
        }
    }

    fn notify_if(&mut self, changed: bool) -> bool {
        if changed {
            self.layout_changed();
        }
        changed
    }

    // ------------------------------------------------------------------------
    // Static splits

    /// Split the active pane, putting `new_content` on the right.
    pub fn split_right(&mut self, new_content: ContentId, ratio: f32) -> Option<PaneId> {
        let result = self
            .split_view
            .split_active(SplitDirection::Horizontal, new_content, ratio);
        self.notify_if(result.is_some());
        result
    }

    /// Split the active pane, putting `new_content` below.
    pub fn split_down(&mut self, new_content: ContentId, ratio: f32) -> Option<PaneId> {
        let result = self
            .split_view
            .split_active(SplitDirection::Vertical, new_content, ratio);
        self.notify_if(result.is_some());
        result
    }

    pub fn split_figure_right(
        &mut self,
        content: ContentId,
        new_content: ContentId,
        ratio: f32,
    ) -> Option<PaneId> {
        let result =
            self.split_view
                .split_pane(content, SplitDirection::Horizontal, new_content, ratio);
        self.notify_if(result.is_some());
        result
    }

    pub fn split_figure_down(
        &mut self,
        content: ContentId,
        new_content: ContentId,
        ratio: f32,
    ) -> Option<PaneId> {
        let result =
            self.split_view
                .split_pane(content, SplitDirection::Vertical, new_content, ratio);
        self.notify_if(result.is_some());
        result
    }

    /// Close `content`'s tab, collapsing its pane if that was the last tab.
    pub fn close_split(&mut self, content: ContentId) -> bool {
        let closed = self.split_view.close_pane(content);
        self.notify_if(closed)
    }

    /// Back to a single pane holding every tab.
    pub fn reset_splits(&mut self) {
        self.split_view.unsplit_all();
        self.layout_changed();
    }

    // ------------------------------------------------------------------------
    // Drag-to-dock

    /// Start dragging `content` with the pointer at `pos`.
    ///
    /// Fails if `content` is not docked, or a drag (of either kind) is already running.
    pub fn begin_drag(&mut self, content: ContentId, pos: Pos2) -> bool {
        if self.split_view.is_dragging_splitter() {
            return false;
        }
        let Some(source_pane) = self.split_view.pane_for_content(content) else {
            return false;
        };
        let Some(msg) = self.drag.begin(content, source_pane, pos) else {
            return false;
        };
        log::debug!("{msg}");
        self.split_view.debug_log_event(msg);
        true
    }

    /// Track the pointer; returns (and remembers) the drop target under it.
    pub fn update_drag(&mut self, pos: Pos2) -> DropTarget {
        if !self.drag.is_active() {
            return DropTarget::NONE;
        }
        let target = self.compute_drop_target(pos);
        if let Some(drag) = self.drag.active_mut() {
            if drag.last_target != target {
                log::trace!(
                    "drag {} over {:?} zone={:?}",
                    drag.content,
                    target.pane,
                    target.zone
                );
            }
            drag.pointer = pos;
            drag.last_target = target;
        }
        target
    }

    /// Drop at `pos`. Returns `true` if the layout changed.
    ///
    /// The drag ends either way.
    pub fn end_drag(&mut self, pos: Pos2) -> bool {
        let Some(drag) = self.drag.finish() else {
            return false;
        };
        let target = self.compute_drop_target(pos);
        let Some(pane) = target.pane else {
            self.split_view
                .debug_log_event(format!("drop {} IGNORED no target", drag.content));
            return false;
        };

        let rules = DropRules::for_drag(&self.split_view.options);
        match apply_drop(self.split_view.tree(), drag.content, pane, target.zone, rules) {
            Ok(applied) => {
                log::debug!(
                    "drop {} from {} onto {pane} zone={:?} -> {}",
                    drag.content,
                    drag.source_pane,
                    target.zone,
                    applied.destination
                );
                self.split_view.debug_log_event(format!(
                    "drop {} onto {pane} zone={:?} -> {}",
                    drag.content, target.zone, applied.destination
                ));
                self.split_view.commit_tree(applied.tree, drag.content);
                self.layout_changed();
                true
            }
            Err(reason) => {
                log::debug!("drop {} onto {pane} rejected: {reason}", drag.content);
                self.split_view.debug_log_event(format!(
                    "drop {} onto {pane} zone={:?} REJECTED {reason}",
                    drag.content, target.zone
                ));
                false
            }
        }
    }

    /// Abandon the drag without touching the layout.
    pub fn cancel_drag(&mut self) -> bool {
        let Some(drag) = self.drag.finish() else {
            return false;
        };
        self.split_view
            .debug_log_event(format!("drag CANCEL {}", drag.content));
        true
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_active()
    }

    pub fn dragging_content(&self) -> Option<ContentId> {
        self.drag.active().map(|drag| drag.content)
    }

    /// Last pointer position seen by the drag, for drawing a drag preview.
    pub fn drag_pointer(&self) -> Option<Pos2> {
        self.drag.active().map(|drag| drag.pointer)
    }

    /// The target computed by the last [`Self::update_drag`].
    pub fn current_drop_target(&self) -> DropTarget {
        self.drag
            .active()
            .map_or(DropTarget::NONE, |drag| drag.last_target)
    }

    /// Hit-test `pos` for a drop: the leaf under it and the zone within that leaf.
    pub fn compute_drop_target(&self, pos: Pos2) -> DropTarget {
        let Some(pane) = self
            .split_view
            .pane_at_point(pos)
            .and_then(|id| self.split_view.pane(id))
        else {
            return DropTarget::NONE;
        };
        let bounds = pane.bounds();
        let zone = drop_target::classify_zone(bounds, pos, &self.split_view.options);
        if zone == DropZone::None {
            return DropTarget::NONE;
        }
        DropTarget {
            zone,
            pane: Some(pane.id()),
            highlight: drop_target::highlight_rect(bounds, zone),
        }
    }

    // ------------------------------------------------------------------------
    // Layout and queries

    pub fn update_layout(&mut self, canvas: Rect) {
        self.split_view.update_layout(canvas);
    }

    /// One entry per leaf, in depth-first order.
    pub fn get_pane_infos(&self) -> Vec<PaneInfo> {
        let active = self.split_view.active_content();
        self.split_view
            .all_panes()
            .into_iter()
            .filter_map(|pane| {
                Some(PaneInfo {
                    pane_id: pane.id(),
                    content_id: pane.active_content()?,
                    bounds: pane.content_bounds(),
                    tab_strip: pane.tab_strip_bounds(),
                    tabs: pane.contents().to_vec(),
                    active_tab: pane.active_local_index(),
                    is_active: pane.has_figure(active),
                })
            })
            .collect()
    }

    pub fn is_split(&self) -> bool {
        self.split_view.is_split()
    }

    pub fn pane_count(&self) -> usize {
        self.split_view.pane_count()
    }

    pub fn active_figure_index(&self) -> ContentId {
        self.split_view.active_content()
    }

    pub fn set_active_figure_index(&mut self, content: ContentId) -> bool {
        self.split_view.set_active_content(content)
    }

    /// Make the leaf under `pos` active (its selected tab becomes the active content).
    pub fn activate_pane_at(&mut self, pos: Pos2) -> bool {
        let Some(content) = self
            .split_view
            .pane_at_point(pos)
            .and_then(|id| self.split_view.pane(id))
            .and_then(SplitPane::active_content)
        else {
            return false;
        };
        self.split_view.set_active_content(content)
    }

    pub fn activate_local_tab(&mut self, pane: PaneId, local_index: usize) -> bool {
        self.split_view.activate_local_tab(pane, local_index)
    }

    /// Move `content` into leaf `target` as its selected tab, collapsing the source pane if it
    /// empties. `content` becomes the active content.
    pub fn move_figure_to_pane(&mut self, content: ContentId, target: PaneId) -> bool {
        let rules = DropRules::for_move(&self.split_view.options);
        match apply_drop(self.split_view.tree(), content, target, DropZone::Center, rules) {
            Ok(applied) => {
                log::debug!("move {content} -> {}", applied.destination);
                self.split_view
                    .debug_log_event(format!("move {content} -> {}", applied.destination));
                self.split_view.commit_tree(applied.tree, content);
                self.layout_changed();
                true
            }
            Err(reason) => {
                log::debug!("move {content} -> {target} rejected: {reason}");
                false
            }
        }
    }

    // ------------------------------------------------------------------------
    // Splitter interaction

    pub fn is_over_splitter(&self, pos: Pos2) -> bool {
        self.split_view.splitter_at_point(pos).is_some()
    }

    /// Direction of the split whose gutter is under `pos`.
    pub fn splitter_direction_at(&self, pos: Pos2) -> Option<SplitDirection> {
        self.split_view
            .splitter_at_point(pos)
            .and_then(|id| self.split_view.pane(id))
            .and_then(SplitPane::direction)
    }

    /// Start resizing the split whose gutter is under `pos`.
    pub fn begin_splitter_drag(&mut self, pos: Pos2) -> bool {
        if self.drag.is_active() {
            return false;
        }
        let Some((pane, direction)) = self.split_view.splitter_at_point(pos).and_then(|id| {
            let direction = self.split_view.pane(id)?.direction()?;
            Some((id, direction))
        }) else {
            return false;
        };
        self.split_view
            .begin_splitter_drag(pane, geometry::axis_coord(pos, direction))
    }

    /// `axis_pos` is the pointer coordinate along the dragged split's axis.
    pub fn update_splitter_drag(&mut self, axis_pos: f32) -> bool {
        self.split_view.update_splitter_drag(axis_pos)
    }

    pub fn end_splitter_drag(&mut self) -> bool {
        let ended = self.split_view.end_splitter_drag();
        self.notify_if(ended)
    }

    pub fn cancel_splitter_drag(&mut self) -> bool {
        self.split_view.cancel_splitter_drag()
    }

    pub fn is_dragging_splitter(&self) -> bool {
        self.split_view.is_dragging_splitter()
    }

    // ------------------------------------------------------------------------
    // Persistence

    pub fn serialize(&self) -> String {
        self.split_view.serialize()
    }

    /// Restore a layout from [`Self::serialize`]. Malformed input changes nothing.
    /// Ends any drag-to-dock session on success.
    pub fn deserialize(&mut self, data: &str) -> bool {
        let restored = self.split_view.deserialize(data);
        if restored {
            self.drag = DragSession::Idle;
        }
        self.notify_if(restored)
    }

    pub fn snapshot(&self) -> LayoutSnapshot {
        self.split_view.snapshot()
    }

    pub fn restore(&mut self, snapshot: &LayoutSnapshot) -> Result<(), LayoutPersistenceError> {
        self.split_view.restore(snapshot)?;
        self.drag = DragSession::Idle;
        self.layout_changed();
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Debug

    pub fn debug_log_text(&self) -> String {
        self.split_view.debug_log_text()
    }

    pub fn debug_log_clear(&mut self) {
        self.split_view.debug_log_clear();
    }
}
