use egui::Rect;
use serde::{Deserialize, Serialize};

use crate::geometry;

/// Height reserved at the top of every leaf for its own tab strip.
pub const PANE_TAB_HEIGHT: f32 = 26.0;

/// Width of the gutter between the two children of a split.
pub const SPLITTER_WIDTH: f32 = 6.0;

/// Lowest ratio a split can hold.
pub const MIN_RATIO: f32 = 0.05;

/// Highest ratio a split can hold.
pub const MAX_RATIO: f32 = 0.95;

/// Clamp a requested split ratio into `[MIN_RATIO, MAX_RATIO]`.
///
/// Non-finite input falls back to an even split.
pub fn clamp_ratio(ratio: f32) -> f32 {
    if ratio.is_finite() {
        ratio.clamp(MIN_RATIO, MAX_RATIO)
    } else {
        0.5
    }
}

/// Stable handle of a node in the split tree.
///
/// Handles are allocated from a monotonically increasing counter and never reused. An unsplit
/// node keeps its id while its kind changes to the surviving child's, and the child's id stops
/// resolving.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PaneId(u64);

impl PaneId {
    pub(crate) const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw numeric value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for PaneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Opaque handle of a content item (e.g. a figure) owned by the host's registry.
///
/// The layout engine never inspects content; it only arranges these ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(pub u64);

impl std::fmt::Display for ContentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Axis along which a split divides its bounds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SplitDirection {
    /// Left | Right (vertical divider).
    #[default]
    Horizontal,
    /// Top / Bottom (horizontal divider).
    Vertical,
}

impl SplitDirection {
    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::Horizontal)
    }

    pub fn perpendicular(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }
}

/// Ordered tab list of a leaf plus its locally active tab.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tabs {
    contents: Vec<ContentId>,
    active: usize,
}

impl Tabs {
    pub(crate) fn single(content: ContentId) -> Self {
        Self {
            contents: vec![content],
            active: 0,
        }
    }

    /// `active` is clamped into range.
    pub(crate) fn new(contents: Vec<ContentId>, active: usize) -> Self {
        let active = active.min(contents.len().saturating_sub(1));
        Self { contents, active }
    }

    pub fn contents(&self) -> &[ContentId] {
        &self.contents
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active(&self) -> Option<ContentId> {
        self.contents.get(self.active).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }
}

/// Payload of a split node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Split {
    pub direction: SplitDirection,
    pub ratio: f32,
    pub first: PaneId,
    pub second: PaneId,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PaneKind {
    Leaf(Tabs),
    Split(Split),
}

/// A node of the split tree: either a leaf holding tabs, or a split owning two children.
///
/// Nodes live in a [`crate::PaneTree`] arena; `parent` and the split's children are handles into
/// that arena, never references.
#[derive(Clone, Debug)]
pub struct SplitPane {
    pub(crate) id: PaneId,
    pub(crate) parent: Option<PaneId>,
    pub(crate) kind: PaneKind,
    pub(crate) bounds: Rect,
}

impl SplitPane {
    pub(crate) fn leaf(id: PaneId, parent: Option<PaneId>, tabs: Tabs) -> Self {
        Self {
            id,
            parent,
            kind: PaneKind::Leaf(tabs),
            bounds: Rect::ZERO,
        }
    }

    pub fn id(&self) -> PaneId {
        self.id
    }

    pub fn parent(&self) -> Option<PaneId> {
        self.parent
    }

    pub fn kind(&self) -> &PaneKind {
        &self.kind
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, PaneKind::Leaf(_))
    }

    pub fn is_split(&self) -> bool {
        matches!(self.kind, PaneKind::Split(_))
    }

    /// Bounds assigned by the last layout pass.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Bounds available to the pane's content: the leaf bounds minus its tab strip.
    pub fn content_bounds(&self) -> Rect {
        if self.is_leaf() {
            geometry::below_tab_strip(self.bounds, PANE_TAB_HEIGHT)
        } else {
            self.bounds
        }
    }

    /// The strip reserved at the top of a leaf for its tab headers.
    pub fn tab_strip_bounds(&self) -> Rect {
        if self.is_leaf() {
            geometry::tab_strip(self.bounds, PANE_TAB_HEIGHT)
        } else {
            Rect::NOTHING
        }
    }

    /// The gutter between the two children, or [`Rect::ZERO`] for a leaf.
    pub fn splitter_rect(&self) -> Rect {
        match &self.kind {
            PaneKind::Split(split) => {
                geometry::splitter_rect(self.bounds, split.direction, split.ratio, SPLITTER_WIDTH)
            }
            PaneKind::Leaf(_) => Rect::ZERO,
        }
    }

    // ------------------------------------------------------------------------
    // Split accessors

    pub fn split(&self) -> Option<&Split> {
        match &self.kind {
            PaneKind::Split(split) => Some(split),
            PaneKind::Leaf(_) => None,
        }
    }

    pub fn direction(&self) -> Option<SplitDirection> {
        self.split().map(|s| s.direction)
    }

    pub fn ratio(&self) -> Option<f32> {
        self.split().map(|s| s.ratio)
    }

    pub fn first(&self) -> Option<PaneId> {
        self.split().map(|s| s.first)
    }

    pub fn second(&self) -> Option<PaneId> {
        self.split().map(|s| s.second)
    }

    /// Returns `false` for a leaf. The ratio is clamped.
    pub fn set_ratio(&mut self, ratio: f32) -> bool {
        match &mut self.kind {
            PaneKind::Split(split) => {
                split.ratio = clamp_ratio(ratio);
                true
            }
            PaneKind::Leaf(_) => false,
        }
    }

    // ------------------------------------------------------------------------
    // Leaf (tab) accessors

    pub fn tabs(&self) -> Option<&Tabs> {
        match &self.kind {
            PaneKind::Leaf(tabs) => Some(tabs),
            PaneKind::Split(_) => None,
        }
    }

    fn tabs_mut(&mut self) -> Option<&mut Tabs> {
        match &mut self.kind {
            PaneKind::Leaf(tabs) => Some(tabs),
            PaneKind::Split(_) => None,
        }
    }

    /// Tab order of a leaf; empty for a split.
    pub fn contents(&self) -> &[ContentId] {
        self.tabs().map(Tabs::contents).unwrap_or_default()
    }

    pub fn active_local_index(&self) -> usize {
        self.tabs().map_or(0, Tabs::active_index)
    }

    /// The content shown by this leaf.
    pub fn active_content(&self) -> Option<ContentId> {
        self.tabs().and_then(Tabs::active)
    }

    /// Out-of-range indices are ignored.
    pub fn set_active_local_index(&mut self, local_index: usize) -> bool {
        match self.tabs_mut() {
            Some(tabs) if local_index < tabs.contents.len() => {
                tabs.active = local_index;
                true
            }
            _ => false,
        }
    }

    /// Append `content` as a new tab and activate it.
    ///
    /// No-op (returning `false`) on a split or if the tab already exists.
    pub fn add_figure(&mut self, content: ContentId) -> bool {
        let Some(tabs) = self.tabs_mut() else {
            return false;
        };
        if tabs.contents.contains(&content) {
            return false;
        }
        tabs.contents.push(content);
        tabs.active = tabs.contents.len() - 1;
        true
    }

    /// Remove a tab, keeping the active tab stable where possible.
    pub fn remove_figure(&mut self, content: ContentId) -> bool {
        let Some(tabs) = self.tabs_mut() else {
            return false;
        };
        let Some(removed) = tabs.contents.iter().position(|&c| c == content) else {
            return false;
        };
        tabs.contents.remove(removed);
        if tabs.contents.is_empty() {
            tabs.active = 0;
        } else if tabs.active >= tabs.contents.len() {
            tabs.active = tabs.contents.len() - 1;
        } else if tabs.active > removed {
            tabs.active -= 1;
        }
        true
    }

    pub fn has_figure(&self, content: ContentId) -> bool {
        self.contents().contains(&content)
    }

    pub fn figure_count(&self) -> usize {
        self.contents().len()
    }

    /// Swap whole tab lists (including the active index) between two leaves.
    pub fn swap_contents(&mut self, other: &mut Self) -> bool {
        match (self.tabs_mut(), other.tabs_mut()) {
            (Some(a), Some(b)) => {
                std::mem::swap(a, b);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn take_tabs(&mut self) -> Tabs {
        self.tabs_mut().map(std::mem::take).unwrap_or_default()
    }
}
