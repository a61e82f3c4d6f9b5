//! Split-pane docking layouts for egui hosts.
//!
//! A [`SplitViewManager`] owns a binary tree of [`SplitPane`]s: splits divide their bounds
//! between two children, leaves hold one or more tabs of host content. [`DockSystem`] sits on
//! top of it and adds splitter resizing, drag-to-dock and change notification. Layouts can be
//! scripted with [`DockBuilder`] and saved as RON through [`LayoutSnapshot`].
//!
//! The crate does no drawing: the host lays the tree out once per frame with
//! [`DockSystem::update_layout`], then renders each [`PaneInfo`].

#![forbid(unsafe_code)]

mod debug;
mod geometry;
mod integrity;

pub mod dock;
pub mod dock_builder;
pub mod options;
pub mod pane;
pub mod persistence;
pub mod split_view;
pub mod tree;

pub use dock::{DockSystem, DropTarget, DropZone, PaneInfo};
pub use dock_builder::{BuilderSplit, DockBuildError, DockBuilder, DockNodeId};
pub use options::{
    DEFAULT_MAX_PANES, DROP_ZONE_FRACTION, DROP_ZONE_MAX_FRACTION, DROP_ZONE_MIN_SIZE, DockOptions,
    SPLITTER_HIT_TOLERANCE,
};
pub use pane::{
    ContentId, MAX_RATIO, MIN_RATIO, PANE_TAB_HEIGHT, PaneId, PaneKind, SPLITTER_WIDTH, Split,
    SplitDirection, SplitPane, Tabs, clamp_ratio,
};
pub use persistence::{
    LAYOUT_SNAPSHOT_VERSION, LayoutPersistenceError, LayoutSnapshot, MAX_SNAPSHOT_DEPTH,
    NodeSnapshot,
};
pub use split_view::SplitViewManager;
pub use tree::PaneTree;
