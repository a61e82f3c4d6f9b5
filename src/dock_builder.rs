use std::collections::BTreeMap;

use ahash::{HashSet, HashSetExt as _};

use crate::options::DockOptions;
use crate::pane::{ContentId, SplitDirection, clamp_ratio};
use crate::persistence::{LAYOUT_SNAPSHOT_VERSION, LayoutPersistenceError, LayoutSnapshot, NodeSnapshot};
use crate::split_view::SplitViewManager;

/// Where [`DockBuilder::split_node`] puts the *side* node relative to the *main* node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuilderSplit {
    Left,
    Right,
    Up,
    Down,
}

impl BuilderSplit {
    fn direction(self) -> SplitDirection {
        match self {
            Self::Left | Self::Right => SplitDirection::Horizontal,
            Self::Up | Self::Down => SplitDirection::Vertical,
        }
    }

    fn side_first(self) -> bool {
        matches!(self, Self::Left | Self::Up)
    }
}

/// A logical node id used by [`DockBuilder`]. Unrelated to [`crate::PaneId`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DockNodeId(u64);

impl std::fmt::Display for DockNodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "N{}", self.0)
    }
}

#[derive(Debug)]
pub enum DockBuildError {
    /// `finish` was called before any `add_node`.
    NoNodes,
    UnknownNode(DockNodeId),
    /// Content can only be docked into a node that has not been split.
    NotALeaf(DockNodeId),
    DuplicateContent(ContentId),
    EmptyLeaf(DockNodeId),
    /// A node was created but is not reachable from the first node.
    DetachedNode(DockNodeId),
    Layout(LayoutPersistenceError),
}

impl std::fmt::Display for DockBuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoNodes => write!(f, "dock builder has no nodes"),
            Self::UnknownNode(node) => write!(f, "node {node} does not exist"),
            Self::NotALeaf(node) => write!(f, "node {node} is split and cannot hold content"),
            Self::DuplicateContent(content) => write!(f, "content {content} is docked twice"),
            Self::EmptyLeaf(node) => write!(f, "leaf node {node} has no content"),
            Self::DetachedNode(node) => write!(f, "node {node} is not part of the layout"),
            Self::Layout(err) => write!(f, "built layout rejected: {err}"),
        }
    }
}

impl std::error::Error for DockBuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Layout(err) => Some(err),
            _ => None,
        }
    }
}

impl From<LayoutPersistenceError> for DockBuildError {
    fn from(err: LayoutPersistenceError) -> Self {
        Self::Layout(err)
    }
}

#[derive(Clone, Debug)]
enum Node {
    Leaf {
        contents: Vec<ContentId>,
    },
    Split {
        dir: BuilderSplit,
        side_fraction: f32,
        main: DockNodeId,
        side: DockNodeId,
    },
}

/// Scripted construction of a default layout, in the manner of Dear ImGui's `DockBuilder`:
/// create a node, split it, dock content into the leaves, then [`Self::finish`].
///
/// The first node created is the root of the layout.
///
/// ```
/// use egui_split_dock::{BuilderSplit, ContentId, DockBuilder};
///
/// let mut b = DockBuilder::new();
/// let dockspace = b.add_node();
/// let (left, main) = b.split_node(dockspace, BuilderSplit::Left, 0.25);
/// b.dock_content(ContentId(1), left).unwrap();
/// b.dock_contents([ContentId(2), ContentId(3)], main).unwrap();
/// let manager = b.finish().unwrap();
/// assert_eq!(manager.pane_count(), 2);
/// ```
#[derive(Clone, Debug, Default)]
pub struct DockBuilder {
    options: DockOptions,
    next_node_id: u64,
    root: Option<DockNodeId>,
    nodes: BTreeMap<DockNodeId, Node>,
    active: Option<ContentId>,
}

impl DockBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for the [`SplitViewManager`] produced by [`Self::finish`].
    pub fn with_options(options: DockOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    fn alloc_node_id(&mut self) -> DockNodeId {
        self.next_node_id = self.next_node_id.saturating_add(1);
        DockNodeId(self.next_node_id)
    }

    /// Create an empty leaf node.
    #[must_use]
    pub fn add_node(&mut self) -> DockNodeId {
        let id = self.alloc_node_id();
        self.nodes.insert(id, Node::Leaf { contents: Vec::new() });
        self.root.get_or_insert(id);
        id
    }

    /// Split `node` and return `(side, main)`.
    ///
    /// `node` itself becomes the split; whatever it held moves into `main`. `side_fraction` is
    /// the share of `node` given to `side`, clamped like any split ratio.
    #[must_use]
    pub fn split_node(
        &mut self,
        node: DockNodeId,
        dir: BuilderSplit,
        side_fraction: f32,
    ) -> (DockNodeId, DockNodeId) {
        let old = self
            .nodes
            .remove(&node)
            .unwrap_or(Node::Leaf { contents: Vec::new() });
        let main = self.alloc_node_id();
        self.nodes.insert(main, old);
        let side = self.add_node();

        self.nodes.insert(
            node,
            Node::Split {
                dir,
                side_fraction: clamp_ratio(side_fraction),
                main,
                side,
            },
        );
        (side, main)
    }

    /// Add `content` as a tab of leaf `node`.
    pub fn dock_content(&mut self, content: ContentId, node: DockNodeId) -> Result<(), DockBuildError> {
        let docked = self.nodes.values().any(|n| match n {
            Node::Leaf { contents } => contents.contains(&content),
            Node::Split { .. } => false,
        });
        if docked {
            return Err(DockBuildError::DuplicateContent(content));
        }
        match self.nodes.get_mut(&node) {
            Some(Node::Leaf { contents }) => {
                contents.push(content);
                Ok(())
            }
            Some(Node::Split { .. }) => Err(DockBuildError::NotALeaf(node)),
            None => Err(DockBuildError::UnknownNode(node)),
        }
    }

    /// Dock several contents into `node`, tabbed together in order.
    pub fn dock_contents(
        &mut self,
        contents: impl IntoIterator<Item = ContentId>,
        node: DockNodeId,
    ) -> Result<(), DockBuildError> {
        contents
            .into_iter()
            .try_for_each(|content| self.dock_content(content, node))
    }

    /// The content active after [`Self::finish`]. Defaults to the first docked content of the
    /// first leaf.
    pub fn set_active(&mut self, content: ContentId) {
        self.active = Some(content);
    }

    /// The layout as a snapshot, ready for [`SplitViewManager::restore`].
    pub fn build_snapshot(&self) -> Result<LayoutSnapshot, DockBuildError> {
        let root = self.root.ok_or(DockBuildError::NoNodes)?;
        let mut visited = HashSet::with_capacity(self.nodes.len());
        let mut nodes = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![root];

        while let Some(id) = stack.pop() {
            visited.insert(id);
            match self.nodes.get(&id).ok_or(DockBuildError::UnknownNode(id))? {
                Node::Leaf { contents } => {
                    if contents.is_empty() {
                        return Err(DockBuildError::EmptyLeaf(id));
                    }
                    let active = self
                        .active
                        .and_then(|a| contents.iter().position(|&c| c == a))
                        .unwrap_or(0);
                    nodes.push(NodeSnapshot::Leaf {
                        contents: contents.clone(),
                        active,
                    });
                }
                &Node::Split {
                    dir,
                    side_fraction,
                    main,
                    side,
                } => {
                    let (first, second, ratio) = if dir.side_first() {
                        (side, main, side_fraction)
                    } else {
                        (main, side, 1.0 - side_fraction)
                    };
                    nodes.push(NodeSnapshot::Split {
                        direction: dir.direction(),
                        ratio: clamp_ratio(ratio),
                    });
                    stack.push(second);
                    stack.push(first);
                }
            }
        }

        if let Some(&detached) = self.nodes.keys().find(|id| !visited.contains(*id)) {
            return Err(DockBuildError::DetachedNode(detached));
        }

        let first_content = nodes.iter().find_map(|node| match node {
            NodeSnapshot::Leaf { contents, .. } => contents.first().copied(),
            NodeSnapshot::Split { .. } => None,
        });
        let active = self
            .active
            .or(first_content)
            .ok_or(DockBuildError::EmptyLeaf(root))?;

        Ok(LayoutSnapshot {
            version: LAYOUT_SNAPSHOT_VERSION,
            active,
            nodes,
        })
    }

    /// Validate the layout and produce a manager showing it.
    pub fn finish(self) -> Result<SplitViewManager, DockBuildError> {
        let snapshot = self.build_snapshot()?;
        let mut manager = SplitViewManager::with_options(snapshot.active, self.options);
        manager.restore(&snapshot)?;
        log::debug!(
            "dock builder: {} nodes, active {}",
            snapshot.nodes.len(),
            snapshot.active
        );
        Ok(manager)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pane::PaneKind;

    fn c(n: u64) -> ContentId {
        ContentId(n)
    }

    fn leaf_contents(manager: &SplitViewManager) -> Vec<Vec<ContentId>> {
        manager
            .all_panes()
            .into_iter()
            .map(|pane| pane.contents().to_vec())
            .collect()
    }

    #[test]
    fn split_node_semantics_match_imgui() {
        let mut b = DockBuilder::new();
        let dockspace = b.add_node();
        let (right, main) = b.split_node(dockspace, BuilderSplit::Right, 0.25);
        b.dock_content(c(1), main).unwrap();
        b.dock_content(c(2), right).unwrap();

        let manager = b.finish().unwrap();
        let root = manager.pane(manager.root_id()).unwrap();
        let PaneKind::Split(split) = root.kind() else {
            panic!("root should be a split");
        };
        assert_eq!(split.direction, SplitDirection::Horizontal);
        // Right split: main is first (left), side is second (right).
        assert_eq!(split.ratio, 0.75);
        assert_eq!(leaf_contents(&manager), vec![vec![c(1)], vec![c(2)]]);
        assert_eq!(manager.active_content(), c(1));
    }

    #[test]
    fn nested_layout_with_tabs() {
        let mut b = DockBuilder::new();
        let dockspace = b.add_node();
        let (left, main) = b.split_node(dockspace, BuilderSplit::Left, 0.2);
        let (bottom, center) = b.split_node(main, BuilderSplit::Down, 0.3);
        b.dock_content(c(10), left).unwrap();
        b.dock_contents([c(20), c(21)], center).unwrap();
        b.dock_content(c(30), bottom).unwrap();
        b.set_active(c(21));

        let manager = b.finish().unwrap();
        assert_eq!(
            leaf_contents(&manager),
            vec![vec![c(10)], vec![c(20), c(21)], vec![c(30)]]
        );
        assert_eq!(manager.active_content(), c(21));
        assert!(manager.is_content_visible(c(21)));
        let root = manager.pane(manager.root_id()).unwrap();
        assert_eq!(root.ratio(), Some(0.2));
        assert!(manager.integrity_issues().is_empty());
    }

    #[test]
    fn splitting_a_split_moves_it_into_main() {
        let mut b = DockBuilder::new();
        let dockspace = b.add_node();
        let (side, main) = b.split_node(dockspace, BuilderSplit::Right, 0.5);
        b.dock_content(c(1), main).unwrap();
        b.dock_content(c(2), side).unwrap();
        let (top, _rest) = b.split_node(dockspace, BuilderSplit::Up, 0.5);
        b.dock_content(c(3), top).unwrap();

        let manager = b.finish().unwrap();
        assert_eq!(
            leaf_contents(&manager),
            vec![vec![c(3)], vec![c(1)], vec![c(2)]]
        );
        assert_eq!(manager.pane_count(), 3);
    }

    #[test]
    fn docking_errors() {
        let mut b = DockBuilder::new();
        let dockspace = b.add_node();
        let (side, _main) = b.split_node(dockspace, BuilderSplit::Left, 0.5);
        assert!(matches!(
            b.dock_content(c(1), dockspace),
            Err(DockBuildError::NotALeaf(_))
        ));
        assert!(matches!(
            b.dock_content(c(1), DockNodeId(99)),
            Err(DockBuildError::UnknownNode(_))
        ));
        b.dock_content(c(1), side).unwrap();
        assert!(matches!(
            b.dock_content(c(1), side),
            Err(DockBuildError::DuplicateContent(_))
        ));
    }

    #[test]
    fn finish_rejects_incomplete_layouts() {
        assert!(matches!(DockBuilder::new().finish(), Err(DockBuildError::NoNodes)));

        let mut b = DockBuilder::new();
        let dockspace = b.add_node();
        let (side, _main) = b.split_node(dockspace, BuilderSplit::Down, 0.5);
        b.dock_content(c(1), side).unwrap();
        assert!(matches!(b.clone().finish(), Err(DockBuildError::EmptyLeaf(_))));

        let mut b = DockBuilder::new();
        let dockspace = b.add_node();
        b.dock_content(c(1), dockspace).unwrap();
        let stray = b.add_node();
        b.dock_content(c(2), stray).unwrap();
        assert!(matches!(b.finish(), Err(DockBuildError::DetachedNode(id)) if id == stray));
    }

    #[test]
    fn finish_reports_layout_errors() {
        let mut b = DockBuilder::with_options(DockOptions {
            max_panes: Some(1),
            ..Default::default()
        });
        let dockspace = b.add_node();
        let (side, main) = b.split_node(dockspace, BuilderSplit::Left, 0.5);
        b.dock_content(c(1), side).unwrap();
        b.dock_content(c(2), main).unwrap();
        let err = b.finish().unwrap_err();
        assert!(matches!(
            err,
            DockBuildError::Layout(LayoutPersistenceError::TooManyPanes { found: 2, max: 1 })
        ));
        assert!(std::error::Error::source(&err).is_some());

        let mut b = DockBuilder::new();
        let dockspace = b.add_node();
        b.dock_content(c(1), dockspace).unwrap();
        b.set_active(c(5));
        assert!(matches!(
            b.finish(),
            Err(DockBuildError::Layout(LayoutPersistenceError::ActiveContentMissing(_)))
        ));
    }
}
