use std::collections::BTreeMap;

use ahash::{HashSet, HashSetExt as _};

use crate::pane::{
    ContentId, MAX_RATIO, MIN_RATIO, PaneId, PaneKind, Split, SplitDirection, SplitPane, Tabs,
};
use crate::split_view::SplitViewManager;
use crate::tree::PaneTree;

pub const LAYOUT_SNAPSHOT_VERSION: u32 = 1;

/// Deepest split nesting accepted when restoring.
pub const MAX_SNAPSHOT_DEPTH: usize = 64;

#[derive(Debug)]
pub enum LayoutPersistenceError {
    UnsupportedVersion { found: u32, expected: u32 },
    EmptySnapshot,
    /// A split is missing one or both of its children.
    Truncated { expected_at: usize },
    TrailingNodes { extra: usize },
    TooDeep { max: usize },
    InvalidRatio { node: usize, ratio: f32 },
    EmptyLeaf { node: usize },
    ActiveTabOutOfRange { node: usize, active: usize, len: usize },
    DuplicateContent(ContentId),
    ActiveContentMissing(ContentId),
    TooManyPanes { found: usize, max: usize },
    RonSerialize(ron::Error),
    RonDeserialize(ron::error::SpannedError),
}

impl std::fmt::Display for LayoutPersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedVersion { found, expected } => {
                write!(
                    f,
                    "unsupported layout snapshot version: {found} (expected {expected})"
                )
            }
            Self::EmptySnapshot => write!(f, "layout snapshot has no nodes"),
            Self::Truncated { expected_at } => {
                write!(f, "layout snapshot ends early: node {expected_at} missing")
            }
            Self::TrailingNodes { extra } => {
                write!(f, "layout snapshot has {extra} trailing node(s)")
            }
            Self::TooDeep { max } => write!(f, "layout snapshot nests deeper than {max}"),
            Self::InvalidRatio { node, ratio } => {
                write!(
                    f,
                    "split node {node} has ratio {ratio} outside [{MIN_RATIO}, {MAX_RATIO}]"
                )
            }
            Self::EmptyLeaf { node } => write!(f, "leaf node {node} has no tabs"),
            Self::ActiveTabOutOfRange { node, active, len } => {
                write!(f, "leaf node {node} active tab {active} out of range (len {len})")
            }
            Self::DuplicateContent(content) => {
                write!(f, "content {content} appears more than once")
            }
            Self::ActiveContentMissing(content) => {
                write!(f, "active content {content} is not in any leaf")
            }
            Self::TooManyPanes { found, max } => {
                write!(f, "layout has {found} panes (limit {max})")
            }
            Self::RonSerialize(err) => write!(f, "ron serialize error: {err}"),
            Self::RonDeserialize(err) => write!(f, "ron deserialize error: {err}"),
        }
    }
}

impl std::error::Error for LayoutPersistenceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::RonSerialize(err) => Some(err),
            Self::RonDeserialize(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ron::Error> for LayoutPersistenceError {
    fn from(err: ron::Error) -> Self {
        Self::RonSerialize(err)
    }
}

impl From<ron::error::SpannedError> for LayoutPersistenceError {
    fn from(err: ron::error::SpannedError) -> Self {
        Self::RonDeserialize(err)
    }
}

/// Serializable form of a whole layout.
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct LayoutSnapshot {
    pub version: u32,
    pub active: ContentId,
    /// Preorder walk: a split is followed by its first subtree, then its second.
    pub nodes: Vec<NodeSnapshot>,
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub enum NodeSnapshot {
    Split {
        direction: SplitDirection,
        ratio: f32,
    },
    Leaf {
        contents: Vec<ContentId>,
        active: usize,
    },
}

impl LayoutSnapshot {
    /// Capture `tree` (with `active` as the manager-level selection).
    pub(crate) fn capture(tree: &PaneTree, active: ContentId) -> Self {
        let nodes = tree
            .preorder()
            .into_iter()
            .filter_map(|id| tree.get(id))
            .map(|node| match node.kind() {
                PaneKind::Split(split) => NodeSnapshot::Split {
                    direction: split.direction,
                    ratio: split.ratio,
                },
                PaneKind::Leaf(tabs) => NodeSnapshot::Leaf {
                    contents: tabs.contents().to_vec(),
                    active: tabs.active_index(),
                },
            })
            .collect();
        Self {
            version: LAYOUT_SNAPSHOT_VERSION,
            active,
            nodes,
        }
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node, NodeSnapshot::Leaf { .. }))
            .count()
    }
}

/// Rebuilds a [`PaneTree`] from a snapshot, validating as it goes.
struct TreeRebuilder<'a> {
    nodes: &'a [NodeSnapshot],
    cursor: usize,
    next_id: u64,
    built: BTreeMap<PaneId, SplitPane>,
    seen: HashSet<ContentId>,
}

impl TreeRebuilder<'_> {
    fn alloc_id(&mut self) -> PaneId {
        let id = PaneId::from_raw(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    fn build_node(
        &mut self,
        id: PaneId,
        parent: Option<PaneId>,
        depth: usize,
    ) -> Result<(), LayoutPersistenceError> {
        if depth > MAX_SNAPSHOT_DEPTH {
            return Err(LayoutPersistenceError::TooDeep {
                max: MAX_SNAPSHOT_DEPTH,
            });
        }
        let index = self.cursor;
        let nodes = self.nodes;
        let Some(node) = nodes.get(index) else {
            return Err(LayoutPersistenceError::Truncated { expected_at: index });
        };
        self.cursor += 1;

        match node {
            NodeSnapshot::Leaf { contents, active } => {
                if contents.is_empty() {
                    return Err(LayoutPersistenceError::EmptyLeaf { node: index });
                }
                if *active >= contents.len() {
                    return Err(LayoutPersistenceError::ActiveTabOutOfRange {
                        node: index,
                        active: *active,
                        len: contents.len(),
                    });
                }
                if let Some(&dup) = contents.iter().find(|&&c| !self.seen.insert(c)) {
                    return Err(LayoutPersistenceError::DuplicateContent(dup));
                }
                self.built.insert(
                    id,
                    SplitPane::leaf(id, parent, Tabs::new(contents.clone(), *active)),
                );
            }
            NodeSnapshot::Split { direction, ratio } => {
                let (direction, ratio) = (*direction, *ratio);
                if !ratio.is_finite() || !(MIN_RATIO..=MAX_RATIO).contains(&ratio) {
                    return Err(LayoutPersistenceError::InvalidRatio { node: index, ratio });
                }
                let first = self.alloc_id();
                let second = self.alloc_id();
                let mut pane = SplitPane::leaf(id, parent, Tabs::default());
                pane.kind = PaneKind::Split(Split {
                    direction,
                    ratio,
                    first,
                    second,
                });
                self.built.insert(id, pane);
                self.build_node(first, Some(id), depth + 1)?;
                self.build_node(second, Some(id), depth + 1)?;
            }
        }
        Ok(())
    }
}

/// Validate `snapshot` and turn it into a tree whose root is `root` and whose other ids start at
/// `next_id`.
pub(crate) fn rebuild_tree(
    snapshot: &LayoutSnapshot,
    root: PaneId,
    next_id: u64,
    max_panes: Option<usize>,
) -> Result<PaneTree, LayoutPersistenceError> {
    if snapshot.version != LAYOUT_SNAPSHOT_VERSION {
        return Err(LayoutPersistenceError::UnsupportedVersion {
            found: snapshot.version,
            expected: LAYOUT_SNAPSHOT_VERSION,
        });
    }
    if snapshot.nodes.is_empty() {
        return Err(LayoutPersistenceError::EmptySnapshot);
    }

    let mut rebuilder = TreeRebuilder {
        nodes: &snapshot.nodes,
        cursor: 0,
        next_id,
        built: BTreeMap::new(),
        seen: HashSet::new(),
    };
    rebuilder.build_node(root, None, 0)?;

    let extra = snapshot.nodes.len() - rebuilder.cursor;
    if extra > 0 {
        return Err(LayoutPersistenceError::TrailingNodes { extra });
    }
    if !rebuilder.seen.contains(&snapshot.active) {
        return Err(LayoutPersistenceError::ActiveContentMissing(snapshot.active));
    }
    let leaves = snapshot.leaf_count();
    if let Some(max) = max_panes
        && leaves > max
    {
        return Err(LayoutPersistenceError::TooManyPanes { found: leaves, max });
    }

    Ok(PaneTree::from_parts(
        rebuilder.built,
        root,
        rebuilder.next_id,
    ))
}

fn pretty_ron_config() -> ron::ser::PrettyConfig {
    ron::ser::PrettyConfig::new()
        .depth_limit(4)
        .separate_tuple_members(true)
}

impl SplitViewManager {
    /// Capture the current layout.
    pub fn snapshot(&self) -> LayoutSnapshot {
        LayoutSnapshot::capture(self.tree(), self.active_content())
    }

    /// Replace the layout with `snapshot`.
    ///
    /// The snapshot is fully validated into a scratch tree first; on error the current layout is
    /// left untouched. Pane ids are never reused, but the root keeps its id.
    pub fn restore(&mut self, snapshot: &LayoutSnapshot) -> Result<(), LayoutPersistenceError> {
        let tree = rebuild_tree(
            snapshot,
            self.root_id(),
            self.next_pane_id(),
            self.options.max_panes,
        )?;
        let panes = tree.leaf_count();
        self.commit_tree(tree, snapshot.active);
        log::debug!("restored layout: {panes} panes, active {}", snapshot.active);
        self.debug_log_event(format!("restore OK panes={panes} active={}", snapshot.active));
        Ok(())
    }

    /// Compact RON encoding of [`Self::snapshot`].
    pub fn try_serialize(&self) -> Result<String, LayoutPersistenceError> {
        Ok(ron::ser::to_string(&self.snapshot())?)
    }

    /// Human readable RON encoding of [`Self::snapshot`].
    pub fn try_serialize_pretty(&self) -> Result<String, LayoutPersistenceError> {
        Ok(ron::ser::to_string_pretty(
            &self.snapshot(),
            pretty_ron_config(),
        )?)
    }

    /// Opaque layout string for [`Self::deserialize`]. Empty if encoding fails.
    pub fn serialize(&self) -> String {
        self.try_serialize().unwrap_or_else(|err| {
            log::warn!("layout serialize failed: {err}");
            String::new()
        })
    }

    pub fn try_deserialize(&mut self, data: &str) -> Result<(), LayoutPersistenceError> {
        let snapshot: LayoutSnapshot = ron::from_str(data)?;
        self.restore(&snapshot)
    }

    /// Restore a layout produced by [`Self::serialize`].
    ///
    /// Returns `false` (leaving the current layout untouched) on malformed input.
    pub fn deserialize(&mut self, data: &str) -> bool {
        match self.try_deserialize(data) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("layout restore rejected: {err}");
                self.debug_log_event(format!("restore FAIL {err}"));
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use egui::{Rect, pos2, vec2};

    use super::*;

    fn canvas() -> Rect {
        Rect::from_min_size(pos2(0.0, 0.0), vec2(1000.0, 600.0))
    }

    fn c(n: u64) -> ContentId {
        ContentId(n)
    }

    fn nested_manager() -> SplitViewManager {
        let mut m = SplitViewManager::new(c(0));
        m.update_layout(canvas());
        m.split_pane(c(0), SplitDirection::Horizontal, c(1), 0.3).unwrap();
        m.split_pane(c(1), SplitDirection::Vertical, c(2), 0.65).unwrap();
        let leaf = m.pane_for_content(c(2)).unwrap();
        m.activate_local_tab(leaf, 0);
        m.close_pane(c(2));
        m.split_pane(c(1), SplitDirection::Vertical, c(3), 0.65).unwrap();
        let leaf = m.pane_for_content(c(0)).unwrap();
        assert!(m.add_tab(leaf, c(4)));
        m.activate_local_tab(leaf, 0);
        m.set_active_content(c(3));
        m
    }

    fn leaf_layout(m: &SplitViewManager) -> Vec<(Vec<ContentId>, usize, Rect)> {
        m.all_panes()
            .into_iter()
            .map(|p| (p.contents().to_vec(), p.active_local_index(), p.bounds()))
            .collect()
    }

    #[test]
    fn round_trip_reproduces_layout() {
        let original = nested_manager();
        let data = original.serialize();
        assert!(!data.is_empty());

        let mut restored = SplitViewManager::new(c(99));
        restored.update_layout(canvas());
        assert!(restored.deserialize(&data), "{data}");

        assert_eq!(restored.pane_count(), original.pane_count());
        assert_eq!(restored.is_split(), original.is_split());
        assert_eq!(restored.active_content(), original.active_content());
        assert_eq!(leaf_layout(&restored), leaf_layout(&original));
        assert_eq!(restored.snapshot(), original.snapshot());
        assert!(restored.integrity_issues().is_empty());
    }

    #[test]
    fn pretty_output_is_also_restorable() {
        let original = nested_manager();
        let pretty = original.try_serialize_pretty().unwrap();
        let mut restored = SplitViewManager::new(c(99));
        restored.try_deserialize(&pretty).unwrap();
        assert_eq!(restored.snapshot(), original.snapshot());
    }

    #[test]
    fn restore_keeps_root_id_and_never_reuses_ids() {
        let mut m = nested_manager();
        let root = m.root_id();
        let before: Vec<PaneId> = m.tree().preorder();
        let snapshot = m.snapshot();
        m.restore(&snapshot).unwrap();
        assert_eq!(m.root_id(), root);
        for id in m.tree().preorder().into_iter().skip(1) {
            assert!(!before.contains(&id), "{id} reused");
        }
    }

    #[test]
    fn malformed_input_leaves_layout_untouched() {
        let mut m = nested_manager();
        let before = m.snapshot();
        for data in ["", "not ron", "LayoutSnapshot(version:1,active:0,nodes:[Leaf(", "()"] {
            assert!(!m.deserialize(data), "{data:?}");
            assert_eq!(m.snapshot(), before);
        }
    }

    fn restore_err(snapshot: LayoutSnapshot) -> LayoutPersistenceError {
        let mut m = SplitViewManager::new(c(0));
        let before = m.snapshot();
        let err = m.restore(&snapshot).unwrap_err();
        assert_eq!(m.snapshot(), before);
        err
    }

    fn leaf(contents: &[u64], active: usize) -> NodeSnapshot {
        NodeSnapshot::Leaf {
            contents: contents.iter().copied().map(ContentId).collect(),
            active,
        }
    }

    fn split(ratio: f32) -> NodeSnapshot {
        NodeSnapshot::Split {
            direction: SplitDirection::Horizontal,
            ratio,
        }
    }

    fn snapshot(active: u64, nodes: Vec<NodeSnapshot>) -> LayoutSnapshot {
        LayoutSnapshot {
            version: LAYOUT_SNAPSHOT_VERSION,
            active: c(active),
            nodes,
        }
    }

    #[test]
    fn rejects_structurally_invalid_snapshots() {
        assert!(matches!(
            restore_err(LayoutSnapshot {
                version: 7,
                ..snapshot(0, vec![leaf(&[0], 0)])
            }),
            LayoutPersistenceError::UnsupportedVersion { found: 7, .. }
        ));
        assert!(matches!(
            restore_err(snapshot(0, vec![])),
            LayoutPersistenceError::EmptySnapshot
        ));
        assert!(matches!(
            restore_err(snapshot(0, vec![split(0.5), leaf(&[0], 0)])),
            LayoutPersistenceError::Truncated { expected_at: 2 }
        ));
        assert!(matches!(
            restore_err(snapshot(0, vec![leaf(&[0], 0), leaf(&[1], 0)])),
            LayoutPersistenceError::TrailingNodes { extra: 1 }
        ));
        assert!(matches!(
            restore_err(snapshot(0, vec![split(1.0), leaf(&[0], 0), leaf(&[1], 0)])),
            LayoutPersistenceError::InvalidRatio { node: 0, .. }
        ));
        assert!(matches!(
            restore_err(snapshot(0, vec![split(f32::NAN), leaf(&[0], 0), leaf(&[1], 0)])),
            LayoutPersistenceError::InvalidRatio { .. }
        ));
    }

    #[test]
    fn rejects_invalid_leaves_and_contents() {
        assert!(matches!(
            restore_err(snapshot(0, vec![split(0.5), leaf(&[0], 0), leaf(&[], 0)])),
            LayoutPersistenceError::EmptyLeaf { node: 2 }
        ));
        assert!(matches!(
            restore_err(snapshot(0, vec![leaf(&[0, 1], 2)])),
            LayoutPersistenceError::ActiveTabOutOfRange { active: 2, len: 2, .. }
        ));
        assert!(matches!(
            restore_err(snapshot(0, vec![split(0.5), leaf(&[0], 0), leaf(&[1, 0], 0)])),
            LayoutPersistenceError::DuplicateContent(ContentId(0))
        ));
        assert!(matches!(
            restore_err(snapshot(5, vec![leaf(&[0], 0)])),
            LayoutPersistenceError::ActiveContentMissing(ContentId(5))
        ));
    }

    #[test]
    fn rejects_excessive_depth_and_pane_count() {
        let depth = MAX_SNAPSHOT_DEPTH + 1;
        let mut nodes = Vec::new();
        for n in 0..depth {
            nodes.push(split(0.5));
            nodes.push(leaf(&[n as u64], 0));
        }
        nodes.push(leaf(&[depth as u64], 0));
        let mut m = SplitViewManager::new(c(0));
        m.options.max_panes = None;
        assert!(matches!(
            m.restore(&snapshot(0, nodes)).unwrap_err(),
            LayoutPersistenceError::TooDeep { .. }
        ));

        // Nine leaves in a right-leaning chain exceed the default limit of eight.
        let mut nodes = Vec::new();
        for n in 0..8 {
            nodes.push(split(0.5));
            nodes.push(leaf(&[n], 0));
        }
        nodes.push(leaf(&[8], 0));
        assert!(matches!(
            restore_err(snapshot(0, nodes.clone())),
            LayoutPersistenceError::TooManyPanes { found: 9, max: 8 }
        ));

        let mut unlimited = SplitViewManager::new(c(0));
        unlimited.options.max_panes = None;
        unlimited.restore(&snapshot(0, nodes)).unwrap();
        assert_eq!(unlimited.pane_count(), 9);
    }

    #[test]
    fn restore_ends_splitter_drag() {
        let mut m = nested_manager();
        let root = m.root_id();
        assert!(m.begin_splitter_drag(root, 300.0));
        let snapshot = m.snapshot();
        m.restore(&snapshot).unwrap();
        assert!(!m.is_dragging_splitter());
    }

    #[test]
    fn error_source_points_at_ron() {
        let mut m = SplitViewManager::new(c(0));
        let err = m.try_deserialize("nope").unwrap_err();
        assert!(matches!(err, LayoutPersistenceError::RonDeserialize(_)));
        assert!(std::error::Error::source(&err).is_some());
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn snapshot_types_are_format_agnostic() {
        let snapshot = nested_manager().snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: LayoutSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);

        let mut m = SplitViewManager::new(c(99));
        m.restore(&back).unwrap();
        assert_eq!(m.active_content(), c(3));
    }
}
