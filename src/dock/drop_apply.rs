use super::drop_target::DropZone;
use crate::options::DockOptions;
use crate::pane::{ContentId, PaneId, SplitPane};
use crate::tree::PaneTree;

/// Ratio of the split an edge drop creates.
const DROP_SPLIT_RATIO: f32 = 0.5;

/// Why a drop (or move) left the layout unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DropRejected {
    NoTarget,
    TargetNotLeaf(PaneId),
    ContentMissing(ContentId),
    /// A pane cannot be split by, or docked onto, its own only tab.
    SoleTabOntoItself,
    AlreadyInTarget,
    CenterNeedsSplit,
    TooManyPanes { found: usize, max: usize },
}

impl std::fmt::Display for DropRejected {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoTarget => write!(f, "no drop target"),
            Self::TargetNotLeaf(pane) => write!(f, "target {pane} is not a leaf"),
            Self::ContentMissing(content) => write!(f, "{content} is not docked"),
            Self::SoleTabOntoItself => write!(f, "dropped onto its own single-tab pane"),
            Self::AlreadyInTarget => write!(f, "already a tab of the target"),
            Self::CenterNeedsSplit => write!(f, "center drop needs a split layout"),
            Self::TooManyPanes { found, max } => {
                write!(f, "would create {found} panes (limit {max})")
            }
        }
    }
}

/// What decides whether a drop is allowed, beyond the tree itself.
#[derive(Clone, Copy, Debug)]
pub(crate) struct DropRules {
    pub max_panes: Option<usize>,
    pub center_requires_split: bool,
}

impl DropRules {
    pub(crate) fn for_drag(options: &DockOptions) -> Self {
        Self {
            max_panes: options.max_panes,
            center_requires_split: options.center_drop_requires_split,
        }
    }

    /// Programmatic moves always allow "add as tab".
    pub(crate) fn for_move(options: &DockOptions) -> Self {
        Self {
            max_panes: options.max_panes,
            center_requires_split: false,
        }
    }
}

/// A drop that went through, ready to commit.
#[derive(Debug)]
pub(crate) struct DropApplied {
    pub tree: PaneTree,
    /// The leaf now holding (and showing) the dropped content.
    pub destination: PaneId,
}

/// Dock `content` into leaf `target` at `zone`, on a copy of `tree`.
///
/// - `Center` adds `content` as the selected tab of `target`.
/// - Edge zones split `target` in place; `content` takes the half named by the zone, the target's
///   existing tabs the other.
///
/// Afterwards `content` is removed from every other leaf and emptied leaves are collapsed, so the
/// returned tree again holds each content id exactly once. `tree` itself is never modified.
pub(crate) fn apply_drop(
    tree: &PaneTree,
    content: ContentId,
    target: PaneId,
    zone: DropZone,
    rules: DropRules,
) -> Result<DropApplied, DropRejected> {
    if zone == DropZone::None {
        return Err(DropRejected::NoTarget);
    }
    let target_pane = tree
        .get(target)
        .filter(|pane| pane.is_leaf())
        .ok_or(DropRejected::TargetNotLeaf(target))?;
    if !tree.contains_content(content) {
        return Err(DropRejected::ContentMissing(content));
    }
    if target_pane.has_figure(content) && target_pane.figure_count() == 1 {
        return Err(DropRejected::SoleTabOntoItself);
    }

    let mut scratch = tree.clone();
    let placed = match zone.split_direction() {
        None => {
            if rules.center_requires_split && !tree.is_split() {
                return Err(DropRejected::CenterNeedsSplit);
            }
            if target_pane.has_figure(content) {
                return Err(DropRejected::AlreadyInTarget);
            }
            scratch
                .get_mut(target)
                .is_some_and(|pane| pane.add_figure(content))
                .then_some(target)
        }
        Some(direction) => {
            if let Some(pane) = scratch.get_mut(target) {
                pane.remove_figure(content);
            }
            scratch
                .split_leaf(target, direction, content, DROP_SPLIT_RATIO)
                .and_then(|new_leaf| {
                    if !zone.is_before() {
                        return Some(new_leaf);
                    }
                    let first = scratch.get(target).and_then(SplitPane::first)?;
                    scratch
                        .swap_leaf_contents(first, new_leaf)
                        .then_some(first)
                })
        }
    };
    let Some(placed) = placed else {
        return Err(DropRejected::TargetNotLeaf(target));
    };

    scratch.remove_content_except(content, placed);
    scratch.collapse_empty_leaves();

    let destination = scratch
        .find_by_content(content)
        .ok_or(DropRejected::ContentMissing(content))?;
    let found = scratch.leaf_count();
    if let Some(max) = rules.max_panes
        && found > max
    {
        return Err(DropRejected::TooManyPanes { found, max });
    }

    Ok(DropApplied {
        tree: scratch,
        destination,
    })
}
