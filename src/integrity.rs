use std::hash::{Hash as _, Hasher as _};

use ahash::{HashMap, HashMapExt as _, HashSet, HashSetExt as _};
use itertools::Itertools as _;

use crate::pane::{ContentId, MAX_RATIO, MIN_RATIO, PaneId, PaneKind};
use crate::tree::PaneTree;

/// Structural problems of `tree`, one human readable line per issue. Empty means healthy.
///
/// Checked: the root exists and has no parent; every split references two distinct, existing
/// children whose parent link points back; ratios are in range; every node is reachable exactly
/// once; leaves are non-empty with an in-range active tab; each content id lives in one leaf only.
pub(crate) fn tree_integrity_issues(tree: &PaneTree) -> Vec<String> {
    let mut issues: Vec<String> = Vec::new();

    let root = tree.root();
    let Some(root_pane) = tree.get(root) else {
        issues.push(format!("integrity: root {root} missing"));
        return issues;
    };
    if let Some(parent) = root_pane.parent() {
        issues.push(format!("integrity: root {root} has parent {parent}"));
    }

    let mut visited: HashSet<PaneId> = HashSet::new();
    let mut parent_of: HashMap<PaneId, PaneId> = HashMap::new();
    let mut stack: Vec<PaneId> = vec![root];
    let mut contents: Vec<ContentId> = Vec::new();

    while let Some(id) = stack.pop() {
        if !visited.insert(id) {
            issues.push(format!("integrity: node {id} reachable more than once"));
            continue;
        }
        let Some(node) = tree.get(id) else {
            issues.push(format!("integrity: missing node {id} (reachable)"));
            continue;
        };
        if node.id() != id {
            issues.push(format!("integrity: node stored at {id} reports id {}", node.id()));
        }

        match node.kind() {
            PaneKind::Leaf(tabs) => {
                if tabs.is_empty() {
                    issues.push(format!("integrity: leaf {id} has no tabs"));
                } else if tabs.active_index() >= tabs.len() {
                    issues.push(format!(
                        "integrity: leaf {id} active index {} out of range (len {})",
                        tabs.active_index(),
                        tabs.len()
                    ));
                }
                contents.extend(tabs.contents().iter().copied());
            }
            PaneKind::Split(split) => {
                if !(MIN_RATIO..=MAX_RATIO).contains(&split.ratio) {
                    issues.push(format!("integrity: split {id} ratio {} out of range", split.ratio));
                }
                if split.first == split.second {
                    issues.push(format!(
                        "integrity: split {id} uses {} as both children",
                        split.first
                    ));
                }
                for child in [split.first, split.second] {
                    let Some(child_pane) = tree.get(child) else {
                        issues.push(format!(
                            "integrity: split {id} references missing child {child}"
                        ));
                        continue;
                    };
                    if child_pane.parent() != Some(id) {
                        issues.push(format!(
                            "integrity: child {child} of {id} has parent {:?}",
                            child_pane.parent()
                        ));
                    }
                    if let Some(prev_parent) = parent_of.insert(child, id) {
                        issues.push(format!(
                            "integrity: child {child} has multiple parents {prev_parent} and {id}"
                        ));
                    }
                    stack.push(child);
                }
            }
        }
    }

    for content in contents.iter().duplicates() {
        issues.push(format!("integrity: content {content} appears in more than one leaf"));
    }

    let total = tree.node_count();
    if visited.len() != total {
        issues.push(format!(
            "integrity: unreachable nodes {} of {}",
            total.saturating_sub(visited.len()),
            total
        ));
    }

    issues
}

/// Like [`tree_integrity_issues`], plus the manager-level check that `active` is in the tree.
pub(crate) fn layout_integrity_issues(tree: &PaneTree, active: ContentId) -> Vec<String> {
    let mut issues = tree_integrity_issues(tree);
    if !tree.contains_content(active) {
        issues.push(format!("integrity: active content {active} not in any leaf"));
    }
    issues
}

pub(crate) fn hash_issues(lines: &[String]) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    for line in lines {
        line.hash(&mut hasher);
    }
    hasher.finish()
}
