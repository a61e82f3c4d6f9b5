use crate::integrity;
use crate::pane::PaneKind;
use crate::split_view::SplitViewManager;
use crate::tree::PaneTree;

/// Upper bound on `debug_event_log_capacity`.
const MAX_DEBUG_LOG_CAPACITY: usize = 10_000;

fn debug_tree_summary(tree: &PaneTree, max_nodes: usize) -> String {
    let mut lines: Vec<String> = Vec::new();
    for id in tree.preorder().into_iter().take(max_nodes) {
        let Some(node) = tree.get(id) else {
            lines.push(format!("{id} MISSING"));
            continue;
        };
        match node.kind() {
            PaneKind::Leaf(tabs) => lines.push(format!(
                "{id} Leaf parent={:?} tabs={:?} active={}",
                node.parent(),
                tabs.contents(),
                tabs.active_index()
            )),
            PaneKind::Split(split) => lines.push(format!(
                "{id} Split({:?} {:.3}) parent={:?} children=[{}, {}]",
                split.direction,
                split.ratio,
                node.parent(),
                split.first,
                split.second
            )),
        }
    }
    format!(
        "root={} nodes={}\n{}",
        tree.root(),
        tree.node_count(),
        lines.join("\n")
    )
}

impl SplitViewManager {
    pub(crate) fn debug_log_event(&mut self, message: impl Into<String>) {
        if !self.options.debug_event_log {
            return;
        }
        self.push_debug_log_line(message.into());
    }

    fn debug_integrity_log_event(&mut self, message: impl Into<String>) {
        if !self.options.debug_integrity {
            return;
        }
        self.push_debug_log_line(message.into());
    }

    fn push_debug_log_line(&mut self, message: String) {
        let cap = self
            .options
            .debug_event_log_capacity
            .clamp(1, MAX_DEBUG_LOG_CAPACITY);
        while self.debug_log.len() >= cap {
            self.debug_log.pop_front();
        }
        self.debug_log
            .push_back(format!("[frame {}] {}", self.debug_frame, message));
    }

    /// Drop all buffered debug lines.
    pub fn debug_log_clear(&mut self) {
        self.debug_log.clear();
    }

    /// Buffered debug lines, oldest first, one per line.
    pub fn debug_log_text(&self) -> String {
        self.debug_log
            .iter()
            .cloned()
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Check the layout and log (once per distinct result) what is wrong with it.
    pub(crate) fn debug_check_integrity(&mut self) {
        let issues = self.integrity_issues();
        let hash = integrity::hash_issues(&issues);

        let prev = std::mem::replace(&mut self.debug_last_integrity_hash, hash);
        if prev == hash {
            return;
        }

        if issues.is_empty() {
            if prev != 0 {
                log::debug!("layout integrity OK");
                self.debug_integrity_log_event("integrity OK");
            }
            return;
        }

        log::warn!("layout integrity FAIL ({} issues): {issues:?}", issues.len());
        self.debug_integrity_log_event(format!("integrity FAIL issues={}", issues.len()));
        for issue in &issues {
            self.debug_integrity_log_event(issue.clone());
        }
        let summary = debug_tree_summary(self.tree(), 48);
        self.debug_integrity_log_event(format!("integrity tree_summary:\n{summary}"));

        assert!(
            !(self.options.debug_integrity_panic && cfg!(debug_assertions)),
            "egui_split_dock integrity failure\n{}",
            issues.join("\n")
        );
    }
}

#[cfg(test)]
mod tests {
    use crate::{ContentId, DockOptions, SplitDirection, SplitViewManager};

    fn manager(options: DockOptions) -> SplitViewManager {
        SplitViewManager::with_options(ContentId(0), options)
    }

    #[test]
    fn event_log_is_bounded_and_frame_tagged() {
        let mut m = manager(DockOptions {
            debug_event_log: true,
            debug_event_log_capacity: 2,
            max_panes: None,
            ..Default::default()
        });
        m.update_layout(egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(800.0, 600.0)));
        for n in 1..=3 {
            m.split_active(SplitDirection::Horizontal, ContentId(n), 0.5);
        }
        let text = m.debug_log_text();
        assert_eq!(text.lines().count(), 2, "{text}");
        assert!(text.lines().all(|l| l.starts_with("[frame 1]")), "{text}");
        assert!(text.contains("#3"), "{text}");

        m.debug_log_clear();
        assert!(m.debug_log_text().is_empty());
    }

    #[test]
    fn event_log_disabled_by_default() {
        let mut m = manager(DockOptions::default());
        m.split_active(SplitDirection::Vertical, ContentId(1), 0.5);
        assert!(m.debug_log_text().is_empty());
    }

    #[test]
    fn integrity_checks_stay_quiet_on_healthy_layouts() {
        let mut m = manager(DockOptions {
            debug_integrity: true,
            debug_integrity_panic: true,
            ..Default::default()
        });
        m.split_active(SplitDirection::Horizontal, ContentId(1), 0.5);
        m.close_pane(ContentId(1));
        m.unsplit_all();
        assert!(m.debug_log_text().is_empty());
    }
}
