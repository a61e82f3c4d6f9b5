/// Default limit on the number of leaves in a layout.
pub const DEFAULT_MAX_PANES: usize = 8;

/// Fraction of a pane's width (or height) covered by each edge drop band.
pub const DROP_ZONE_FRACTION: f32 = 0.25;

/// Minimum thickness (in points) of an edge drop band.
pub const DROP_ZONE_MIN_SIZE: f32 = 40.0;

/// Upper bound on an edge drop band, as a fraction of the pane's extent.
pub const DROP_ZONE_MAX_FRACTION: f32 = 0.4;

/// Distance (in points) added on both sides of a gutter when hit-testing splitters.
pub const SPLITTER_HIT_TOLERANCE: f32 = 4.0;

/// Options for [`crate::SplitViewManager`] and [`crate::DockSystem`].
#[derive(Clone, Debug)]
pub struct DockOptions {
    /// Maximum number of leaves. Splits and drops that would exceed it are rejected.
    ///
    /// `None` removes the limit.
    pub max_panes: Option<usize>,

    /// Extra grab distance (in points) on each side of a splitter gutter.
    pub splitter_hit_tolerance: f32,

    /// Edge drop band thickness as a fraction of the target pane's extent.
    pub drop_zone_fraction: f32,

    /// Edge drop bands are never thinner than this (in points)...
    pub drop_zone_min_size: f32,

    /// ...unless that would exceed this fraction of the pane's extent.
    pub drop_zone_max_fraction: f32,

    /// If true, a `Center` drop is only accepted while the layout is split.
    ///
    /// Off by default: `Center` always means "add as tab".
    pub center_drop_requires_split: bool,

    /// If true, record debug events (mutations, drop decisions, integrity checks) in a small ring
    /// buffer, readable via [`crate::DockSystem::debug_log_text`].
    pub debug_event_log: bool,

    /// Maximum number of debug log lines to keep (ring buffer).
    pub debug_event_log_capacity: usize,

    /// If true, run tree integrity checks after every mutation (debug-only).
    pub debug_integrity: bool,

    /// If true, panic on integrity issues (debug-only).
    pub debug_integrity_panic: bool,
}

impl Default for DockOptions {
    fn default() -> Self {
        Self {
            max_panes: Some(DEFAULT_MAX_PANES),
            splitter_hit_tolerance: SPLITTER_HIT_TOLERANCE,
            drop_zone_fraction: DROP_ZONE_FRACTION,
            drop_zone_min_size: DROP_ZONE_MIN_SIZE,
            drop_zone_max_fraction: DROP_ZONE_MAX_FRACTION,
            center_drop_requires_split: false,
            debug_event_log: false,
            debug_event_log_capacity: 200,
            debug_integrity: false,
            debug_integrity_panic: false,
        }
    }
}

impl DockOptions {
    /// Whether a layout with `leaf_count` leaves may grow by one more.
    pub(crate) fn allows_another_pane(&self, leaf_count: usize) -> bool {
        self.max_panes.is_none_or(|max| leaf_count < max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_limit_is_eight_panes() {
        let opt = DockOptions::default();
        assert!(opt.allows_another_pane(7));
        assert!(!opt.allows_another_pane(8));
    }

    #[test]
    fn unlimited_panes_when_max_is_none() {
        let opt = DockOptions {
            max_panes: None,
            ..Default::default()
        };
        assert!(opt.allows_another_pane(10_000));
    }
}
