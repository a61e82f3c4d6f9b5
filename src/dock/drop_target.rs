use egui::{Pos2, Rect, pos2, vec2};

use crate::options::DockOptions;
use crate::pane::{PaneId, SplitDirection};

/// Where inside a target pane a dragged tab would land.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DropZone {
    #[default]
    None,
    Left,
    Right,
    Top,
    Bottom,
    /// Add as a tab of the target pane.
    Center,
}

impl DropZone {
    /// Direction of the split an edge drop creates. `None` for `Center`/`None`.
    pub fn split_direction(self) -> Option<SplitDirection> {
        match self {
            Self::Left | Self::Right => Some(SplitDirection::Horizontal),
            Self::Top | Self::Bottom => Some(SplitDirection::Vertical),
            Self::None | Self::Center => None,
        }
    }

    /// Whether the dropped content ends up first (left of / above) the target's content.
    pub fn is_before(self) -> bool {
        matches!(self, Self::Left | Self::Top)
    }

    pub fn is_edge(self) -> bool {
        self.split_direction().is_some()
    }
}

/// Result of hit-testing a drag position against the layout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DropTarget {
    pub zone: DropZone,
    /// The leaf under the pointer; `None` exactly when `zone` is [`DropZone::None`].
    pub pane: Option<PaneId>,
    /// Preview of where the content would go, in canvas coordinates.
    pub highlight: Rect,
}

impl DropTarget {
    pub const NONE: Self = Self {
        zone: DropZone::None,
        pane: None,
        highlight: Rect::ZERO,
    };

    pub fn is_none(&self) -> bool {
        self.zone == DropZone::None
    }
}

impl Default for DropTarget {
    fn default() -> Self {
        Self::NONE
    }
}

/// Thickness of an edge band for a pane `extent` points wide (or tall).
///
/// `fraction` of the extent, at least `min_size`, but never more than `max_fraction` of it.
pub(crate) fn edge_band(extent: f32, options: &DockOptions) -> f32 {
    (extent * options.drop_zone_fraction)
        .max(options.drop_zone_min_size)
        .min(extent * options.drop_zone_max_fraction)
}

/// Classify `pos` inside a pane with `bounds`.
///
/// Bands are tested Left, Right, Top, Bottom; the first match wins, anything else is `Center`.
/// Panes smaller than a point in either direction accept nothing.
pub(crate) fn classify_zone(bounds: Rect, pos: Pos2, options: &DockOptions) -> DropZone {
    let (w, h) = (bounds.width(), bounds.height());
    if !(w >= 1.0 && h >= 1.0) {
        return DropZone::None;
    }
    let edge_w = edge_band(w, options);
    let edge_h = edge_band(h, options);
    let rel = pos - bounds.min;

    if rel.x < edge_w {
        DropZone::Left
    } else if rel.x > w - edge_w {
        DropZone::Right
    } else if rel.y < edge_h {
        DropZone::Top
    } else if rel.y > h - edge_h {
        DropZone::Bottom
    } else {
        DropZone::Center
    }
}

/// The half of `bounds` an edge drop would occupy; all of it for `Center`.
pub(crate) fn highlight_rect(bounds: Rect, zone: DropZone) -> Rect {
    let half = bounds.size() * 0.5;
    match zone {
        DropZone::None => Rect::ZERO,
        DropZone::Center => bounds,
        DropZone::Left => Rect::from_min_size(bounds.min, vec2(half.x, bounds.height())),
        DropZone::Right => Rect::from_min_size(
            pos2(bounds.min.x + half.x, bounds.min.y),
            vec2(half.x, bounds.height()),
        ),
        DropZone::Top => Rect::from_min_size(bounds.min, vec2(bounds.width(), half.y)),
        DropZone::Bottom => Rect::from_min_size(
            pos2(bounds.min.x, bounds.min.y + half.y),
            vec2(bounds.width(), half.y),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> Rect {
        Rect::from_min_size(pos2(0.0, 0.0), vec2(1000.0, 600.0))
    }

    #[test]
    fn zones_of_reference_pane() {
        let opt = DockOptions::default();
        assert_eq!(classify_zone(bounds(), pos2(10.0, 300.0), &opt), DropZone::Left);
        assert_eq!(classify_zone(bounds(), pos2(990.0, 300.0), &opt), DropZone::Right);
        assert_eq!(classify_zone(bounds(), pos2(500.0, 10.0), &opt), DropZone::Top);
        assert_eq!(classify_zone(bounds(), pos2(500.0, 590.0), &opt), DropZone::Bottom);
        assert_eq!(classify_zone(bounds(), pos2(500.0, 300.0), &opt), DropZone::Center);
    }

    #[test]
    fn left_and_right_win_over_top_and_bottom_in_corners() {
        let opt = DockOptions::default();
        assert_eq!(classify_zone(bounds(), pos2(5.0, 5.0), &opt), DropZone::Left);
        assert_eq!(classify_zone(bounds(), pos2(995.0, 595.0), &opt), DropZone::Right);
    }

    #[test]
    fn classification_is_pure() {
        let opt = DockOptions::default();
        let p = pos2(123.0, 456.0);
        let first = classify_zone(bounds(), p, &opt);
        for _ in 0..3 {
            assert_eq!(classify_zone(bounds(), p, &opt), first);
        }
    }

    #[test]
    fn band_respects_min_and_max() {
        let opt = DockOptions::default();
        assert_eq!(edge_band(1000.0, &opt), 250.0);
        assert_eq!(edge_band(120.0, &opt), 40.0, "min size wins over fraction");
        assert_eq!(edge_band(50.0, &opt), 20.0, "max fraction wins over min size");
    }

    #[test]
    fn degenerate_pane_accepts_nothing() {
        let opt = DockOptions::default();
        let thin = Rect::from_min_size(pos2(0.0, 0.0), vec2(0.5, 100.0));
        assert_eq!(classify_zone(thin, pos2(0.2, 50.0), &opt), DropZone::None);
    }

    #[test]
    fn highlight_halves() {
        let b = Rect::from_min_size(pos2(100.0, 50.0), vec2(400.0, 200.0));
        assert_eq!(
            highlight_rect(b, DropZone::Left),
            Rect::from_min_size(pos2(100.0, 50.0), vec2(200.0, 200.0))
        );
        assert_eq!(
            highlight_rect(b, DropZone::Right),
            Rect::from_min_size(pos2(300.0, 50.0), vec2(200.0, 200.0))
        );
        assert_eq!(
            highlight_rect(b, DropZone::Bottom),
            Rect::from_min_size(pos2(100.0, 150.0), vec2(400.0, 100.0))
        );
        assert_eq!(highlight_rect(b, DropZone::Center), b);
        assert_eq!(highlight_rect(b, DropZone::None), Rect::ZERO);
    }

    #[test]
    fn zone_split_semantics() {
        assert_eq!(DropZone::Left.split_direction(), Some(SplitDirection::Horizontal));
        assert_eq!(DropZone::Bottom.split_direction(), Some(SplitDirection::Vertical));
        assert_eq!(DropZone::Center.split_direction(), None);
        assert!(DropZone::Top.is_before());
        assert!(!DropZone::Right.is_before());
        assert!(!DropZone::Center.is_edge());
    }
}
