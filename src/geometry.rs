use egui::{Pos2, Rect, pos2, vec2};

use crate::pane::SplitDirection;

/// Half-open containment: `min <= p < max` on both axes.
///
/// Adjacent rects therefore never both claim a point on their shared edge.
pub(crate) fn contains(rect: Rect, pos: Pos2) -> bool {
    rect.min.x <= pos.x && pos.x < rect.max.x && rect.min.y <= pos.y && pos.y < rect.max.y
}

pub(crate) fn has_area(rect: Rect) -> bool {
    rect.width() > 0.0 && rect.height() > 0.0
}

/// Partition `bounds` along `direction` at `ratio`, leaving a `gutter` wide gap centered on the
/// split line. Child extents are floored at zero.
pub(crate) fn split_rect(
    bounds: Rect,
    direction: SplitDirection,
    ratio: f32,
    gutter: f32,
) -> (Rect, Rect) {
    let half = gutter * 0.5;
    match direction {
        SplitDirection::Horizontal => {
            let split_x = bounds.min.x + bounds.width() * ratio;
            let first_w = (split_x - bounds.min.x - half).max(0.0);
            let second_x = split_x + half;
            let second_w = (bounds.max.x - second_x).max(0.0);
            (
                Rect::from_min_size(bounds.min, vec2(first_w, bounds.height())),
                Rect::from_min_size(pos2(second_x, bounds.min.y), vec2(second_w, bounds.height())),
            )
        }
        SplitDirection::Vertical => {
            let split_y = bounds.min.y + bounds.height() * ratio;
            let first_h = (split_y - bounds.min.y - half).max(0.0);
            let second_y = split_y + half;
            let second_h = (bounds.max.y - second_y).max(0.0);
            (
                Rect::from_min_size(bounds.min, vec2(bounds.width(), first_h)),
                Rect::from_min_size(pos2(bounds.min.x, second_y), vec2(bounds.width(), second_h)),
            )
        }
    }
}

/// The gutter strip of a split.
pub(crate) fn splitter_rect(
    bounds: Rect,
    direction: SplitDirection,
    ratio: f32,
    width: f32,
) -> Rect {
    let half = width * 0.5;
    match direction {
        SplitDirection::Horizontal => {
            let split_x = bounds.min.x + bounds.width() * ratio;
            Rect::from_min_size(pos2(split_x - half, bounds.min.y), vec2(width, bounds.height()))
        }
        SplitDirection::Vertical => {
            let split_y = bounds.min.y + bounds.height() * ratio;
            Rect::from_min_size(pos2(bounds.min.x, split_y - half), vec2(bounds.width(), width))
        }
    }
}

/// The gutter strip widened by `tolerance` on both sides, across the split axis only.
pub(crate) fn splitter_hit_rect(gutter: Rect, direction: SplitDirection, tolerance: f32) -> Rect {
    match direction {
        SplitDirection::Horizontal => gutter.expand2(vec2(tolerance, 0.0)),
        SplitDirection::Vertical => gutter.expand2(vec2(0.0, tolerance)),
    }
}

pub(crate) fn tab_strip(bounds: Rect, tab_height: f32) -> Rect {
    Rect::from_min_size(bounds.min, vec2(bounds.width(), tab_height.min(bounds.height()).max(0.0)))
}

pub(crate) fn below_tab_strip(bounds: Rect, tab_height: f32) -> Rect {
    Rect::from_min_size(
        pos2(bounds.min.x, bounds.min.y + tab_height),
        vec2(bounds.width(), (bounds.height() - tab_height).max(0.0)),
    )
}

/// Position of `pos` along the axis a split in `direction` divides.
pub(crate) fn axis_coord(pos: Pos2, direction: SplitDirection) -> f32 {
    match direction {
        SplitDirection::Horizontal => pos.x,
        SplitDirection::Vertical => pos.y,
    }
}

/// `(origin, extent)` of `rect` along the axis a split in `direction` divides.
pub(crate) fn axis_span(rect: Rect, direction: SplitDirection) -> (f32, f32) {
    match direction {
        SplitDirection::Horizontal => (rect.min.x, rect.width()),
        SplitDirection::Vertical => (rect.min.y, rect.height()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas() -> Rect {
        Rect::from_min_size(pos2(0.0, 0.0), vec2(1000.0, 600.0))
    }

    #[test]
    fn horizontal_split_leaves_gutter() {
        let (a, b) = split_rect(canvas(), SplitDirection::Horizontal, 0.5, 6.0);
        assert_eq!(a, Rect::from_min_size(pos2(0.0, 0.0), vec2(497.0, 600.0)));
        assert_eq!(b, Rect::from_min_size(pos2(503.0, 0.0), vec2(497.0, 600.0)));
    }

    #[test]
    fn vertical_split_leaves_gutter() {
        let (a, b) = split_rect(canvas(), SplitDirection::Vertical, 0.25, 6.0);
        assert_eq!(a.height(), 147.0);
        assert_eq!(b.min.y, 153.0);
        assert_eq!(b.max.y, 600.0);
        assert_eq!(a.width(), 1000.0);
    }

    #[test]
    fn degenerate_split_floors_at_zero() {
        let tiny = Rect::from_min_size(pos2(0.0, 0.0), vec2(4.0, 4.0));
        let (a, b) = split_rect(tiny, SplitDirection::Horizontal, 0.05, 6.0);
        assert_eq!(a.width(), 0.0);
        assert!(b.width() >= 0.0);
    }

    #[test]
    fn splitter_rect_is_centered_on_split_line() {
        let gutter = splitter_rect(canvas(), SplitDirection::Horizontal, 0.5, 6.0);
        assert_eq!(gutter, Rect::from_min_size(pos2(497.0, 0.0), vec2(6.0, 600.0)));

        let hit = splitter_hit_rect(gutter, SplitDirection::Horizontal, 4.0);
        assert_eq!(hit.min.x, 493.0);
        assert_eq!(hit.max.x, 507.0);
        assert_eq!(hit.height(), 600.0);
    }

    #[test]
    fn containment_is_half_open() {
        let r = Rect::from_min_size(pos2(0.0, 0.0), vec2(10.0, 10.0));
        assert!(contains(r, pos2(0.0, 0.0)));
        assert!(contains(r, pos2(9.9, 9.9)));
        assert!(!contains(r, pos2(10.0, 5.0)));
        assert!(!contains(r, pos2(5.0, 10.0)));
    }
}
