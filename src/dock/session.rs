use egui::Pos2;

use super::drop_target::DropTarget;
use crate::pane::{ContentId, PaneId};

/// Drag-to-dock state. A drag always knows what it carries and where it came from.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(super) enum DragSession {
    #[default]
    Idle,
    Active(ActiveDrag),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct ActiveDrag {
    pub content: ContentId,
    pub source_pane: PaneId,
    pub pointer: Pos2,
    pub last_target: DropTarget,
}

impl DragSession {
    /// Idle -> Active. Returns a log line, or `None` if a drag is already running.
    pub(super) fn begin(
        &mut self,
        content: ContentId,
        source_pane: PaneId,
        pointer: Pos2,
    ) -> Option<String> {
        if self.is_active() {
            return None;
        }
        *self = Self::Active(ActiveDrag {
            content,
            source_pane,
            pointer,
            last_target: DropTarget::NONE,
        });
        Some(format!("drag START {content} from {source_pane}"))
    }

    pub(super) fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }

    pub(super) fn active(&self) -> Option<&ActiveDrag> {
        match self {
            Self::Active(drag) => Some(drag),
            Self::Idle => None,
        }
    }

    pub(super) fn active_mut(&mut self) -> Option<&mut ActiveDrag> {
        match self {
            Self::Active(drag) => Some(drag),
            Self::Idle => None,
        }
    }

    /// Active -> Idle, handing back the finished drag.
    pub(super) fn finish(&mut self) -> Option<ActiveDrag> {
        match std::mem::take(self) {
            Self::Active(drag) => Some(drag),
            Self::Idle => None,
        }
    }
}
