//! Drag interaction over the display surface.

/// Where a drag event was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventLevel {
    /// The whole window or page.
    Surface,
    /// The image drop target inside it.
    Target,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragEvent {
    Enter,
    Over,
    Leave,
    Drop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    /// A file is hovering the target; only drives the drop overlay.
    DragHover,
    /// Released on the target, ingestion pending dispatch.
    Dropped,
}

/// What the host must do with the platform event. Both flags are always set:
/// letting a drop through would make the host open the file itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventDisposition {
    pub prevent_default: bool,
    pub stop_propagation: bool,
}

impl EventDisposition {
    const SUPPRESS: Self = Self {
        prevent_default: true,
        stop_propagation: true,
    };
}

#[derive(Debug, Clone, Default)]
pub struct DropZone {
    state: DragState,
}

impl DropZone {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    /// True while the drop overlay should be shown.
    pub fn is_highlighted(&self) -> bool {
        self.state == DragState::DragHover
    }

    /// Feeds one drag event. Surface-level events never change state.
    pub fn handle(&mut self, level: EventLevel, event: DragEvent) -> EventDisposition {
        if level == EventLevel::Target {
            self.state = match (self.state, event) {
                (DragState::Idle | DragState::DragHover, DragEvent::Enter | DragEvent::Over) => {
                    DragState::DragHover
                }
                (DragState::DragHover, DragEvent::Leave) => DragState::Idle,
                (DragState::Idle | DragState::DragHover, DragEvent::Drop) => DragState::Dropped,
                (state, _) => state,
            };
        }
        EventDisposition::SUPPRESS
    }

    /// Returns to idle once the dropped files have been dispatched.
    pub fn finish_drop(&mut self) {
        if self.state == DragState::Dropped {
            self.state = DragState::Idle;
        }
    }
}
