//! Pointer-drag state machine
//!
//! Tracks at most one active drag session at a time: idle until a
//! pointer goes down on an overlay, then dragging until release.

/// An active drag against one overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    /// The overlay being dragged. Overlays without an id cannot be
    /// dragged, they have no persistence target yet.
    pub overlay_id: String,
    /// Pointer position minus the overlay's on-screen origin at drag
    /// start, in screen pixels.
    pub offset_x: f32,
    pub offset_y: f32,
}

/// Drag interaction state: idle or one active session.
#[derive(Debug, Default)]
pub struct DragController {
    active: Option<DragSession>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a drag on an overlay. Returns false if a drag is already
    /// active or the overlay has no id.
    pub fn begin(&mut self, overlay_id: Option<&str>, offset_x: f32, offset_y: f32) -> bool {
        if self.active.is_some() {
            return false;
        }
        match overlay_id {
            Some(id) => {
                self.active = Some(DragSession {
                    overlay_id: id.to_string(),
                    offset_x,
                    offset_y,
                });
                true
            }
            None => false,
        }
    }

    /// End the active drag, if any.
    pub fn end(&mut self) -> Option<DragSession> {
        self.active.take()
    }

    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    /// Id of the overlay being dragged, if a drag is active.
    pub fn dragged_id(&self) -> Option<&str> {
        self.active.as_ref().map(|s| s.overlay_id.as_str())
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.active.as_ref()
    }
}
