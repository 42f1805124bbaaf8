//! Overlay model and interaction
//!
//! Overlays are text or image elements positioned on top of the video.
//! All stored geometry lives in a fixed reference frame (800x450);
//! on-screen pixel geometry is derived at render time from the current
//! surface size. The caller owns the overlay collection; the canvas
//! keeps a transient shadow copy only while a drag is in progress.

pub mod canvas;
pub mod coords;
pub mod drag;
pub mod store;

pub use canvas::OverlayCanvas;
pub use coords::{Axis, ScreenRect, SurfaceSize};
pub use drag::DragController;
pub use store::{MemoryOverlayStore, OverlayStore};

use serde::{Deserialize, Serialize};

/// Overlay element kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayKind {
    Text,
    Image,
}

/// A positioned overlay element
///
/// Geometry fields are in reference-frame units. `content` holds the
/// text for text overlays and the image URL for image overlays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    /// Assigned by the persistence collaborator; absent until created
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(rename = "type")]
    pub kind: OverlayKind,

    pub content: String,

    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,

    /// Only meaningful for text overlays
    #[serde(rename = "fontSize", default = "default_font_size")]
    pub font_size: f32,

    /// Only meaningful for text overlays
    #[serde(default = "default_color")]
    pub color: String,
}

fn default_font_size() -> f32 {
    16.0
}

fn default_color() -> String {
    "#ffffff".to_string()
}

impl Overlay {
    /// New text overlay with default placement, no id yet.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            id: None,
            kind: OverlayKind::Text,
            content: content.into(),
            x: 50.0,
            y: 50.0,
            width: 200.0,
            height: 50.0,
            font_size: default_font_size(),
            color: default_color(),
        }
    }

    /// New image overlay with default placement, no id yet.
    pub fn image(url: impl Into<String>) -> Self {
        Self {
            id: None,
            kind: OverlayKind::Image,
            content: url.into(),
            x: 50.0,
            y: 50.0,
            width: 100.0,
            height: 50.0,
            font_size: default_font_size(),
            color: default_color(),
        }
    }
}

/// Partial overlay update sent to the persistence collaborator
///
/// Only the fields that are `Some` are applied. Drag persistence sends
/// `{x, y}` only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverlayPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    #[serde(rename = "fontSize", skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl OverlayPatch {
    /// Position-only patch, as produced by a drag.
    pub fn position(x: f32, y: f32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Default::default()
        }
    }

    /// Apply this patch to an overlay in place.
    pub fn apply_to(&self, overlay: &mut Overlay) {
        if let Some(content) = &self.content {
            overlay.content = content.clone();
        }
        if let Some(x) = self.x {
            overlay.x = x;
        }
        if let Some(y) = self.y {
            overlay.y = y;
        }
        if let Some(width) = self.width {
            overlay.width = width;
        }
        if let Some(height) = self.height {
            overlay.height = height;
        }
        if let Some(font_size) = self.font_size {
            overlay.font_size = font_size;
        }
        if let Some(color) = &self.color {
            overlay.color = color.clone();
        }
    }
}
