//! Reference-frame coordinate math
//!
//! Overlay geometry is stored in a fixed 800x450 reference frame and
//! projected onto the actual render surface at display time. All
//! functions here are pure.

use super::Overlay;

/// Width of the logical coordinate space overlays are stored in.
pub const REFERENCE_WIDTH: f32 = 800.0;
/// Height of the logical coordinate space overlays are stored in.
pub const REFERENCE_HEIGHT: f32 = 450.0;
/// Scaled font sizes never drop below this, to stay legible.
pub const MIN_FONT_SIZE: f32 = 12.0;

/// Which axis a scalar value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    fn reference_size(self) -> f32 {
        match self {
            Axis::X => REFERENCE_WIDTH,
            Axis::Y => REFERENCE_HEIGHT,
        }
    }

    fn surface_size(self, surface: SurfaceSize) -> f32 {
        match self {
            Axis::X => surface.width,
            Axis::Y => surface.height,
        }
    }
}

/// Current render-surface dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSize {
    pub width: f32,
    pub height: f32,
}

impl SurfaceSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// An overlay's derived on-screen geometry in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub font_size: f32,
}

/// Convert a reference-frame value to screen pixels.
pub fn to_screen(value: f32, axis: Axis, surface: SurfaceSize) -> f32 {
    value * axis.surface_size(surface) / axis.reference_size()
}

/// Convert a screen-pixel value back to reference-frame units.
pub fn to_reference(value: f32, axis: Axis, surface: SurfaceSize) -> f32 {
    value * axis.reference_size() / axis.surface_size(surface)
}

/// Scale a reference-frame font size for the given surface.
///
/// Uses the width ratio only and floors at [`MIN_FONT_SIZE`].
pub fn scale_font(font_size: f32, surface: SurfaceSize) -> f32 {
    let scaled = font_size * surface.width / REFERENCE_WIDTH;
    scaled.max(MIN_FONT_SIZE)
}

/// Project an overlay's stored geometry onto a render surface.
pub fn project(overlay: &Overlay, surface: SurfaceSize) -> ScreenRect {
    ScreenRect {
        x: to_screen(overlay.x, Axis::X, surface),
        y: to_screen(overlay.y, Axis::Y, surface),
        width: to_screen(overlay.width, Axis::X, surface),
        height: to_screen(overlay.height, Axis::Y, surface),
        font_size: scale_font(overlay.font_size, surface),
    }
}
