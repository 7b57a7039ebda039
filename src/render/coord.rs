//! Mapping between logical surface coordinates and raster pixels
//!
//! Logical space is bottom-left origin with y up (the interaction surface
//! convention). Raster space is top-left origin with y down, scaled by the
//! backing pixel density.

use tiny_skia::Transform;

use crate::domain::{Point, Size};

/// A logical frame backed by a pixel raster of a given size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasFrame {
    logical: Size,
    pixel_width: u32,
    pixel_height: u32,
}

impl CanvasFrame {
    /// Frame whose raster exactly covers `logical` at `pixel_width x pixel_height`.
    ///
    /// A degenerate logical size falls back to one logical unit per pixel.
    pub fn new(logical: Size, pixel_width: u32, pixel_height: u32) -> Self {
        let logical = if logical.width > 0.0 && logical.height > 0.0 {
            logical
        } else {
            Size::new(pixel_width as f32, pixel_height as f32)
        };
        Self {
            logical,
            pixel_width,
            pixel_height,
        }
    }

    /// Frame for a logical size rendered at a uniform pixel density
    pub fn with_scale(logical: Size, scale: f32) -> Self {
        let scale = if scale > 0.0 { scale } else { 1.0 };
        Self::new(
            logical,
            (logical.width * scale).round().max(1.0) as u32,
            (logical.height * scale).round().max(1.0) as u32,
        )
    }

    pub fn logical_size(&self) -> Size {
        self.logical
    }

    pub fn pixel_width(&self) -> u32 {
        self.pixel_width
    }

    pub fn pixel_height(&self) -> u32 {
        self.pixel_height
    }

    /// Pixels per logical unit along each axis
    pub fn scale(&self) -> (f32, f32) {
        (
            self.pixel_width as f32 / self.logical.width,
            self.pixel_height as f32 / self.logical.height,
        )
    }

    /// Transform from logical coordinates to raster pixels
    pub fn transform(&self) -> Transform {
        let (sx, sy) = self.scale();
        Transform::from_row(sx, 0.0, 0.0, -sy, 0.0, self.pixel_height as f32)
    }

    /// Logical point to raster pixel position
    pub fn to_pixel(&self, p: Point) -> (f32, f32) {
        let (sx, sy) = self.scale();
        (p.x * sx, (self.logical.height - p.y) * sy)
    }

    /// Raster pixel position to logical point
    pub fn to_logical(&self, px: f32, py: f32) -> Point {
        let (sx, sy) = self.scale();
        Point::new(px / sx, self.logical.height - py / sy)
    }
}
