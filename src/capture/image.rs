//! Screenshot image type for captured screenshots

use image::RgbaImage;

use crate::domain::{Rect, Size};

/// A captured frame together with the logical area it covers
#[derive(Clone, Debug)]
pub struct ScreenshotImage {
    pub rgba: RgbaImage,
    logical: Size,
}

impl ScreenshotImage {
    /// Wrap a frame grabbed from a surface of `logical` size
    pub fn new(rgba: RgbaImage, logical: Size) -> Self {
        log::debug!(
            "ScreenshotImage captured: {}x{} pixels for {}x{} logical",
            rgba.width(),
            rgba.height(),
            logical.width,
            logical.height
        );
        Self { rgba, logical }
    }

    /// Get the width of the image
    pub fn width(&self) -> u32 {
        self.rgba.width()
    }

    /// Get the height of the image
    pub fn height(&self) -> u32 {
        self.rgba.height()
    }

    pub fn logical_size(&self) -> Size {
        self.logical
    }

    /// Pixels per logical unit along each axis
    pub fn scale(&self) -> (f64, f64) {
        (
            self.rgba.width() as f64 / self.logical.width as f64,
            self.rgba.height() as f64 / self.logical.height as f64,
        )
    }

    /// Copy out the pixels under `rect`, given in top-left-origin logical units.
    ///
    /// The rect is clipped to the frame; `None` when nothing is left.
    pub fn crop(&self, rect: Rect) -> Option<RgbaImage> {
        let (width_scale, height_scale) = self.scale();
        let to_px = |v: f32, scale: f64, max: u32| {
            ((v as f64 * scale).round().max(0.) as u32).min(max)
        };

        let left = to_px(rect.min_x(), width_scale, self.width());
        let top = to_px(rect.min_y(), height_scale, self.height());
        let right = to_px(rect.max_x(), width_scale, self.width());
        let bottom = to_px(rect.max_y(), height_scale, self.height());
        if right <= left || bottom <= top {
            return None;
        }

        Some(
            image::imageops::crop_imm(&self.rgba, left, top, right - left, bottom - top)
                .to_image(),
        )
    }
}
