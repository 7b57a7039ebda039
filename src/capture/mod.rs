//! Screen capture seam
//!
//! The session never grabs pixels itself. A [`ScreenCapturer`] supplied by
//! the host turns a capture rectangle into a bitmap; [`FrameCapturer`] is the
//! built-in implementation that crops a frame grabbed ahead of time (the
//! frozen screen the selection overlay is shown over).

pub mod image;

use ::image::RgbaImage;

use self::image::ScreenshotImage;
use crate::domain::Rect;

/// Produces the pixels under a rectangle of the target display
pub trait ScreenCapturer {
    /// Capture `rect`, given in top-left-origin logical display coordinates.
    ///
    /// `scale` is the display's pixel density; the returned image may be
    /// larger than `rect` by that factor.
    fn capture(&mut self, rect: Rect, scale: f32) -> anyhow::Result<RgbaImage>;
}

/// Capturer that crops a previously grabbed full-display frame
#[derive(Clone, Debug)]
pub struct FrameCapturer {
    frame: ScreenshotImage,
}

impl FrameCapturer {
    pub fn new(frame: ScreenshotImage) -> Self {
        Self { frame }
    }

    pub fn frame(&self) -> &ScreenshotImage {
        &self.frame
    }
}

impl ScreenCapturer for FrameCapturer {
    fn capture(&mut self, rect: Rect, _scale: f32) -> anyhow::Result<RgbaImage> {
        // The frame's own pixel density wins over the reported one
        self.frame.crop(rect).ok_or_else(|| {
            anyhow::anyhow!(
                "capture rect {}x{} at ({}, {}) is outside the {}x{} frame",
                rect.width,
                rect.height,
                rect.x,
                rect.y,
                self.frame.width(),
                self.frame.height()
            )
        })
    }
}
