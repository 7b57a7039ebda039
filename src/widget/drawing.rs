//! Shared drawing utilities for overlay rendering
//!
//! These helpers draw in logical (y-up) coordinates onto a pixmap through a
//! [`CanvasFrame`], reusing the annotation path builders.

use tiny_skia::Pixmap;

use crate::config::ShapeColor;
use crate::domain::{Point, Rect};
use crate::render::coord::CanvasFrame;
use crate::render::geometry::{circle_path, rect_path, rounded_rect_path};
use crate::render::image::{fill_segments, stroke_segments};
use crate::render::text::TextRenderer;

/// Draw a dark overlay around a selection rectangle
///
/// This draws 4 rectangular strips (top, bottom, left, right) around
/// `selection` within `outer`, leaving the selection itself untouched so the
/// screen content shows through.
pub fn draw_dark_overlay_around_selection(
    pixmap: &mut Pixmap,
    frame: &CanvasFrame,
    outer: Rect,
    selection: Rect,
    opacity: f32,
) {
    let overlay = ShapeColor::BLACK.with_alpha(opacity);
    let transform = frame.transform();
    let mut fill = |rect: Rect| {
        if rect.width > 0.0 && rect.height > 0.0 {
            fill_segments(pixmap, &rect_path(rect), overlay, transform);
        }
    };

    // Bottom strip (full width)
    fill(Rect::new(
        outer.min_x(),
        outer.min_y(),
        outer.width,
        selection.min_y() - outer.min_y(),
    ));
    // Top strip (full width)
    fill(Rect::new(
        outer.min_x(),
        selection.max_y(),
        outer.width,
        outer.max_y() - selection.max_y(),
    ));
    // Left strip (between top and bottom)
    fill(Rect::new(
        outer.min_x(),
        selection.min_y(),
        selection.min_x() - outer.min_x(),
        selection.height,
    ));
    // Right strip (between top and bottom)
    fill(Rect::new(
        selection.max_x(),
        selection.min_y(),
        outer.max_x() - selection.max_x(),
        selection.height,
    ));
}

/// Draw a full-surface dark overlay
pub fn draw_dark_overlay(pixmap: &mut Pixmap, frame: &CanvasFrame, opacity: f32) {
    let size = frame.logical_size();
    fill_segments(
        pixmap,
        &rect_path(Rect::new(0.0, 0.0, size.width, size.height)),
        ShapeColor::BLACK.with_alpha(opacity),
        frame.transform(),
    );
}

/// Outline a selection rectangle and mark its corners with filled circles
pub fn draw_selection_frame_with_handles(
    pixmap: &mut Pixmap,
    frame: &CanvasFrame,
    selection: Rect,
    color: tiny_skia::Color,
    border_width: f32,
    handle_diameter: f32,
) {
    if selection.width <= 0.0 || selection.height <= 0.0 {
        return;
    }

    let transform = frame.transform();
    stroke_segments(pixmap, &rect_path(selection), color, border_width, transform);

    for corner in selection.corners() {
        fill_segments(
            pixmap,
            &circle_path(corner, handle_diameter / 2.0),
            color,
            transform,
        );
    }
}

/// Style of a text badge drawn on a rounded background
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BadgeStyle {
    pub font_size: f32,
    pub padding: f32,
    pub corner_radius: f32,
    pub background: tiny_skia::Color,
    pub foreground: tiny_skia::Color,
}

/// Draw `label` on a rounded background whose bottom edge is centered on `anchor`.
///
/// Returns the badge bounds, or `None` if no font was available.
pub fn draw_badge(
    pixmap: &mut Pixmap,
    frame: &CanvasFrame,
    anchor: Point,
    label: &str,
    style: &BadgeStyle,
    glyphs: Option<&TextRenderer>,
) -> Option<Rect> {
    let glyphs = glyphs?;
    let text_size = glyphs.measure(label, style.font_size);
    let bounds = Rect::new(
        anchor.x - text_size.width / 2.0 - style.padding,
        anchor.y,
        text_size.width + style.padding * 2.0,
        text_size.height + style.padding * 2.0,
    );

    let transform = frame.transform();
    fill_segments(
        pixmap,
        &rounded_rect_path(bounds, style.corner_radius),
        style.background,
        transform,
    );
    let origin = Point::new(bounds.x + style.padding, bounds.y + style.padding);
    fill_segments(
        pixmap,
        &glyphs.text_path(label, style.font_size, origin),
        style.foreground,
        transform,
    );
    Some(bounds)
}
