//! Shared geometry calculations for annotations
//!
//! Constants and math shared between tool path building and rendering.

use crate::domain::{PathSegment, Point, Rect};

/// Arrow geometry constants
pub mod arrow {
    use crate::domain::Point;

    /// Arrowhead angle from shaft in radians (30 degrees)
    pub const HEAD_ANGLE: f32 = std::f32::consts::FRAC_PI_6;

    /// Arrowhead length for a given stroke width
    pub fn head_length(stroke_width: f32) -> f32 {
        stroke_width * 5.0 + 10.0
    }

    /// Calculate the two arrowhead end points for a shaft from `start` to `end`.
    ///
    /// Each head line leaves `end` pointing back along the shaft, rotated by
    /// ±`HEAD_ANGLE`. A zero-length shaft points its head along +x.
    pub fn head_points(start: Point, end: Point, head_length: f32) -> (Point, Point) {
        let angle = (end.y - start.y).atan2(end.x - start.x);
        let head = |offset: f32| {
            Point::new(
                end.x - head_length * (angle + offset).cos(),
                end.y - head_length * (angle + offset).sin(),
            )
        };
        (head(-HEAD_ANGLE), head(HEAD_ANGLE))
    }
}

/// Shape (rectangle/ellipse) geometry constants
pub mod shape {
    /// Ellipse bezier approximation constant: 4/3 * (sqrt(2) - 1)
    pub const BEZIER_K: f32 = 0.552_284_8;
}

/// Highlighter constants
pub mod marker {
    /// Committed width multiplier over the configured stroke width
    pub const WIDTH_FACTOR: f32 = 4.0;
    /// Stroke opacity
    pub const ALPHA: f32 = 0.4;
}

/// Text annotation constants
pub mod text {
    /// Glyph size in logical units
    pub const FONT_SIZE: f32 = 16.0;
}

/// Closed rectangle outline path, counter-clockwise from the origin corner
pub fn rect_path(rect: Rect) -> Vec<PathSegment> {
    let [bl, br, tl, tr] = rect.corners();
    vec![
        PathSegment::MoveTo(bl),
        PathSegment::LineTo(br),
        PathSegment::LineTo(tr),
        PathSegment::LineTo(tl),
        PathSegment::Close,
    ]
}

/// Ellipse inscribed in `rect`, built from four cubic bezier quarter arcs.
///
/// All control points stay inside `rect`, so the path's bounding box is `rect`.
pub fn ellipse_path(rect: Rect) -> Vec<PathSegment> {
    let (cx, cy) = (rect.mid_x(), rect.mid_y());
    let (rx, ry) = (rect.width * 0.5, rect.height * 0.5);
    let kx = rx * shape::BEZIER_K;
    let ky = ry * shape::BEZIER_K;

    vec![
        // Start at top
        PathSegment::MoveTo(Point::new(cx, cy + ry)),
        // Top to right
        PathSegment::CubicTo(
            Point::new(cx + kx, cy + ry),
            Point::new(cx + rx, cy + ky),
            Point::new(cx + rx, cy),
        ),
        // Right to bottom
        PathSegment::CubicTo(
            Point::new(cx + rx, cy - ky),
            Point::new(cx + kx, cy - ry),
            Point::new(cx, cy - ry),
        ),
        // Bottom to left
        PathSegment::CubicTo(
            Point::new(cx - kx, cy - ry),
            Point::new(cx - rx, cy - ky),
            Point::new(cx - rx, cy),
        ),
        // Left to top
        PathSegment::CubicTo(
            Point::new(cx - rx, cy + ky),
            Point::new(cx - kx, cy + ry),
            Point::new(cx, cy + ry),
        ),
        PathSegment::Close,
    ]
}

/// Rounded rectangle path with quarter-circle corners of `radius`
pub fn rounded_rect_path(rect: Rect, radius: f32) -> Vec<PathSegment> {
    let r = radius.min(rect.width * 0.5).min(rect.height * 0.5).max(0.0);
    let k = r * shape::BEZIER_K;
    let (x0, y0, x1, y1) = (rect.min_x(), rect.min_y(), rect.max_x(), rect.max_y());

    vec![
        PathSegment::MoveTo(Point::new(x0 + r, y0)),
        PathSegment::LineTo(Point::new(x1 - r, y0)),
        PathSegment::CubicTo(
            Point::new(x1 - r + k, y0),
            Point::new(x1, y0 + r - k),
            Point::new(x1, y0 + r),
        ),
        PathSegment::LineTo(Point::new(x1, y1 - r)),
        PathSegment::CubicTo(
            Point::new(x1, y1 - r + k),
            Point::new(x1 - r + k, y1),
            Point::new(x1 - r, y1),
        ),
        PathSegment::LineTo(Point::new(x0 + r, y1)),
        PathSegment::CubicTo(
            Point::new(x0 + r - k, y1),
            Point::new(x0, y1 - r + k),
            Point::new(x0, y1 - r),
        ),
        PathSegment::LineTo(Point::new(x0, y0 + r)),
        PathSegment::CubicTo(
            Point::new(x0, y0 + r - k),
            Point::new(x0 + r - k, y0),
            Point::new(x0 + r, y0),
        ),
        PathSegment::Close,
    ]
}

/// Circle approximated the same way as [`ellipse_path`]
pub fn circle_path(center: Point, radius: f32) -> Vec<PathSegment> {
    ellipse_path(Rect::new(
        center.x - radius,
        center.y - radius,
        radius * 2.0,
        radius * 2.0,
    ))
}
