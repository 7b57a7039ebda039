//! Per-tool path building
//!
//! Each tool knows how to start an annotation at the pointer-down location
//! and how to update it for a new pointer position. Shape tools rebuild
//! from the anchor on every update; freehand tools append.

use crate::config::ShapeColor;
use crate::domain::{Annotation, PathSegment, Point, Rect, Tool};
use crate::render::geometry::{self, arrow, marker};

impl Tool {
    /// Begin a new annotation at `point` with the current color and width
    pub fn start_path(self, point: Point, color: ShapeColor, stroke_width: f32) -> Annotation {
        let (path, stroke_width, text) = match self {
            // The arrow has nothing to draw until the pointer moves
            Tool::Arrow => (Vec::new(), stroke_width, None),
            Tool::Marker => (
                vec![PathSegment::MoveTo(point)],
                stroke_width * marker::WIDTH_FACTOR,
                None,
            ),
            Tool::Text => (vec![PathSegment::MoveTo(point)], stroke_width, Some(String::new())),
            Tool::Rectangle | Tool::Ellipse | Tool::Line | Tool::Pencil => {
                (vec![PathSegment::MoveTo(point)], stroke_width, None)
            }
        };

        Annotation {
            tool: self,
            anchor: point,
            path,
            color,
            stroke_width,
            text,
        }
    }

    /// Update an in-progress annotation for the pointer now at `point`
    pub fn update_path(self, annotation: &mut Annotation, point: Point) {
        let anchor = annotation.anchor;
        match self {
            Tool::Arrow => annotation.path = arrow_path(anchor, point, annotation.stroke_width),
            Tool::Rectangle => annotation.path = geometry::rect_path(Rect::spanning(anchor, point)),
            Tool::Ellipse => {
                annotation.path = geometry::ellipse_path(Rect::spanning(anchor, point));
            }
            Tool::Line => {
                annotation.path = vec![PathSegment::MoveTo(anchor), PathSegment::LineTo(point)];
            }
            Tool::Pencil | Tool::Marker => annotation.path.push(PathSegment::LineTo(point)),
            // Text is placed, not dragged
            Tool::Text => {}
        }
    }
}

/// Shaft from `start` to `end` plus two head strokes leaving the tip.
///
/// Head length grows with the stroke width, so the head is recomputed from
/// scratch on every update.
fn arrow_path(start: Point, end: Point, stroke_width: f32) -> Vec<PathSegment> {
    let (head1, head2) = arrow::head_points(start, end, arrow::head_length(stroke_width));
    vec![
        PathSegment::MoveTo(start),
        PathSegment::LineTo(end),
        PathSegment::MoveTo(end),
        PathSegment::LineTo(head1),
        PathSegment::MoveTo(end),
        PathSegment::LineTo(head2),
    ]
}
