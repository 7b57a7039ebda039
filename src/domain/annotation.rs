//! Annotation types for drawing on screenshots
//!
//! All annotation geometry is stored in canvas logical coordinates
//! (bottom-left origin, y up), independent of the captured image's pixel scale.

use serde::{Deserialize, Serialize};

use super::geometry::{Point, Rect};
use crate::config::ShapeColor;

/// Drawing tool, the closed set of annotation kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Tool {
    #[default]
    Arrow,
    Rectangle,
    Ellipse,
    Line,
    Pencil,
    Marker,
    Text,
}

impl Tool {
    /// Every tool, in toolbar order
    pub const ALL: [Tool; 7] = [
        Tool::Arrow,
        Tool::Rectangle,
        Tool::Ellipse,
        Tool::Line,
        Tool::Pencil,
        Tool::Marker,
        Tool::Text,
    ];

    /// Get the icon name for this tool
    pub fn icon_name(self) -> &'static str {
        match self {
            Tool::Arrow => "arrow-symbolic",
            Tool::Rectangle => "square-symbolic",
            Tool::Ellipse => "circle-symbolic",
            Tool::Line => "line-symbolic",
            Tool::Pencil => "pencil-symbolic",
            Tool::Marker => "highlighter-symbolic",
            Tool::Text => "text-symbolic",
        }
    }

    /// Get the tooltip text for this tool
    pub fn tooltip(self) -> &'static str {
        match self {
            Tool::Arrow => "Arrow",
            Tool::Rectangle => "Rectangle",
            Tool::Ellipse => "Ellipse",
            Tool::Line => "Line",
            Tool::Pencil => "Pencil",
            Tool::Marker => "Highlighter",
            Tool::Text => "Text",
        }
    }

    /// Freehand tools accumulate points instead of rebuilding their shape
    pub fn is_freehand(self) -> bool {
        matches!(self, Tool::Pencil | Tool::Marker)
    }

    /// Whether the tool is driven by a drag gesture
    pub fn is_drag(self) -> bool {
        !matches!(self, Tool::Text)
    }
}

/// One command of an annotation's stroke path
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    MoveTo(Point),
    LineTo(Point),
    CubicTo(Point, Point, Point),
    Close,
}

impl PathSegment {
    /// End point of the segment, if it has one
    pub fn end_point(&self) -> Option<Point> {
        match *self {
            PathSegment::MoveTo(p) | PathSegment::LineTo(p) | PathSegment::CubicTo(_, _, p) => {
                Some(p)
            }
            PathSegment::Close => None,
        }
    }
}

/// A single drawn shape, either committed or in progress
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// Tool that produced this annotation
    pub tool: Tool,
    /// Pointer-down location the shape is rebuilt from
    pub anchor: Point,
    /// Stroke geometry; text annotations hold a single move to the anchor
    pub path: Vec<PathSegment>,
    /// Stroke (or glyph) color
    pub color: ShapeColor,
    /// Stroke width in logical units, already adjusted for the tool
    pub stroke_width: f32,
    /// Text payload, only set for text annotations
    pub text: Option<String>,
}

impl Annotation {
    /// Every point referenced by the path, control points included
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.path.iter().flat_map(|segment| {
            let pts: [Option<Point>; 3] = match *segment {
                PathSegment::MoveTo(p) | PathSegment::LineTo(p) => [Some(p), None, None],
                PathSegment::CubicTo(c1, c2, p) => [Some(c1), Some(c2), Some(p)],
                PathSegment::Close => [None, None, None],
            };
            pts.into_iter().flatten()
        })
    }

    /// Bounding box of the stroke path, ignoring stroke width
    pub fn bounds(&self) -> Option<Rect> {
        Rect::bounding(self.points())
    }

    /// Whether the annotation would leave a visible mark.
    ///
    /// Arrows measure their shaft only: a zero-length drag still produces
    /// head segments, but no meaningful arrow.
    pub fn has_extent(&self) -> bool {
        match self.tool {
            Tool::Text => self.text.as_deref().is_some_and(|t| !t.trim().is_empty()),
            Tool::Arrow => match self.path.get(1) {
                Some(PathSegment::LineTo(tip)) => tip.distance(self.anchor) > 0.0,
                _ => false,
            },
            _ => self
                .bounds()
                .is_some_and(|b| b.width > 0.0 || b.height > 0.0),
        }
    }

    /// Check if this annotation is rendered as glyphs rather than a stroke
    pub fn is_text(&self) -> bool {
        self.tool == Tool::Text
    }
}
