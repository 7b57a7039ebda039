//! Image rendering for annotations using tiny-skia
//!
//! These functions draw annotations onto a pixmap for both the live preview
//! and the flattened export, so the two can never drift apart.

use image::RgbaImage;
use tiny_skia::{
    ColorU8, FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform,
};

use super::coord::CanvasFrame;
use super::geometry::{marker, text};
use super::text::TextRenderer;
use crate::domain::{Annotation, PathSegment, Tool};

/// Copy an RgbaImage into a premultiplied pixmap
pub fn pixmap_from_rgba(img: &RgbaImage) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(img.width(), img.height())?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(img.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Some(pixmap)
}

/// Copy a pixmap back into a straight-alpha RgbaImage
pub fn rgba_from_pixmap(pixmap: &Pixmap) -> RgbaImage {
    let mut img = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in img.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = image::Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    img
}

/// Build a tiny-skia path from annotation segments
pub fn build_path(segments: &[PathSegment]) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    for segment in segments {
        match *segment {
            PathSegment::MoveTo(p) => pb.move_to(p.x, p.y),
            PathSegment::LineTo(p) => pb.line_to(p.x, p.y),
            PathSegment::CubicTo(c1, c2, p) => pb.cubic_to(c1.x, c1.y, c2.x, c2.y, p.x, p.y),
            PathSegment::Close => pb.close(),
        }
    }
    pb.finish()
}

fn paint_for(color: tiny_skia::Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color);
    paint.anti_alias = true;
    paint
}

/// Stroke segments with round caps and joins
pub fn stroke_segments(
    pixmap: &mut Pixmap,
    segments: &[PathSegment],
    color: tiny_skia::Color,
    width: f32,
    transform: Transform,
) {
    let Some(path) = build_path(segments) else {
        return;
    };
    let stroke = Stroke {
        width,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Default::default()
    };
    pixmap.stroke_path(&path, &paint_for(color), &stroke, transform, None);
}

/// Fill segments using the non-zero winding rule
pub fn fill_segments(
    pixmap: &mut Pixmap,
    segments: &[PathSegment],
    color: tiny_skia::Color,
    transform: Transform,
) {
    let Some(path) = build_path(segments) else {
        return;
    };
    pixmap.fill_path(&path, &paint_for(color), FillRule::Winding, transform, None);
}

/// Draw one annotation using its own stored color and width
pub fn draw_annotation(
    pixmap: &mut Pixmap,
    annotation: &Annotation,
    frame: &CanvasFrame,
    glyphs: Option<&TextRenderer>,
) {
    let transform = frame.transform();
    match annotation.tool {
        Tool::Text => {
            let (Some(content), Some(glyphs)) = (annotation.text.as_deref(), glyphs) else {
                return;
            };
            let outline = glyphs.text_path(content, text::FONT_SIZE, annotation.anchor);
            fill_segments(pixmap, &outline, annotation.color.into(), transform);
        }
        Tool::Marker => stroke_segments(
            pixmap,
            &annotation.path,
            annotation.color.with_alpha(marker::ALPHA),
            annotation.stroke_width,
            transform,
        ),
        _ => stroke_segments(
            pixmap,
            &annotation.path,
            annotation.color.into(),
            annotation.stroke_width,
            transform,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShapeColor;
    use crate::domain::{Point, Size};

    fn line(color: ShapeColor, from: Point, to: Point, width: f32) -> Annotation {
        Annotation {
            tool: Tool::Line,
            anchor: from,
            path: vec![PathSegment::MoveTo(from), PathSegment::LineTo(to)],
            color,
            stroke_width: width,
            text: None,
        }
    }

    #[test]
    fn test_pixmap_round_trip_preserves_opaque_pixels() {
        let img = RgbaImage::from_fn(4, 3, |x, y| {
            image::Rgba([x as u8 * 40, y as u8 * 60, 7, 255])
        });
        let pixmap = pixmap_from_rgba(&img).unwrap();
        assert_eq!(rgba_from_pixmap(&pixmap), img);
    }

    #[test]
    fn test_stroke_lands_in_flipped_frame() {
        // 20x20 logical at 1x; a horizontal line near the logical top
        let frame = CanvasFrame::new(Size::new(20.0, 20.0), 20, 20);
        let mut pixmap = Pixmap::new(20, 20).unwrap();
        let ann = line(
            ShapeColor::WHITE,
            Point::new(2.0, 17.5),
            Point::new(18.0, 17.5),
            3.0,
        );
        draw_annotation(&mut pixmap, &ann, &frame, None);

        let img = rgba_from_pixmap(&pixmap);
        // Logical y=17.5 is pixel row 2 (top area)
        assert_eq!(img.get_pixel(10, 2).0, [255, 255, 255, 255]);
        assert_eq!(img.get_pixel(10, 17).0[3], 0);
    }

    #[test]
    fn test_marker_is_translucent() {
        let frame = CanvasFrame::new(Size::new(20.0, 20.0), 20, 20);
        let mut pixmap = Pixmap::new(20, 20).unwrap();
        let mut ann = line(
            ShapeColor::BLACK,
            Point::new(2.0, 10.5),
            Point::new(18.0, 10.5),
            8.0,
        );
        ann.tool = Tool::Marker;
        draw_annotation(&mut pixmap, &ann, &frame, None);

        let alpha = pixmap.pixel(10, 9).unwrap().alpha();
        assert!((100..=104).contains(&alpha), "alpha was {alpha}");
    }

    #[test]
    fn test_stroke_width_scales_with_frame() {
        let frame = CanvasFrame::new(Size::new(10.0, 10.0), 40, 40);
        let mut pixmap = Pixmap::new(40, 40).unwrap();
        let ann = line(
            ShapeColor::WHITE,
            Point::new(0.0, 5.0),
            Point::new(10.0, 5.0),
            2.0,
        );
        draw_annotation(&mut pixmap, &ann, &frame, None);

        // 2 logical units at 4x covers rows 16..24
        assert_eq!(pixmap.pixel(20, 17).unwrap().alpha(), 255);
        assert_eq!(pixmap.pixel(20, 22).unwrap().alpha(), 255);
        assert_eq!(pixmap.pixel(20, 12).unwrap().alpha(), 0);
    }

    #[test]
    fn test_text_without_font_is_skipped() {
        let frame = CanvasFrame::new(Size::new(20.0, 20.0), 20, 20);
        let mut pixmap = Pixmap::new(20, 20).unwrap();
        let ann = Annotation {
            tool: Tool::Text,
            anchor: Point::new(1.0, 1.0),
            path: vec![PathSegment::MoveTo(Point::new(1.0, 1.0))],
            color: ShapeColor::RED,
            stroke_width: 2.0,
            text: Some("x".to_string()),
        };
        draw_annotation(&mut pixmap, &ann, &frame, None);
        assert!(pixmap.pixels().iter().all(|p| p.alpha() == 0));
    }
}
