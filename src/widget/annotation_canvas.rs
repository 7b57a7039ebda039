//! Annotation canvas engine
//!
//! This engine owns:
//! - The captured base image (read-only after construction)
//! - The committed annotations, oldest first, which double as the undo stack
//! - At most one in-progress annotation being shaped by a gesture
//! - The tool, color and stroke width used for the next annotation
//!
//! Pointer positions are canvas logical coordinates (origin bottom-left,
//! y up); the [`CanvasFrame`] maps them onto the base image's pixels.

use anyhow::Context;
use image::RgbaImage;
use tiny_skia::Pixmap;

use crate::config::{ShapeColor, SnapMarkConfig};
use crate::domain::{Annotation, PathSegment, Point, Size, Tool};
use crate::render::coord::CanvasFrame;
use crate::render::image::{draw_annotation, pixmap_from_rgba, rgba_from_pixmap};
use crate::render::text::TextRenderer;

/// Smallest and largest stroke width reachable by stepping
pub const STROKE_WIDTH_RANGE: std::ops::RangeInclusive<f32> = 1.0..=20.0;

/// One entry of the draw order
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Layer<'a> {
    /// The captured image, filling the canvas
    Base,
    /// A committed annotation
    Committed(&'a Annotation),
    /// The annotation under the active gesture
    InProgress(&'a Annotation),
}

/// The drawing model for one annotation session
#[derive(Debug)]
pub struct AnnotationCanvas {
    base: Pixmap,
    frame: CanvasFrame,
    committed: Vec<Annotation>,
    in_progress: Option<Annotation>,
    tool: Tool,
    color: ShapeColor,
    stroke_width: f32,
    glyphs: Option<TextRenderer>,
    needs_redraw: bool,
}

impl AnnotationCanvas {
    /// Create a canvas over `base`, which covers `logical_size` on screen.
    ///
    /// A HiDPI capture has more pixels than logical units; annotations are
    /// scaled up when drawn so they line up with what the user saw.
    pub fn new(base: RgbaImage, logical_size: Size) -> anyhow::Result<Self> {
        let frame = CanvasFrame::new(logical_size, base.width(), base.height());
        let base = pixmap_from_rgba(&base).with_context(|| {
            format!(
                "captured image has no pixels ({}x{})",
                base.width(),
                base.height()
            )
        })?;

        Ok(Self {
            base,
            frame,
            committed: Vec::new(),
            in_progress: None,
            tool: Tool::default(),
            color: ShapeColor::default(),
            stroke_width: 2.0,
            glyphs: None,
            needs_redraw: true,
        })
    }

    /// Take the default tool, color and stroke width from the config
    pub fn apply_config(&mut self, config: &SnapMarkConfig) {
        self.tool = config.default_tool;
        self.color = config.shape_color;
        self.set_stroke_width(config.stroke_width);
    }

    /// Use `glyphs` for text annotations (`None` disables glyph drawing)
    pub fn with_text_renderer(mut self, glyphs: Option<TextRenderer>) -> Self {
        self.glyphs = glyphs;
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn color(&self) -> ShapeColor {
        self.color
    }

    pub fn stroke_width(&self) -> f32 {
        self.stroke_width
    }

    pub fn frame(&self) -> &CanvasFrame {
        &self.frame
    }

    pub fn committed(&self) -> &[Annotation] {
        &self.committed
    }

    pub fn in_progress(&self) -> Option<&Annotation> {
        self.in_progress.as_ref()
    }

    /// True iff there is a committed annotation to undo
    pub fn can_undo(&self) -> bool {
        !self.committed.is_empty()
    }

    /// Whether a text annotation is waiting for input
    pub fn has_pending_text(&self) -> bool {
        self.in_progress.as_ref().is_some_and(Annotation::is_text)
    }

    /// Return and clear the pending redraw request
    pub fn take_needs_redraw(&mut self) -> bool {
        std::mem::take(&mut self.needs_redraw)
    }

    // ========================================================================
    // Tool settings
    // ========================================================================

    /// Select the tool for the next gesture; pending text is committed first
    pub fn set_tool(&mut self, tool: Tool) {
        if tool == self.tool {
            return;
        }
        self.commit_text();
        log::debug!("Tool changed to {tool:?}");
        self.tool = tool;
    }

    pub fn set_color(&mut self, color: ShapeColor) {
        self.color = color;
    }

    /// Set the width for new annotations; non-positive or non-finite values are ignored
    pub fn set_stroke_width(&mut self, width: f32) {
        if !width.is_finite() || width <= 0.0 {
            log::warn!("Ignoring invalid stroke width {width}");
            return;
        }
        self.stroke_width = width;
    }

    /// Step the stroke width by `delta`, stopping at the ends of [`STROKE_WIDTH_RANGE`].
    ///
    /// A width already outside the range (set explicitly) never moves against
    /// the step: increasing never shrinks and decreasing never grows.
    pub fn adjust_stroke_width(&mut self, delta: f32) {
        let current = self.stroke_width;
        let stepped = current + delta;
        let width = if delta >= 0.0 {
            stepped.min(STROKE_WIDTH_RANGE.end().max(current))
        } else {
            stepped.max(STROKE_WIDTH_RANGE.start().min(current))
        };
        self.set_stroke_width(width);
    }

    // ========================================================================
    // Gestures
    // ========================================================================

    /// Start a new annotation with the current tool settings
    pub fn pointer_down(&mut self, p: Point) {
        // A click anywhere finishes the text being typed
        self.commit_text();
        self.in_progress = Some(self.tool.start_path(p, self.color, self.stroke_width));
        self.needs_redraw = true;
    }

    /// Reshape the in-progress annotation for the pointer at `p`
    pub fn pointer_moved(&mut self, p: Point) {
        let Some(annotation) = self.in_progress.as_mut() else {
            return;
        };
        if !annotation.tool.is_drag() {
            return;
        }
        annotation.tool.update_path(annotation, p);
        self.needs_redraw = true;
    }

    /// Finish the gesture and commit its annotation.
    ///
    /// Text stays in progress so it can be typed into.
    pub fn pointer_up(&mut self, p: Point) {
        let Some(annotation) = self.in_progress.as_mut() else {
            return;
        };
        if !annotation.tool.is_drag() {
            return;
        }
        let last = annotation.path.last().and_then(PathSegment::end_point);
        if !(annotation.tool.is_freehand() && last == Some(p)) {
            annotation.tool.update_path(annotation, p);
        }
        if let Some(annotation) = self.in_progress.take() {
            self.commit(annotation);
        }
        self.needs_redraw = true;
    }

    fn commit(&mut self, annotation: Annotation) {
        if annotation.has_extent() {
            log::debug!(
                "Committed {:?} annotation ({} total)",
                annotation.tool,
                self.committed.len() + 1
            );
            self.committed.push(annotation);
        } else {
            log::debug!("Discarding zero-extent {:?} annotation", annotation.tool);
        }
    }

    /// Remove the most recent committed annotation, if any
    pub fn undo(&mut self) {
        if let Some(annotation) = self.committed.pop() {
            log::debug!(
                "Undid {:?} annotation ({} left)",
                annotation.tool,
                self.committed.len()
            );
        }
        self.needs_redraw = true;
    }

    // ========================================================================
    // Text
    // ========================================================================

    /// Append typed text to the pending text annotation
    pub fn insert_text(&mut self, text: &str) {
        if let Some(content) = self.pending_text_mut() {
            content.push_str(text);
            self.needs_redraw = true;
        }
    }

    /// Remove the last character of the pending text
    pub fn delete_backward(&mut self) {
        if let Some(content) = self.pending_text_mut() {
            content.pop();
            self.needs_redraw = true;
        }
    }

    /// Commit the pending text annotation; blank text is dropped
    pub fn commit_text(&mut self) {
        if !self.has_pending_text() {
            return;
        }
        if let Some(annotation) = self.in_progress.take() {
            self.commit(annotation);
            self.needs_redraw = true;
        }
    }

    /// Drop the pending text annotation
    pub fn cancel_text(&mut self) {
        if self.has_pending_text() {
            self.in_progress = None;
            self.needs_redraw = true;
        }
    }

    /// Commit a text annotation with its bottom-left corner at `p`
    pub fn place_text(&mut self, p: Point, text: &str) {
        self.commit_text();
        let mut annotation = Tool::Text.start_path(p, self.color, self.stroke_width);
        annotation.text = Some(text.to_string());
        self.commit(annotation);
        self.needs_redraw = true;
    }

    fn pending_text_mut(&mut self) -> Option<&mut String> {
        self.in_progress
            .as_mut()
            .filter(|annotation| annotation.is_text())
            .and_then(|annotation| annotation.text.as_mut())
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Draw order: base, committed oldest first, then the in-progress annotation
    pub fn layers(&self) -> Vec<Layer<'_>> {
        let mut layers = self.flattened_layers();
        if let Some(annotation) = &self.in_progress {
            layers.push(Layer::InProgress(annotation));
        }
        layers
    }

    fn flattened_layers(&self) -> Vec<Layer<'_>> {
        std::iter::once(Layer::Base)
            .chain(self.committed.iter().map(Layer::Committed))
            .collect()
    }

    fn paint(&self, layers: &[Layer<'_>]) -> Pixmap {
        // Base covers the whole canvas, so start from a copy of it
        let mut pixmap = self.base.clone();
        for layer in layers {
            match layer {
                Layer::Base => {}
                Layer::Committed(annotation) | Layer::InProgress(annotation) => {
                    draw_annotation(&mut pixmap, annotation, &self.frame, self.glyphs.as_ref());
                }
            }
        }
        pixmap
    }

    /// Live preview including the in-progress annotation
    pub fn render(&self) -> Pixmap {
        self.paint(&self.layers())
    }

    /// Flatten the base image and committed annotations into one image.
    ///
    /// The result is an owned snapshot at the base image's pixel size and is
    /// unaffected by later edits.
    pub fn render_flattened_image(&self) -> RgbaImage {
        rgba_from_pixmap(&self.paint(&self.flattened_layers()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray_canvas(width: u32, height: u32) -> AnnotationCanvas {
        let base = RgbaImage::from_pixel(width, height, image::Rgba([128, 128, 128, 255]));
        AnnotationCanvas::new(base, Size::new(width as f32, height as f32)).unwrap()
    }

    fn stroke(canvas: &mut AnnotationCanvas, from: Point, to: Point) {
        canvas.pointer_down(from);
        canvas.pointer_moved(to);
        canvas.pointer_up(to);
    }

    #[test]
    fn test_empty_image_is_rejected() {
        assert!(AnnotationCanvas::new(RgbaImage::new(0, 0), Size::new(10.0, 10.0)).is_err());
    }

    #[test]
    fn test_render_order_with_in_progress_last() {
        let mut canvas = gray_canvas(50, 50);
        canvas.set_tool(Tool::Line);
        stroke(&mut canvas, Point::new(1.0, 1.0), Point::new(10.0, 1.0));
        stroke(&mut canvas, Point::new(1.0, 5.0), Point::new(10.0, 5.0));
        canvas.pointer_down(Point::new(1.0, 9.0));
        canvas.pointer_moved(Point::new(10.0, 9.0));

        let [a, b] = canvas.committed() else {
            panic!("expected two committed annotations");
        };
        let c = canvas.in_progress().unwrap();
        assert_eq!(
            canvas.layers(),
            vec![
                Layer::Base,
                Layer::Committed(a),
                Layer::Committed(b),
                Layer::InProgress(c)
            ]
        );

        let c = c.clone();
        canvas.pointer_up(Point::new(10.0, 9.0));
        assert!(canvas.in_progress().is_none());
        let layers = canvas.layers();
        assert_eq!(layers.len(), 4);
        assert_eq!(layers[3], Layer::Committed(&c));
    }

    #[test]
    fn test_undo_on_empty_is_a_no_op() {
        let mut canvas = gray_canvas(10, 10);
        assert!(!canvas.can_undo());
        canvas.undo();
        assert!(!canvas.can_undo());
        assert!(canvas.committed().is_empty());
    }

    #[test]
    fn test_undo_pops_most_recent() {
        let mut canvas = gray_canvas(50, 50);
        canvas.set_tool(Tool::Rectangle);
        stroke(&mut canvas, Point::new(1.0, 1.0), Point::new(10.0, 10.0));
        canvas.set_tool(Tool::Ellipse);
        stroke(&mut canvas, Point::new(20.0, 20.0), Point::new(30.0, 30.0));
        assert!(canvas.can_undo());

        canvas.undo();
        assert_eq!(canvas.committed().len(), 1);
        assert_eq!(canvas.committed()[0].tool, Tool::Rectangle);
        canvas.undo();
        assert!(!canvas.can_undo());
    }

    #[test]
    fn test_color_change_leaves_committed_strokes_alone() {
        let mut canvas = gray_canvas(40, 40);
        canvas.set_tool(Tool::Line);
        canvas.set_stroke_width(4.0);
        canvas.set_color(ShapeColor::RED);
        stroke(&mut canvas, Point::new(2.0, 10.0), Point::new(38.0, 10.0));
        canvas.set_color(ShapeColor::BLUE);
        canvas.set_stroke_width(1.0);
        stroke(&mut canvas, Point::new(2.0, 30.0), Point::new(38.0, 30.0));

        assert_eq!(canvas.committed()[0].color, ShapeColor::RED);
        assert_eq!(canvas.committed()[0].stroke_width, 4.0);

        // Logical y=10 is pixel row 30
        let image = canvas.render_flattened_image();
        assert_eq!(image.get_pixel(20, 30).0, ShapeColor::RED.to_rgba_u8());
    }

    #[test]
    fn test_flatten_is_deterministic_and_skips_in_progress() {
        let mut canvas = gray_canvas(30, 30);
        canvas.set_tool(Tool::Pencil);
        stroke(&mut canvas, Point::new(2.0, 2.0), Point::new(25.0, 20.0));
        let first = canvas.render_flattened_image();
        let second = canvas.render_flattened_image();
        assert_eq!(first, second);

        canvas.pointer_down(Point::new(0.0, 28.0));
        canvas.pointer_moved(Point::new(29.0, 28.0));
        assert_eq!(canvas.render_flattened_image(), first);
        assert_ne!(rgba_from_pixmap(&canvas.render()), first);
    }

    #[test]
    fn test_flatten_uses_base_pixel_size() {
        let base = RgbaImage::from_pixel(40, 20, image::Rgba([0, 0, 0, 255]));
        let mut canvas = AnnotationCanvas::new(base, Size::new(20.0, 10.0)).unwrap();
        canvas.set_tool(Tool::Line);
        canvas.set_color(ShapeColor::WHITE);
        canvas.set_stroke_width(2.0);
        stroke(&mut canvas, Point::new(0.0, 5.0), Point::new(20.0, 5.0));

        let image = canvas.render_flattened_image();
        assert_eq!(image.dimensions(), (40, 20));
        // 2 logical units at 2x spans pixel rows 8..12
        assert_eq!(image.get_pixel(20, 9).0, [255, 255, 255, 255]);
        assert_eq!(image.get_pixel(20, 2).0, [0, 0, 0, 255]);
    }

    #[test]
    fn test_click_without_drag_is_discarded() {
        let mut canvas = gray_canvas(20, 20);
        for tool in [Tool::Arrow, Tool::Rectangle, Tool::Line, Tool::Pencil] {
            canvas.set_tool(tool);
            canvas.pointer_down(Point::new(5.0, 5.0));
            canvas.pointer_up(Point::new(5.0, 5.0));
        }
        assert!(!canvas.can_undo());
    }

    #[test]
    fn test_release_point_is_included() {
        let mut canvas = gray_canvas(20, 20);
        canvas.set_tool(Tool::Line);
        canvas.pointer_down(Point::new(1.0, 1.0));
        canvas.pointer_up(Point::new(9.0, 1.0));
        assert_eq!(
            canvas.committed()[0].path,
            vec![
                PathSegment::MoveTo(Point::new(1.0, 1.0)),
                PathSegment::LineTo(Point::new(9.0, 1.0))
            ]
        );
    }

    #[test]
    fn test_tool_change_does_not_touch_in_progress() {
        let mut canvas = gray_canvas(20, 20);
        canvas.set_tool(Tool::Pencil);
        canvas.pointer_down(Point::new(1.0, 1.0));
        canvas.set_tool(Tool::Rectangle);
        canvas.set_color(ShapeColor::GREEN);
        canvas.pointer_moved(Point::new(5.0, 5.0));
        canvas.pointer_up(Point::new(8.0, 2.0));

        let committed = &canvas.committed()[0];
        assert_eq!(committed.tool, Tool::Pencil);
        assert_eq!(committed.color, ShapeColor::RED);
        assert_eq!(committed.path.len(), 3);
    }

    #[test]
    fn test_marker_commits_quadruple_width() {
        let mut canvas = gray_canvas(20, 20);
        canvas.set_tool(Tool::Marker);
        canvas.set_stroke_width(3.0);
        stroke(&mut canvas, Point::new(1.0, 1.0), Point::new(15.0, 15.0));
        assert_eq!(canvas.committed()[0].stroke_width, 12.0);
    }

    #[test]
    fn test_text_typing_and_commit() {
        let mut canvas = gray_canvas(50, 50);
        canvas.set_tool(Tool::Text);
        canvas.pointer_down(Point::new(4.0, 4.0));
        canvas.pointer_up(Point::new(4.0, 4.0));
        assert!(canvas.has_pending_text());

        canvas.insert_text("Hello");
        canvas.insert_text("!!");
        canvas.delete_backward();
        canvas.commit_text();

        assert!(!canvas.has_pending_text());
        let text = &canvas.committed()[0];
        assert_eq!(text.text.as_deref(), Some("Hello!"));
        assert_eq!(text.path, vec![PathSegment::MoveTo(Point::new(4.0, 4.0))]);
    }

    #[test]
    fn test_blank_text_is_dropped() {
        let mut canvas = gray_canvas(50, 50);
        canvas.set_tool(Tool::Text);
        canvas.pointer_down(Point::new(4.0, 4.0));
        canvas.insert_text("   ");
        canvas.commit_text();
        assert!(!canvas.can_undo());
    }

    #[test]
    fn test_new_click_or_tool_switch_commits_text() {
        let mut canvas = gray_canvas(50, 50);
        canvas.set_tool(Tool::Text);
        canvas.pointer_down(Point::new(4.0, 4.0));
        canvas.insert_text("one");
        canvas.pointer_down(Point::new(20.0, 20.0));
        canvas.insert_text("two");
        canvas.set_tool(Tool::Arrow);

        let texts: Vec<_> = canvas
            .committed()
            .iter()
            .filter_map(|a| a.text.as_deref())
            .collect();
        assert_eq!(texts, ["one", "two"]);
        assert!(canvas.in_progress().is_none());
    }

    #[test]
    fn test_cancel_and_place_text() {
        let mut canvas = gray_canvas(50, 50);
        canvas.set_tool(Tool::Text);
        canvas.pointer_down(Point::new(4.0, 4.0));
        canvas.insert_text("draft");
        canvas.cancel_text();
        assert!(canvas.in_progress().is_none());

        canvas.place_text(Point::new(10.0, 10.0), "placed");
        assert_eq!(canvas.committed().len(), 1);
        assert_eq!(canvas.committed()[0].anchor, Point::new(10.0, 10.0));
    }

    #[test]
    fn test_stroke_width_validation_and_steps() {
        let mut canvas = gray_canvas(10, 10);
        canvas.set_stroke_width(-3.0);
        canvas.set_stroke_width(f32::NAN);
        assert_eq!(canvas.stroke_width(), 2.0);

        canvas.adjust_stroke_width(-5.0);
        assert_eq!(canvas.stroke_width(), 1.0);
        canvas.adjust_stroke_width(100.0);
        assert_eq!(canvas.stroke_width(), 20.0);
    }

    #[test]
    fn test_steps_never_move_against_their_direction() {
        let mut canvas = gray_canvas(10, 10);
        canvas.set_stroke_width(30.0);
        canvas.adjust_stroke_width(1.0);
        assert_eq!(canvas.stroke_width(), 30.0);
        canvas.adjust_stroke_width(-1.0);
        assert_eq!(canvas.stroke_width(), 29.0);

        canvas.set_stroke_width(0.5);
        canvas.adjust_stroke_width(-1.0);
        assert_eq!(canvas.stroke_width(), 0.5);
        canvas.adjust_stroke_width(1.0);
        assert_eq!(canvas.stroke_width(), 1.5);
    }

    #[test]
    fn test_redraw_flag_follows_changes() {
        let mut canvas = gray_canvas(10, 10);
        assert!(canvas.take_needs_redraw());
        assert!(!canvas.take_needs_redraw());
        canvas.pointer_moved(Point::new(1.0, 1.0));
        assert!(!canvas.take_needs_redraw());
        canvas.pointer_down(Point::new(1.0, 1.0));
        assert!(canvas.take_needs_redraw());
    }
}
