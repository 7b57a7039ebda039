//! Rectangle selection engine
//!
//! Turns a pointer drag on a full-surface interaction layer into either a
//! finalized capture rectangle or a cancellation. The engine owns only the
//! transient session state; the host feeds it pointer and key input and
//! composites the overlay it renders.
//!
//! Rectangles are reported in the surface's local logical space (origin at
//! the bottom-left, y up). Converting to a capture API's top-left convention
//! is the caller's job, see [`Rect::flipped`].

use tiny_skia::Pixmap;

use super::drawing::{
    BadgeStyle, draw_badge, draw_dark_overlay, draw_dark_overlay_around_selection,
    draw_selection_frame_with_handles,
};
use crate::config::ShapeColor;
use crate::domain::{
    MIN_SELECTION_SIZE, Point, Rect, SelectionOutcome, SelectionRect, SelectionState, Size,
};
use crate::render::coord::CanvasFrame;
use crate::render::text::TextRenderer;
use crate::session::messages::{PointerEvent, SelectMsg};

/// Opacity of the dimming overlay outside the selection
const OVERLAY_OPACITY: f32 = 0.45;
/// Selection border
const BORDER_WIDTH: f32 = 1.5;
const BORDER_OPACITY: f32 = 0.9;
/// Diameter of the filled corner handles
const HANDLE_DIAMETER: f32 = 6.0;
/// Gap between the selection's top edge and the size badge
const BADGE_OFFSET: f32 = 8.0;

fn badge_style() -> BadgeStyle {
    BadgeStyle {
        font_size: 11.0,
        padding: 6.0,
        corner_radius: 4.0,
        background: ShapeColor::BLACK.with_alpha(0.7),
        foreground: tiny_skia::Color::WHITE,
    }
}

/// State of one selection session on one surface
#[derive(Debug, Clone)]
pub struct SelectionEngine {
    surface: Size,
    state: SelectionState,
    start: Option<Point>,
    live_rect: Option<SelectionRect>,
    needs_redraw: bool,
}

impl SelectionEngine {
    /// Start a session on a surface of the given logical size
    pub fn new(surface: Size) -> Self {
        Self {
            surface,
            state: SelectionState::Idle,
            start: None,
            live_rect: None,
            needs_redraw: true,
        }
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn surface_size(&self) -> Size {
        self.surface
    }

    /// Rectangle spanning the drag start and the latest pointer position
    pub fn live_rect(&self) -> Option<SelectionRect> {
        self.live_rect
    }

    /// Whether the session has ended and the surface should close
    pub fn is_finished(&self) -> bool {
        self.state.is_terminal()
    }

    /// Return and clear the pending redraw request
    pub fn take_needs_redraw(&mut self) -> bool {
        std::mem::take(&mut self.needs_redraw)
    }

    /// Dispatch a selection message, returning the outcome if the session ended
    pub fn handle(&mut self, msg: SelectMsg) -> Option<SelectionOutcome> {
        match msg {
            SelectMsg::Pointer(PointerEvent::Pressed(p)) => {
                self.pointer_down(p);
                None
            }
            SelectMsg::Pointer(PointerEvent::Moved(p)) => {
                self.pointer_moved(p);
                None
            }
            SelectMsg::Pointer(PointerEvent::Released(p)) => self.pointer_up(p),
            SelectMsg::Cancel => self.cancel(),
        }
    }

    /// Begin (or restart) a drag at `p`
    pub fn pointer_down(&mut self, p: Point) {
        match self.state {
            SelectionState::Idle | SelectionState::Dragging => {
                log::debug!("Selection drag started at ({}, {})", p.x, p.y);
                self.state = SelectionState::Dragging;
                self.start = Some(p);
                self.live_rect = None;
                self.needs_redraw = true;
            }
            SelectionState::Finalized(_) | SelectionState::Cancelled => {}
        }
    }

    /// Recompute the live rectangle from the drag start and `q`
    pub fn pointer_moved(&mut self, q: Point) {
        if self.state != SelectionState::Dragging {
            return;
        }
        if let Some(start) = self.start {
            self.live_rect = Some(Rect::spanning(start, q));
            self.needs_redraw = true;
        }
    }

    /// Finish the drag.
    ///
    /// The live rectangle is emitted only when both sides exceed the minimum
    /// size; anything smaller, or a press with no movement, cancels.
    pub fn pointer_up(&mut self, _p: Point) -> Option<SelectionOutcome> {
        if self.state != SelectionState::Dragging {
            return None;
        }

        let outcome = match self.live_rect {
            Some(rect) if rect.exceeds(MIN_SELECTION_SIZE) => SelectionOutcome::Finalized(rect),
            _ => SelectionOutcome::Cancelled,
        };
        match outcome {
            SelectionOutcome::Finalized(rect) => log::debug!(
                "Selection finalized: {}x{} at ({}, {})",
                rect.width,
                rect.height,
                rect.x,
                rect.y
            ),
            SelectionOutcome::Cancelled => log::debug!("Selection too small, cancelling"),
        }
        self.finish(outcome);
        Some(outcome)
    }

    /// Abandon the session from `Idle` or `Dragging`
    pub fn cancel(&mut self) -> Option<SelectionOutcome> {
        if self.state.is_terminal() {
            return None;
        }
        log::debug!("Selection cancelled");
        self.finish(SelectionOutcome::Cancelled);
        Some(SelectionOutcome::Cancelled)
    }

    fn finish(&mut self, outcome: SelectionOutcome) {
        self.state = outcome.into();
        self.start = None;
        self.needs_redraw = true;
    }

    /// Render the dimming overlay, border, handles and size badge.
    ///
    /// The returned pixmap covers the surface at `scale` pixels per logical
    /// unit and is transparent inside the live rectangle. While idle the
    /// pixmap stays fully transparent; during a drag with no rectangle yet
    /// only the dimming is drawn. Ended sessions draw nothing.
    pub fn render_overlay(&self, scale: f32, glyphs: Option<&TextRenderer>) -> Option<Pixmap> {
        if self.state.is_terminal() {
            return None;
        }

        let frame = CanvasFrame::with_scale(self.surface, scale);
        let mut pixmap = Pixmap::new(frame.pixel_width(), frame.pixel_height())?;
        if self.state == SelectionState::Idle {
            return Some(pixmap);
        }
        let outer = Rect::new(0.0, 0.0, self.surface.width, self.surface.height);

        let Some(rect) = self.live_rect else {
            draw_dark_overlay(&mut pixmap, &frame, OVERLAY_OPACITY);
            return Some(pixmap);
        };

        draw_dark_overlay_around_selection(&mut pixmap, &frame, outer, rect, OVERLAY_OPACITY);
        draw_selection_frame_with_handles(
            &mut pixmap,
            &frame,
            rect,
            ShapeColor::WHITE.with_alpha(BORDER_OPACITY),
            BORDER_WIDTH,
            HANDLE_DIAMETER,
        );
        draw_badge(
            &mut pixmap,
            &frame,
            Point::new(rect.mid_x(), rect.max_y() + BADGE_OFFSET),
            &size_label(rect),
            &badge_style(),
            glyphs,
        );

        Some(pixmap)
    }
}

/// Badge text for a rectangle, e.g. `"320 × 200"`
pub fn size_label(rect: Rect) -> String {
    format!("{} × {}", rect.width.round() as i64, rect.height.round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drag(from: Point, to: Point) -> Option<SelectionOutcome> {
        let mut engine = SelectionEngine::new(Size::new(200.0, 200.0));
        engine.pointer_down(from);
        engine.pointer_moved(to);
        engine.pointer_up(to)
    }

    #[test]
    fn test_every_quadrant_normalizes() {
        let expected = SelectionOutcome::Finalized(Rect::new(50.0, 50.0, 40.0, 30.0));
        let corners = [
            (Point::new(50.0, 50.0), Point::new(90.0, 80.0)),
            (Point::new(90.0, 80.0), Point::new(50.0, 50.0)),
            (Point::new(90.0, 50.0), Point::new(50.0, 80.0)),
            (Point::new(50.0, 80.0), Point::new(90.0, 50.0)),
        ];
        for (from, to) in corners {
            assert_eq!(drag(from, to), Some(expected), "{from:?} -> {to:?}");
        }
    }

    #[test]
    fn test_small_drags_cancel() {
        let start = Point::new(100.0, 100.0);
        for end in [
            Point::new(105.0, 150.0),
            Point::new(150.0, 105.0),
            Point::new(95.0, 40.0),
            Point::new(103.0, 103.0),
            start,
        ] {
            assert_eq!(drag(start, end), Some(SelectionOutcome::Cancelled), "{end:?}");
        }
        // Just over the threshold on both axes
        assert!(matches!(
            drag(start, Point::new(105.5, 105.5)),
            Some(SelectionOutcome::Finalized(_))
        ));
    }

    #[test]
    fn test_release_without_move_cancels() {
        let mut engine = SelectionEngine::new(Size::new(100.0, 100.0));
        engine.pointer_down(Point::new(10.0, 10.0));
        assert_eq!(
            engine.pointer_up(Point::new(60.0, 60.0)),
            Some(SelectionOutcome::Cancelled)
        );
        assert_eq!(engine.state(), SelectionState::Cancelled);
    }

    #[test]
    fn test_live_rect_is_recomputed_not_accumulated() {
        let mut engine = SelectionEngine::new(Size::new(100.0, 100.0));
        engine.pointer_down(Point::new(10.0, 10.0));
        engine.pointer_moved(Point::new(90.0, 90.0));
        engine.pointer_moved(Point::new(30.0, 5.0));
        assert_eq!(engine.live_rect(), Some(Rect::new(10.0, 5.0, 20.0, 5.0)));
        assert!(engine.take_needs_redraw());
        assert!(!engine.take_needs_redraw());
    }

    #[test]
    fn test_cancel_from_idle_and_dragging() {
        let mut engine = SelectionEngine::new(Size::new(100.0, 100.0));
        assert_eq!(engine.cancel(), Some(SelectionOutcome::Cancelled));
        assert!(engine.is_finished());

        let mut engine = SelectionEngine::new(Size::new(100.0, 100.0));
        engine.pointer_down(Point::new(1.0, 1.0));
        engine.pointer_moved(Point::new(50.0, 50.0));
        assert_eq!(
            engine.handle(SelectMsg::Cancel),
            Some(SelectionOutcome::Cancelled)
        );
    }

    #[test]
    fn test_terminal_state_ignores_input() {
        let mut engine = SelectionEngine::new(Size::new(100.0, 100.0));
        engine.pointer_down(Point::new(10.0, 10.0));
        engine.pointer_moved(Point::new(50.0, 50.0));
        let outcome = engine.pointer_up(Point::new(50.0, 50.0));
        assert!(matches!(outcome, Some(SelectionOutcome::Finalized(_))));

        engine.pointer_down(Point::new(0.0, 0.0));
        engine.pointer_moved(Point::new(99.0, 99.0));
        assert_eq!(engine.pointer_up(Point::new(99.0, 99.0)), None);
        assert_eq!(engine.cancel(), None);
        assert_eq!(
            engine.state(),
            SelectionState::Finalized(Rect::new(10.0, 10.0, 40.0, 40.0))
        );
    }

    #[test]
    fn test_overlay_punches_through_selection() {
        let mut engine = SelectionEngine::new(Size::new(100.0, 100.0));
        let idle = engine.render_overlay(1.0, None).unwrap();
        assert!(idle.pixels().iter().all(|p| p.alpha() == 0));

        engine.pointer_down(Point::new(20.0, 20.0));
        engine.pointer_moved(Point::new(60.0, 60.0));
        let overlay = engine.render_overlay(1.0, None).unwrap();
        assert_eq!((overlay.width(), overlay.height()), (100, 100));

        // Center of the selection shows the screen
        assert_eq!(overlay.pixel(40, 60).unwrap().alpha(), 0);
        // Far corner is dimmed
        let alpha = overlay.pixel(2, 2).unwrap().alpha();
        assert!((113..=117).contains(&alpha), "alpha was {alpha}");
    }

    #[test]
    fn test_overlay_scales_with_density() {
        let mut engine = SelectionEngine::new(Size::new(50.0, 40.0));
        engine.pointer_down(Point::new(5.0, 5.0));
        let overlay = engine.render_overlay(2.0, None).unwrap();
        assert_eq!((overlay.width(), overlay.height()), (100, 80));
        // No live rect yet: the whole surface is dimmed
        assert!(overlay.pixel(50, 40).unwrap().alpha() > 0);

        engine.cancel();
        assert!(engine.render_overlay(2.0, None).is_none());
    }

    #[test]
    fn test_idle_overlay_is_transparent() {
        let engine = SelectionEngine::new(Size::new(20.0, 20.0));
        let overlay = engine.render_overlay(1.0, None).unwrap();
        assert_eq!((overlay.width(), overlay.height()), (20, 20));
        let dimmed = overlay.pixels().iter().filter(|p| p.alpha() > 0).count();
        assert_eq!(dimmed, 0);
    }

    #[test]
    fn test_size_label_rounds() {
        assert_eq!(size_label(Rect::new(0.0, 0.0, 319.6, 200.2)), "320 × 200");
    }
}
