//! Capture session orchestration
//!
//! The session owns at most one selection engine and at most one annotation
//! canvas. A finalized selection is captured through the host's
//! [`ScreenCapturer`] and turned into a canvas; export actions flatten the
//! canvas and hand the snapshot to a registered [`Exporter`].

use std::collections::HashMap;

use anyhow::Context;
use tiny_skia::Pixmap;

use crate::annotations::handlers::handle_draw_msg;
use crate::capture::ScreenCapturer;
use crate::config::SnapMarkConfig;
use crate::domain::{Point, SelectionOutcome, SelectionRect, Size};
use crate::export::{ExportOutcome, Exporter, FileExporter};
use crate::render::text::TextRenderer;
use crate::session::messages::{CaptureMsg, DrawMsg, Msg, SelectMsg};
use crate::session::shortcuts::{Key, Modifiers, ShortcutContext, handle_key_event};
use crate::widget::annotation_canvas::AnnotationCanvas;
use crate::widget::rectangle_selection::SelectionEngine;
use crate::widget::toolbar::Toolbar;

/// Which part of the flow is active
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Selecting,
    Annotating,
}

/// Which toolbar a click landed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bar {
    DrawTools,
    Actions,
}

/// Things the host needs to react to
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The selection surface closed without a region
    SelectionCancelled,
    /// A region was captured and the annotation window should open
    Captured {
        rect: SelectionRect,
        width: u32,
        height: u32,
    },
    /// An exporter finished; the annotation window closed
    Exported(ExportOutcome),
    /// The annotation window was dismissed
    Closed,
}

#[derive(Debug)]
struct ActiveSelection {
    engine: SelectionEngine,
    scale: f32,
}

/// Owner of the selection and annotation engines for one capture flow
pub struct CaptureSession<C: ScreenCapturer> {
    config: SnapMarkConfig,
    capturer: C,
    glyphs: Option<TextRenderer>,
    selection: Option<ActiveSelection>,
    canvas: Option<AnnotationCanvas>,
    draw_tools: Toolbar,
    actions: Toolbar,
    exporters: HashMap<CaptureMsg, Box<dyn Exporter>>,
}

impl<C: ScreenCapturer> CaptureSession<C> {
    /// Create a session; the save action writes to the configured folder
    pub fn new(capturer: C, config: SnapMarkConfig) -> Self {
        let glyphs = TextRenderer::discover(config.font_path.as_deref());
        let mut session = Self {
            config,
            capturer,
            glyphs,
            selection: None,
            canvas: None,
            draw_tools: Toolbar::draw_tools(),
            actions: Toolbar::actions(),
            exporters: HashMap::new(),
        };
        match FileExporter::from_config(&session.config) {
            Some(exporter) => session.register_exporter(CaptureMsg::Save, Box::new(exporter)),
            None => log::warn!("No save folder available, saving is disabled"),
        }
        session
    }

    /// Route an export action to `exporter`, replacing any previous one
    pub fn register_exporter(&mut self, action: CaptureMsg, exporter: Box<dyn Exporter>) {
        self.exporters.insert(action, exporter);
    }

    pub fn config(&self) -> &SnapMarkConfig {
        &self.config
    }

    pub fn stage(&self) -> Stage {
        if self.selection.is_some() {
            Stage::Selecting
        } else if self.canvas.is_some() {
            Stage::Annotating
        } else {
            Stage::Idle
        }
    }

    pub fn selection(&self) -> Option<&SelectionEngine> {
        self.selection.as_ref().map(|active| &active.engine)
    }

    pub fn canvas(&self) -> Option<&AnnotationCanvas> {
        self.canvas.as_ref()
    }

    pub fn canvas_mut(&mut self) -> Option<&mut AnnotationCanvas> {
        self.canvas.as_mut()
    }

    pub fn toolbar(&self, bar: Bar) -> &Toolbar {
        match bar {
            Bar::DrawTools => &self.draw_tools,
            Bar::Actions => &self.actions,
        }
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// Show a fresh selection surface of `surface` logical size.
    ///
    /// Any previous selection or annotation session is dropped.
    pub fn begin_selection(&mut self, surface: Size, scale: f32) {
        if self.canvas.take().is_some() {
            log::debug!("Closing annotation session for a new capture");
        }
        self.selection = Some(ActiveSelection {
            engine: SelectionEngine::new(surface),
            scale,
        });
    }

    /// Overlay for the selection surface while a selection is active
    pub fn render_selection_overlay(&self) -> Option<Pixmap> {
        let active = self.selection.as_ref()?;
        active
            .engine
            .render_overlay(active.scale, self.glyphs.as_ref())
    }

    pub fn handle_selection(&mut self, msg: SelectMsg) -> anyhow::Result<Option<SessionEvent>> {
        let Some(active) = self.selection.as_mut() else {
            return Ok(None);
        };
        let Some(outcome) = active.engine.handle(msg) else {
            return Ok(None);
        };

        // Either way the selection surface goes away
        let Some(active) = self.selection.take() else {
            return Ok(None);
        };
        match outcome {
            SelectionOutcome::Cancelled => Ok(Some(SessionEvent::SelectionCancelled)),
            SelectionOutcome::Finalized(rect) => {
                let surface = active.engine.surface_size();
                let capture_rect = rect.flipped(surface.height);
                let image = self
                    .capturer
                    .capture(capture_rect, active.scale)
                    .context("capturing selected region")?;
                let (width, height) = image.dimensions();

                let mut canvas = AnnotationCanvas::new(image, rect.size())?
                    .with_text_renderer(self.glyphs.clone());
                canvas.apply_config(&self.config);
                self.canvas = Some(canvas);

                log::info!("Captured {width}x{height} region");
                Ok(Some(SessionEvent::Captured {
                    rect,
                    width,
                    height,
                }))
            }
        }
    }

    // ========================================================================
    // Annotation
    // ========================================================================

    pub fn handle_annotation(&mut self, msg: DrawMsg) {
        if let Some(canvas) = self.canvas.as_mut() {
            handle_draw_msg(canvas, msg);
        }
    }

    fn handle_capture(&mut self, msg: CaptureMsg) -> anyhow::Result<Option<SessionEvent>> {
        if msg == CaptureMsg::Close {
            return Ok(self.close().then_some(SessionEvent::Closed));
        }

        let Some(canvas) = self.canvas.as_mut() else {
            return Ok(None);
        };
        let Some(exporter) = self.exporters.get(&msg) else {
            log::warn!("No exporter registered for {msg:?}");
            return Ok(None);
        };

        // Text still being typed belongs in the export
        canvas.commit_text();
        let outcome = exporter.export(canvas.render_flattened_image())?;
        self.close();
        Ok(Some(SessionEvent::Exported(outcome)))
    }

    /// Flatten the current canvas and hand it to `exporter`
    pub fn export_with(&self, exporter: &dyn Exporter) -> anyhow::Result<ExportOutcome> {
        let canvas = self
            .canvas
            .as_ref()
            .context("no annotation session to export")?;
        exporter.export(canvas.render_flattened_image())
    }

    /// Drop the annotation canvas; returns whether one was open
    pub fn close(&mut self) -> bool {
        let was_open = self.canvas.take().is_some();
        if was_open {
            log::debug!("Annotation session closed");
        }
        was_open
    }

    // ========================================================================
    // Input
    // ========================================================================

    /// Dispatch a message to whichever engine it targets
    pub fn handle(&mut self, msg: Msg) -> anyhow::Result<Option<SessionEvent>> {
        match msg {
            Msg::Select(msg) => self.handle_selection(msg),
            Msg::Draw(msg) => {
                self.handle_annotation(msg);
                Ok(None)
            }
            Msg::Capture(msg) => self.handle_capture(msg),
        }
    }

    /// Translate a key press for the active stage and dispatch it
    pub fn handle_key(
        &mut self,
        key: &Key,
        modifiers: Modifiers,
    ) -> anyhow::Result<Option<SessionEvent>> {
        let context = match (&self.selection, &self.canvas) {
            (Some(_), _) => ShortcutContext::Selecting,
            (None, Some(canvas)) => ShortcutContext::Annotating {
                editing_text: canvas.has_pending_text(),
            },
            (None, None) => return Ok(None),
        };
        match handle_key_event(context, key, modifiers) {
            Some(msg) => self.handle(msg),
            None => Ok(None),
        }
    }

    /// Dispatch a click on one of the toolbars
    pub fn click_toolbar(
        &mut self,
        bar: Bar,
        point: Point,
    ) -> anyhow::Result<Option<SessionEvent>> {
        let can_undo = self.canvas.as_ref().is_some_and(AnnotationCanvas::can_undo);
        match self.toolbar(bar).click(point, can_undo) {
            Some(action) => self.handle(action.to_msg()),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use image::RgbaImage;

    use super::*;
    use crate::config::ShapeColor;
    use crate::domain::{Rect, Tool};
    use crate::export::ExportKind;
    use crate::session::messages::PointerEvent;
    use crate::session::shortcuts::Named;

    /// Records requested rects and returns a blank image at the given scale
    #[derive(Default, Clone)]
    struct RecordingCapturer {
        requests: Rc<RefCell<Vec<Rect>>>,
    }

    impl ScreenCapturer for RecordingCapturer {
        fn capture(&mut self, rect: Rect, scale: f32) -> anyhow::Result<RgbaImage> {
            self.requests.borrow_mut().push(rect);
            Ok(RgbaImage::from_pixel(
                (rect.width * scale) as u32,
                (rect.height * scale) as u32,
                image::Rgba([255, 255, 255, 255]),
            ))
        }
    }

    /// Keeps the last exported image
    #[derive(Default, Clone)]
    struct MemoryExporter {
        last: Rc<RefCell<Option<RgbaImage>>>,
    }

    impl Exporter for MemoryExporter {
        fn kind(&self) -> ExportKind {
            ExportKind::Clipboard
        }

        fn export(&self, image: RgbaImage) -> anyhow::Result<ExportOutcome> {
            *self.last.borrow_mut() = Some(image);
            Ok(ExportOutcome::Copied)
        }
    }

    fn session() -> (CaptureSession<RecordingCapturer>, RecordingCapturer) {
        let capturer = RecordingCapturer::default();
        (
            CaptureSession::new(capturer.clone(), SnapMarkConfig::default()),
            capturer,
        )
    }

    fn select(
        session: &mut CaptureSession<RecordingCapturer>,
        from: Point,
        to: Point,
    ) -> Option<SessionEvent> {
        for event in [
            PointerEvent::Pressed(from),
            PointerEvent::Moved(to),
            PointerEvent::Released(to),
        ] {
            if let Some(event) = session.handle(Msg::select_pointer(event)).unwrap() {
                return Some(event);
            }
        }
        None
    }

    #[test]
    fn test_finalized_selection_is_captured_top_left() {
        let (mut session, capturer) = session();
        session.begin_selection(Size::new(400.0, 300.0), 2.0);
        assert_eq!(session.stage(), Stage::Selecting);

        let event = select(&mut session, Point::new(100.0, 50.0), Point::new(200.0, 250.0));
        assert_eq!(
            event,
            Some(SessionEvent::Captured {
                rect: Rect::new(100.0, 50.0, 100.0, 200.0),
                width: 200,
                height: 400,
            })
        );
        // y' = 300 - 50 - 200
        assert_eq!(
            *capturer.requests.borrow(),
            [Rect::new(100.0, 50.0, 100.0, 200.0).flipped(300.0)]
        );
        assert_eq!(capturer.requests.borrow()[0].y, 50.0);
        assert_eq!(session.stage(), Stage::Annotating);
        assert_eq!(
            session.canvas().unwrap().frame().logical_size(),
            Size::new(100.0, 200.0)
        );
    }

    #[test]
    fn test_small_selection_captures_nothing() {
        let (mut session, capturer) = session();
        session.begin_selection(Size::new(400.0, 300.0), 1.0);
        let event = select(&mut session, Point::new(10.0, 10.0), Point::new(13.0, 80.0));
        assert_eq!(event, Some(SessionEvent::SelectionCancelled));
        assert!(capturer.requests.borrow().is_empty());
        assert_eq!(session.stage(), Stage::Idle);
    }

    #[test]
    fn test_escape_cancels_selection() {
        let (mut session, _) = session();
        session.begin_selection(Size::new(100.0, 100.0), 1.0);
        let event = session
            .handle_key(&Key::Named(Named::Escape), Modifiers::NONE)
            .unwrap();
        assert_eq!(event, Some(SessionEvent::SelectionCancelled));
        assert!(session.selection().is_none());
    }

    #[test]
    fn test_export_hands_over_snapshot_and_closes() {
        let (mut session, _) = session();
        let exporter = MemoryExporter::default();
        session.register_exporter(CaptureMsg::Copy, Box::new(exporter.clone()));

        session.begin_selection(Size::new(100.0, 100.0), 1.0);
        select(&mut session, Point::new(0.0, 0.0), Point::new(50.0, 40.0));
        session.handle(Msg::set_tool(Tool::Line)).unwrap();
        for event in [
            PointerEvent::Pressed(Point::new(5.0, 20.0)),
            PointerEvent::Moved(Point::new(45.0, 20.0)),
            PointerEvent::Released(Point::new(45.0, 20.0)),
        ] {
            session.handle(Msg::draw_pointer(event)).unwrap();
        }
        let expected = session.canvas().unwrap().render_flattened_image();

        let event = session
            .handle_key(&Key::Named(Named::Enter), Modifiers::NONE)
            .unwrap();
        assert_eq!(event, Some(SessionEvent::Exported(ExportOutcome::Copied)));
        assert_eq!(exporter.last.borrow().as_ref(), Some(&expected));
        assert_eq!(session.stage(), Stage::Idle);
    }

    #[test]
    fn test_unregistered_export_keeps_session_open() {
        let (mut session, _) = session();
        session.begin_selection(Size::new(100.0, 100.0), 1.0);
        select(&mut session, Point::new(0.0, 0.0), Point::new(50.0, 40.0));
        assert_eq!(session.handle(Msg::print()).unwrap(), None);
        assert_eq!(session.stage(), Stage::Annotating);

        assert_eq!(session.handle(Msg::close()).unwrap(), Some(SessionEvent::Closed));
        assert_eq!(session.handle(Msg::close()).unwrap(), None);
    }

    #[test]
    fn test_toolbar_click_selects_tool() {
        let (mut session, _) = session();
        session.begin_selection(Size::new(100.0, 100.0), 1.0);
        select(&mut session, Point::new(0.0, 0.0), Point::new(50.0, 40.0));

        let bar = session.toolbar(Bar::DrawTools);
        let id = bar.control_for_tool(Tool::Marker).unwrap();
        let frame = bar.control(id).unwrap().frame;
        session
            .click_toolbar(Bar::DrawTools, Point::new(frame.mid_x(), frame.mid_y()))
            .unwrap();
        assert_eq!(session.canvas().unwrap().tool(), Tool::Marker);
    }

    /// Pretends to upload and reports a fixed URL
    struct UrlExporter;

    impl Exporter for UrlExporter {
        fn kind(&self) -> ExportKind {
            ExportKind::Upload
        }

        fn export(&self, _image: RgbaImage) -> anyhow::Result<ExportOutcome> {
            Ok(ExportOutcome::Uploaded("https://img.example/abc".to_string()))
        }
    }

    #[test]
    fn test_settings_messages_reach_canvas_and_upload_closes() {
        let (mut session, _) = session();
        session.register_exporter(CaptureMsg::Upload, Box::new(UrlExporter));
        session.begin_selection(Size::new(100.0, 100.0), 1.0);
        select(&mut session, Point::new(0.0, 0.0), Point::new(50.0, 40.0));

        session.handle(Msg::set_color(ShapeColor::GREEN)).unwrap();
        session.handle(Msg::set_stroke_width(6.0)).unwrap();
        let canvas = session.canvas().unwrap();
        assert_eq!(canvas.color(), ShapeColor::GREEN);
        assert_eq!(canvas.stroke_width(), 6.0);

        let event = session.handle(Msg::upload()).unwrap();
        assert_eq!(
            event,
            Some(SessionEvent::Exported(ExportOutcome::Uploaded(
                "https://img.example/abc".to_string()
            )))
        );
        assert_eq!(session.stage(), Stage::Idle);
    }

    #[test]
    fn test_export_with_requires_canvas() {
        let (session, _) = session();
        assert!(session.export_with(&MemoryExporter::default()).is_err());
    }
}
