//! Annotation message handlers
//!
//! Handles DrawMsg for all annotation drawing operations.

use crate::session::messages::{DrawMsg, PointerEvent};
use crate::widget::annotation_canvas::AnnotationCanvas;

/// Stroke width change for one `[` / `]` step
pub const STROKE_WIDTH_STEP: f32 = 1.0;

/// Handle a DrawMsg, modifying the canvas state
pub fn handle_draw_msg(canvas: &mut AnnotationCanvas, msg: DrawMsg) {
    match msg {
        DrawMsg::Pointer(event) => handle_pointer(canvas, event),
        DrawMsg::SetTool(tool) => canvas.set_tool(tool),
        DrawMsg::SetColor(color) => canvas.set_color(color),
        DrawMsg::CycleColor => canvas.set_color(canvas.color().next_in_palette()),
        DrawMsg::SetStrokeWidth(width) => canvas.set_stroke_width(width),
        DrawMsg::AdjustStrokeWidth(delta) => canvas.adjust_stroke_width(delta),
        DrawMsg::Undo => canvas.undo(),
        DrawMsg::InsertText(text) => canvas.insert_text(&text),
        DrawMsg::DeleteBackward => canvas.delete_backward(),
        DrawMsg::CommitText => canvas.commit_text(),
        DrawMsg::CancelText => canvas.cancel_text(),
        DrawMsg::PlaceText(point, text) => canvas.place_text(point, &text),
    }
}

fn handle_pointer(canvas: &mut AnnotationCanvas, event: PointerEvent) {
    match event {
        PointerEvent::Pressed(p) => canvas.pointer_down(p),
        PointerEvent::Moved(p) => canvas.pointer_moved(p),
        PointerEvent::Released(p) => canvas.pointer_up(p),
    }
}
