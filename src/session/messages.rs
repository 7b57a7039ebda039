//! Message types for a capture session
//!
//! This module contains:
//! - Msg enum with nested sub-enums for organized message handling
//! - PointerEvent, the host-neutral pointer input shared by both engines

use crate::config::ShapeColor;
use crate::domain::{Point, Tool};

// ============================================================================
// Pointer Input
// ============================================================================

/// Pointer input in surface-local logical coordinates (y up)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Primary button went down
    Pressed(Point),
    /// Pointer moved (with or without a button held)
    Moved(Point),
    /// Primary button was released
    Released(Point),
}

// ============================================================================
// Selection Types
// ============================================================================

/// Region selection messages
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectMsg {
    /// Pointer input on the selection surface
    Pointer(PointerEvent),
    /// Abandon the selection (Escape)
    Cancel,
}

// ============================================================================
// Drawing Types
// ============================================================================

/// All drawing/annotation messages
#[derive(Debug, Clone, PartialEq)]
pub enum DrawMsg {
    /// Pointer input on the canvas
    Pointer(PointerEvent),
    /// Select the drawing tool
    SetTool(Tool),
    /// Set color for new annotations
    SetColor(ShapeColor),
    /// Advance to the next palette color
    CycleColor,
    /// Set stroke width for new annotations
    SetStrokeWidth(f32),
    /// Grow or shrink the stroke width by a step
    AdjustStrokeWidth(f32),
    /// Undo last committed annotation
    Undo,
    /// Append typed characters to the pending text
    InsertText(String),
    /// Remove the last character of the pending text
    DeleteBackward,
    /// Commit the pending text annotation
    CommitText,
    /// Drop the pending text annotation
    CancelText,
    /// Commit a complete text annotation at a point
    PlaceText(Point, String),
}

// ============================================================================
// Capture/Output Types
// ============================================================================

/// Export and close messages from the action bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaptureMsg {
    /// Hand the flattened image to the upload collaborator
    Upload,
    /// Copy to clipboard
    Copy,
    /// Save to the configured folder
    Save,
    /// Send to the print collaborator
    Print,
    /// Dismiss the annotation session
    Close,
}

// ============================================================================
// Main Message Enum
// ============================================================================

/// Messages for capture session interactions
#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Region selection messages
    Select(SelectMsg),
    /// Drawing/annotation messages
    Draw(DrawMsg),
    /// Export workflow messages
    Capture(CaptureMsg),
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl Msg {
    // Selection shortcuts
    pub fn select_pointer(event: PointerEvent) -> Self {
        Self::Select(SelectMsg::Pointer(event))
    }
    pub fn cancel_selection() -> Self {
        Self::Select(SelectMsg::Cancel)
    }

    // Drawing shortcuts
    pub fn draw_pointer(event: PointerEvent) -> Self {
        Self::Draw(DrawMsg::Pointer(event))
    }
    pub fn set_tool(tool: Tool) -> Self {
        Self::Draw(DrawMsg::SetTool(tool))
    }
    pub fn set_color(color: ShapeColor) -> Self {
        Self::Draw(DrawMsg::SetColor(color))
    }
    pub fn cycle_color() -> Self {
        Self::Draw(DrawMsg::CycleColor)
    }
    pub fn set_stroke_width(width: f32) -> Self {
        Self::Draw(DrawMsg::SetStrokeWidth(width))
    }
    pub fn adjust_stroke_width(delta: f32) -> Self {
        Self::Draw(DrawMsg::AdjustStrokeWidth(delta))
    }
    pub fn undo() -> Self {
        Self::Draw(DrawMsg::Undo)
    }
    pub fn insert_text(text: impl Into<String>) -> Self {
        Self::Draw(DrawMsg::InsertText(text.into()))
    }
    pub fn delete_backward() -> Self {
        Self::Draw(DrawMsg::DeleteBackward)
    }
    pub fn commit_text() -> Self {
        Self::Draw(DrawMsg::CommitText)
    }
    pub fn cancel_text() -> Self {
        Self::Draw(DrawMsg::CancelText)
    }

    // Capture shortcuts
    pub fn upload() -> Self {
        Self::Capture(CaptureMsg::Upload)
    }
    pub fn copy_to_clipboard() -> Self {
        Self::Capture(CaptureMsg::Copy)
    }
    pub fn save() -> Self {
        Self::Capture(CaptureMsg::Save)
    }
    pub fn print() -> Self {
        Self::Capture(CaptureMsg::Print)
    }
    pub fn close() -> Self {
        Self::Capture(CaptureMsg::Close)
    }
}
