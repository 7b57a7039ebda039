//! Toolbar model for the annotation window
//!
//! Two bars float over the canvas: a vertical bar with the drawing tools,
//! color and undo buttons, and a horizontal bar with the export actions.
//! This module lays the controls out and maps clicks back to actions; the
//! host draws the buttons wherever it places the bars.
//!
//! Frames are bar-local logical coordinates (origin bottom-left, y up).

use std::collections::HashMap;

use crate::domain::{Point, Rect, Size, Tool};
use crate::session::messages::{CaptureMsg, Msg};

/// Side length of an icon button
pub const BUTTON_SIZE: f32 = 28.0;
/// Gap between neighbouring controls
pub const SPACING: f32 = 4.0;
/// Inset between the bar edge and its controls
pub const PADDING: f32 = 6.0;
/// Thickness of a separator line
pub const SEPARATOR_THICKNESS: f32 = 1.0;
/// Width of a button carrying a text label
pub const LABELED_BUTTON_WIDTH: f32 = 60.0;

/// Stable identifier of a toolbar control, assigned at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControlId(u16);

/// What clicking a control does
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToolbarAction {
    SelectTool(Tool),
    CycleColor,
    Undo,
    Capture(CaptureMsg),
}

impl ToolbarAction {
    /// Message the session should receive for this action
    pub fn to_msg(self) -> Msg {
        match self {
            ToolbarAction::SelectTool(tool) => Msg::set_tool(tool),
            ToolbarAction::CycleColor => Msg::cycle_color(),
            ToolbarAction::Undo => Msg::undo(),
            ToolbarAction::Capture(msg) => Msg::Capture(msg),
        }
    }
}

/// Direction controls are stacked in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Top to bottom
    Vertical,
    /// Left to right
    Horizontal,
}

/// Visual content of a control
#[derive(Debug, Clone, PartialEq)]
pub enum ControlKind {
    /// Square icon button with a tooltip
    Icon {
        icon: &'static str,
        tooltip: &'static str,
    },
    /// Button with a text label
    Labeled { label: &'static str },
    /// Thin divider between groups
    Separator,
}

/// A laid-out control
#[derive(Debug, Clone, PartialEq)]
pub struct Control {
    pub id: ControlId,
    pub kind: ControlKind,
    pub frame: Rect,
}

/// A laid-out bar of controls
#[derive(Debug, Clone)]
pub struct Toolbar {
    orientation: Orientation,
    size: Size,
    controls: Vec<Control>,
    actions: HashMap<ControlId, ToolbarAction>,
}

impl Toolbar {
    /// The vertical bar: drawing tools, then color and undo
    pub fn draw_tools() -> Self {
        let mut items: Vec<(ControlKind, Option<ToolbarAction>)> = Tool::ALL
            .iter()
            .map(|&tool| {
                (
                    ControlKind::Icon {
                        icon: tool.icon_name(),
                        tooltip: tool.tooltip(),
                    },
                    Some(ToolbarAction::SelectTool(tool)),
                )
            })
            .collect();
        items.push((ControlKind::Separator, None));
        items.push((
            ControlKind::Icon {
                icon: "color-select-symbolic",
                tooltip: "Color",
            },
            Some(ToolbarAction::CycleColor),
        ));
        items.push((
            ControlKind::Icon {
                icon: "edit-undo-symbolic",
                tooltip: "Undo",
            },
            Some(ToolbarAction::Undo),
        ));
        Self::build(Orientation::Vertical, items)
    }

    /// The horizontal bar with export actions
    pub fn actions() -> Self {
        let items = [
            ("Upload", CaptureMsg::Upload),
            ("Copy", CaptureMsg::Copy),
            ("Save", CaptureMsg::Save),
            ("Print", CaptureMsg::Print),
            ("Close", CaptureMsg::Close),
        ]
        .into_iter()
        .map(|(label, msg)| {
            (
                ControlKind::Labeled { label },
                Some(ToolbarAction::Capture(msg)),
            )
        })
        .collect();
        Self::build(Orientation::Horizontal, items)
    }

    fn build(orientation: Orientation, items: Vec<(ControlKind, Option<ToolbarAction>)>) -> Self {
        // Extent of each item along the stacking axis and across it
        let extents: Vec<(f32, f32)> = items
            .iter()
            .map(|(kind, _)| match (kind, orientation) {
                (ControlKind::Icon { .. }, _) => (BUTTON_SIZE, BUTTON_SIZE),
                (ControlKind::Labeled { .. }, Orientation::Horizontal) => {
                    (LABELED_BUTTON_WIDTH, BUTTON_SIZE)
                }
                (ControlKind::Labeled { .. }, Orientation::Vertical) => {
                    (BUTTON_SIZE, LABELED_BUTTON_WIDTH)
                }
                (ControlKind::Separator, _) => (SEPARATOR_THICKNESS, BUTTON_SIZE),
            })
            .collect();

        let along = extents.iter().map(|(a, _)| a).sum::<f32>()
            + SPACING * extents.len().saturating_sub(1) as f32
            + PADDING * 2.0;
        let across = extents.iter().map(|(_, c)| *c).fold(0.0, f32::max) + PADDING * 2.0;
        let size = match orientation {
            Orientation::Vertical => Size::new(across, along),
            Orientation::Horizontal => Size::new(along, across),
        };

        let mut controls = Vec::with_capacity(items.len());
        let mut actions = HashMap::new();
        let mut cursor = PADDING;
        for (index, ((kind, action), (len, thick))) in items.into_iter().zip(extents).enumerate() {
            let id = ControlId(index as u16);
            let offset = (across - thick) / 2.0;
            let frame = match orientation {
                // Stack downward from the top edge
                Orientation::Vertical => Rect::new(offset, size.height - cursor - len, thick, len),
                Orientation::Horizontal => Rect::new(cursor, offset, len, thick),
            };
            cursor += len + SPACING;

            if let Some(action) = action {
                actions.insert(id, action);
            }
            controls.push(Control { id, kind, frame });
        }

        Self {
            orientation,
            size,
            controls,
            actions,
        }
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Overall bar size including padding
    pub fn size(&self) -> Size {
        self.size
    }

    /// Controls in stacking order with their frames
    pub fn layout(&self) -> &[Control] {
        &self.controls
    }

    pub fn control(&self, id: ControlId) -> Option<&Control> {
        self.controls.iter().find(|control| control.id == id)
    }

    /// Control under `point`; separators and padding are not clickable
    pub fn hit_test(&self, point: Point) -> Option<ControlId> {
        self.controls
            .iter()
            .filter(|control| control.kind != ControlKind::Separator)
            .find(|control| control.frame.contains(point))
            .map(|control| control.id)
    }

    /// Action bound to `id`
    pub fn action(&self, id: ControlId) -> Option<ToolbarAction> {
        self.actions.get(&id).copied()
    }

    /// Control that selects `tool`, for highlighting the current tool
    pub fn control_for_tool(&self, tool: Tool) -> Option<ControlId> {
        self.controls
            .iter()
            .map(|control| control.id)
            .find(|id| self.action(*id) == Some(ToolbarAction::SelectTool(tool)))
    }

    /// Whether the control should accept clicks in the current state
    pub fn is_enabled(&self, id: ControlId, can_undo: bool) -> bool {
        match self.action(id) {
            Some(ToolbarAction::Undo) => can_undo,
            Some(_) => true,
            None => false,
        }
    }

    /// Action for a click at `point`, if it lands on an enabled control
    pub fn click(&self, point: Point, can_undo: bool) -> Option<ToolbarAction> {
        let id = self.hit_test(point)?;
        if !self.is_enabled(id, can_undo) {
            return None;
        }
        self.action(id)
    }
}
