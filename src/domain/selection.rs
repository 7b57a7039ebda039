//! Selection types for region capture

use super::geometry::Rect;

/// A finalized capture region in surface-local coordinates
pub type SelectionRect = Rect;

/// Side length a selection must strictly exceed on both axes
pub const MIN_SELECTION_SIZE: f32 = 5.0;

/// Lifecycle of one selection session
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub enum SelectionState {
    /// Surface shown, waiting for the first pointer press
    #[default]
    Idle,
    /// Pointer held down, live rectangle follows the pointer
    Dragging,
    /// A valid rectangle was emitted
    Finalized(SelectionRect),
    /// The gesture was abandoned or too small
    Cancelled,
}

impl SelectionState {
    /// Terminal states end the session and close the surface
    pub fn is_terminal(&self) -> bool {
        matches!(self, SelectionState::Finalized(_) | SelectionState::Cancelled)
    }
}

/// Result handed to the orchestrator when a session ends
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionOutcome {
    Finalized(SelectionRect),
    Cancelled,
}

impl From<SelectionOutcome> for SelectionState {
    fn from(outcome: SelectionOutcome) -> Self {
        match outcome {
            SelectionOutcome::Finalized(rect) => SelectionState::Finalized(rect),
            SelectionOutcome::Cancelled => SelectionState::Cancelled,
        }
    }
}
