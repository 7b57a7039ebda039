//! Interaction engines and the drawing helpers they share
//!
//! - `rectangle_selection`: region selection state machine and overlay
//! - `annotation_canvas`: the drawing model with preview and flatten
//! - `toolbar`: layout and hit testing for the tool and action bars

pub mod annotation_canvas;
pub mod drawing;
pub mod rectangle_selection;
pub mod toolbar;
