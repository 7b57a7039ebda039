//! SnapMark: region selection and screenshot annotation
//!
//! The host shell owns windows, hotkeys and the platform capture API. This
//! crate provides the two interactive engines it drives:
//! - [`widget::rectangle_selection::SelectionEngine`] turns a pointer drag
//!   into a capture rectangle and renders the dimming overlay
//! - [`widget::annotation_canvas::AnnotationCanvas`] draws annotations over
//!   a captured bitmap and flattens the result for export
//!
//! [`session::state::CaptureSession`] wires them together.

pub mod annotations;
pub mod capture;
pub mod config;
pub mod domain;
pub mod export;
pub mod render;
pub mod session;
pub mod widget;

/// Install the `env_logger` backend; `RUST_LOG` overrides the default `warn` level
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
}
