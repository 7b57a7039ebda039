//! Capture session management
//!
//! This module contains:
//! - The session that owns the selection and annotation engines
//! - Message types for selection, drawing and export interactions
//! - Keyboard shortcut mapping

pub mod messages;
pub mod shortcuts;
pub mod state;
