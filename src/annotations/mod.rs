//! Annotation tools and message handlers
//!
//! This module provides:
//! - Per-tool path building (`Tool::start_path` / `Tool::update_path`)
//! - Message handlers for DrawMsg

pub mod handlers;
pub mod tools;
