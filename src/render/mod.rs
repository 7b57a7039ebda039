//! Annotation rendering module
//!
//! This module contains:
//! - Geometry calculations shared between tools and rendering
//! - The logical-to-pixel coordinate frame
//! - Image rendering using tiny-skia (live preview and flattened export)
//! - Glyph outlines for text

pub mod coord;
pub mod geometry;
pub mod image;
pub mod text;
