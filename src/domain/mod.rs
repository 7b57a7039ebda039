//! Pure domain types with minimal dependencies
//!
//! This module contains core types used throughout the crate.
//! Types here should have no rendering dependencies (tiny-skia, image, etc.)
//! so both engines and the session layer can share them freely.

pub mod annotation;
pub mod geometry;
pub mod selection;

pub use annotation::*;
pub use geometry::*;
pub use selection::*;
