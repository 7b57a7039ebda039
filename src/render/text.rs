//! Glyph rendering for text annotations and the selection size badge
//!
//! Glyph outlines come from ab_glyph and are turned into path segments in
//! logical (y-up) coordinates, so text goes through the same transform and
//! fill pipeline as every other shape.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ab_glyph::{Font, FontArc, GlyphId, OutlineCurve, PxScale, ScaleFont};
use anyhow::Context;

use crate::domain::{PathSegment, Point, Size};

/// Well-known font locations tried when no font is configured
const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// A loaded font, cheap to clone and share between engines
#[derive(Clone)]
pub struct TextRenderer {
    font: FontArc,
    source: Arc<PathBuf>,
}

impl std::fmt::Debug for TextRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextRenderer")
            .field("source", &self.source)
            .finish()
    }
}

impl TextRenderer {
    /// Load a font file
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let data =
            std::fs::read(path).with_context(|| format!("reading font {}", path.display()))?;
        let font = FontArc::try_from_vec(data)
            .map_err(|err| anyhow::anyhow!("invalid font {}: {err}", path.display()))?;
        Ok(Self {
            font,
            source: Arc::new(path.to_path_buf()),
        })
    }

    /// Load the configured font, or the first system font that exists.
    ///
    /// Returns `None` (after logging) when nothing usable is found; callers
    /// then skip glyph drawing but keep text in the model.
    pub fn discover(configured: Option<&Path>) -> Option<Self> {
        if let Some(path) = configured {
            match Self::from_file(path) {
                Ok(renderer) => return Some(renderer),
                Err(err) => log::warn!("Configured font unusable, trying system fonts: {err:?}"),
            }
        }

        for candidate in SYSTEM_FONTS.iter().map(Path::new) {
            if !candidate.exists() {
                continue;
            }
            match Self::from_file(candidate) {
                Ok(renderer) => {
                    log::debug!("Using font {}", candidate.display());
                    return Some(renderer);
                }
                Err(err) => log::debug!("Skipping font: {err:?}"),
            }
        }

        log::warn!("No usable font found, text will not be rendered");
        None
    }

    /// Logical extent of `text` at `size`, as laid out by [`Self::text_path`]
    pub fn measure(&self, text: &str, size: f32) -> Size {
        let scaled = self.font.as_scaled(PxScale::from(size));
        let width = text
            .lines()
            .map(|line| self.line_advance(line, size))
            .fold(0.0f32, f32::max);
        let extra_lines = text.lines().count().saturating_sub(1) as f32;
        let height = scaled.height() + extra_lines * (scaled.height() + scaled.line_gap());
        Size::new(width, height)
    }

    fn line_advance(&self, line: &str, size: f32) -> f32 {
        let scaled = self.font.as_scaled(PxScale::from(size));
        let mut advance = 0.0;
        let mut prev: Option<GlyphId> = None;
        for ch in line.chars() {
            let id = self.font.glyph_id(ch);
            if let Some(prev) = prev {
                advance += scaled.kern(prev, id);
            }
            advance += scaled.h_advance(id);
            prev = Some(id);
        }
        advance
    }

    /// Glyph outlines for `text` with its bottom-left corner at `origin`.
    ///
    /// Lines stack downward from the first; `origin` is the bottom of the
    /// last line's box, matching how the annotation anchor is placed.
    pub fn text_path(&self, text: &str, size: f32, origin: Point) -> Vec<PathSegment> {
        let scaled = self.font.as_scaled(PxScale::from(size));
        let factor = scaled.scale_factor();
        let line_height = scaled.height() + scaled.line_gap();
        let lines: Vec<&str> = text.lines().collect();
        let mut segments = Vec::new();

        for (i, line) in lines.iter().enumerate() {
            let from_bottom = (lines.len() - 1 - i) as f32;
            let baseline = origin.y - scaled.descent() + from_bottom * line_height;
            let mut caret = origin.x;
            let mut prev: Option<GlyphId> = None;

            for ch in line.chars() {
                let id = self.font.glyph_id(ch);
                if let Some(prev) = prev {
                    caret += scaled.kern(prev, id);
                }
                if let Some(outline) = self.font.outline(id) {
                    let place = |p: ab_glyph::Point| {
                        Point::new(
                            caret + p.x * factor.horizontal,
                            baseline + p.y * factor.vertical,
                        )
                    };
                    append_outline(&mut segments, &outline.curves, place);
                }
                caret += scaled.h_advance(id);
                prev = Some(id);
            }
        }

        segments
    }
}

/// Convert outline curves into closed contours
fn append_outline(
    segments: &mut Vec<PathSegment>,
    curves: &[OutlineCurve],
    place: impl Fn(ab_glyph::Point) -> Point,
) {
    let mut cursor: Option<ab_glyph::Point> = None;
    for curve in curves {
        let start = match curve {
            OutlineCurve::Line(a, _)
            | OutlineCurve::Quad(a, _, _)
            | OutlineCurve::Cubic(a, _, _, _) => *a,
        };
        if cursor != Some(start) {
            if cursor.is_some() {
                segments.push(PathSegment::Close);
            }
            segments.push(PathSegment::MoveTo(place(start)));
        }
        let end = match curve {
            OutlineCurve::Line(_, b) => {
                segments.push(PathSegment::LineTo(place(*b)));
                *b
            }
            OutlineCurve::Quad(a, c, b) => {
                // Degree-elevate to a cubic
                let elevate = |from: &ab_glyph::Point| {
                    ab_glyph::point(
                        from.x + (c.x - from.x) * 2.0 / 3.0,
                        from.y + (c.y - from.y) * 2.0 / 3.0,
                    )
                };
                let (c1, c2) = (elevate(a), elevate(b));
                segments.push(PathSegment::CubicTo(place(c1), place(c2), place(*b)));
                *b
            }
            OutlineCurve::Cubic(_, c1, c2, b) => {
                segments.push(PathSegment::CubicTo(place(*c1), place(*c2), place(*b)));
                *b
            }
        };
        cursor = Some(end);
    }
    if cursor.is_some() {
        segments.push(PathSegment::Close);
    }
}
