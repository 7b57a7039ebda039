//! Configuration persistence for snapmark settings

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::domain::Tool;

/// Serializable color representation for config storage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Default for ShapeColor {
    fn default() -> Self {
        Self::RED
    }
}

impl ShapeColor {
    pub const RED: Self = Self::rgb(0.9, 0.1, 0.1);
    pub const ORANGE: Self = Self::rgb(1.0, 0.55, 0.0);
    pub const YELLOW: Self = Self::rgb(1.0, 0.9, 0.0);
    pub const GREEN: Self = Self::rgb(0.2, 0.75, 0.3);
    pub const BLUE: Self = Self::rgb(0.1, 0.45, 0.95);
    pub const PURPLE: Self = Self::rgb(0.6, 0.3, 0.85);
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);

    /// Colors offered by the toolbar's color button, in cycle order
    pub const PALETTE: [Self; 8] = [
        Self::RED,
        Self::ORANGE,
        Self::YELLOW,
        Self::GREEN,
        Self::BLUE,
        Self::PURPLE,
        Self::BLACK,
        Self::WHITE,
    ];

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Convert to image crate RGBA format (0-255)
    pub fn to_rgba_u8(self) -> [u8; 4] {
        [
            (self.r.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.g.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.b.clamp(0.0, 1.0) * 255.0).round() as u8,
            255,
        ]
    }

    /// Next palette entry; colors outside the palette restart the cycle
    pub fn next_in_palette(self) -> Self {
        match Self::PALETTE.iter().position(|c| *c == self) {
            Some(i) => Self::PALETTE[(i + 1) % Self::PALETTE.len()],
            None => Self::PALETTE[0],
        }
    }

    /// tiny-skia color with the given opacity applied
    pub fn with_alpha(self, alpha: f32) -> tiny_skia::Color {
        let [r, g, b, _] = self.to_rgba_u8();
        tiny_skia::Color::from_rgba8(r, g, b, (alpha.clamp(0.0, 1.0) * 255.0).round() as u8)
    }
}

impl From<ShapeColor> for tiny_skia::Color {
    fn from(c: ShapeColor) -> Self {
        c.with_alpha(1.0)
    }
}

/// Application configuration persisted between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapMarkConfig {
    /// Folder saved screenshots go to (None = Pictures/SnapMark)
    #[serde(default)]
    pub save_folder: Option<PathBuf>,
    /// Tool selected when an annotation session opens
    #[serde(default)]
    pub default_tool: Tool,
    /// Color for new annotations
    #[serde(default)]
    pub shape_color: ShapeColor,
    /// Stroke width for new annotations, in logical units
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f32,
    /// Font used for text annotations and the size badge (None = system search)
    #[serde(default)]
    pub font_path: Option<PathBuf>,
}

fn default_stroke_width() -> f32 {
    2.0
}

impl Default for SnapMarkConfig {
    fn default() -> Self {
        Self {
            save_folder: None,
            default_tool: Tool::Arrow,
            shape_color: ShapeColor::default(),
            stroke_width: default_stroke_width(),
            font_path: None,
        }
    }
}

impl SnapMarkConfig {
    /// Application directory name under the platform config dir
    pub const ID: &'static str = "snapmark";

    /// Location of the config file, if the platform has a config dir
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(Self::ID).join("config.json"))
    }

    /// Load configuration from disk, or return defaults if unavailable
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            log::warn!("No config directory available, using defaults");
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Error loading config, using defaults: {err:?}");
                Self::default()
            }
        }
    }

    /// Save configuration to disk
    pub fn save(&self) {
        let Some(path) = Self::path() else {
            log::error!("No config directory available, settings not saved");
            return;
        };
        if let Err(err) = self.save_to(&path) {
            log::error!("Failed to save config: {err:?}");
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let data = std::fs::read(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = serde_json::from_slice(&data)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating config dir {}", parent.display()))?;
        }
        let data = serde_json::to_vec_pretty(self)?;
        std::fs::write(path, data).with_context(|| format!("writing config {}", path.display()))?;
        Ok(())
    }

    /// Effective save folder: the configured one, else Pictures/SnapMark
    pub fn save_folder(&self) -> Option<PathBuf> {
        if let Some(folder) = &self.save_folder {
            return Some(folder.clone());
        }
        dirs::picture_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join("Pictures")))
            .map(|dir| dir.join("SnapMark"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = SnapMarkConfig {
            save_folder: Some(PathBuf::from("/tmp/shots")),
            default_tool: Tool::Marker,
            shape_color: ShapeColor::BLUE,
            stroke_width: 4.0,
            font_path: None,
        };
        config.save_to(&path).unwrap();

        assert_eq!(SnapMarkConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "default_tool": "Pencil" }"#).unwrap();

        let config = SnapMarkConfig::load_from(&path).unwrap();
        assert_eq!(config.default_tool, Tool::Pencil);
        assert_eq!(config.stroke_width, 2.0);
        assert_eq!(config.shape_color, ShapeColor::RED);
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(SnapMarkConfig::load_from(&path).is_err());
    }

    #[test]
    fn test_palette_cycle_wraps() {
        assert_eq!(ShapeColor::RED.next_in_palette(), ShapeColor::ORANGE);
        assert_eq!(ShapeColor::WHITE.next_in_palette(), ShapeColor::RED);
        assert_eq!(ShapeColor::rgb(0.3, 0.3, 0.3).next_in_palette(), ShapeColor::RED);
    }

    #[test]
    fn test_to_rgba_u8() {
        assert_eq!(ShapeColor::WHITE.to_rgba_u8(), [255, 255, 255, 255]);
        assert_eq!(ShapeColor::rgb(0.0, 1.0, 2.0).to_rgba_u8(), [0, 255, 255, 255]);
    }
}
