//! Saving flattened screenshots
//!
//! Exporters receive an owned snapshot from
//! [`AnnotationCanvas::render_flattened_image`](crate::widget::annotation_canvas::AnnotationCanvas::render_flattened_image),
//! so they may run on another thread while the user keeps editing.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use image::RgbaImage;

use crate::config::SnapMarkConfig;

/// Which collaborator handled an export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportKind {
    Clipboard,
    File,
    Print,
    Upload,
}

/// Result reported by an exporter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// Written to a file
    Saved(PathBuf),
    /// Handed to the clipboard
    Copied,
    /// Sent to the print system
    Printed,
    /// Uploaded; carries the public URL
    Uploaded(String),
}

/// Consumer of a flattened screenshot (clipboard, file, print, upload)
pub trait Exporter {
    fn kind(&self) -> ExportKind;

    fn export(&self, image: RgbaImage) -> anyhow::Result<ExportOutcome>;
}

/// Saves PNG files with timestamped names into a folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileExporter {
    folder: PathBuf,
}

impl FileExporter {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
        }
    }

    /// Exporter for the configured save folder
    pub fn from_config(config: &SnapMarkConfig) -> Option<Self> {
        config.save_folder().map(Self::new)
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }
}

impl Exporter for FileExporter {
    fn kind(&self) -> ExportKind {
        ExportKind::File
    }

    fn export(&self, image: RgbaImage) -> anyhow::Result<ExportOutcome> {
        let path = image_path(&self.folder)?;
        save_rgba(&image, &path)?;
        log::info!("Saved screenshot to {}", path.display());
        Ok(ExportOutcome::Saved(path))
    }
}

pub fn save_rgba(img: &RgbaImage, path: &Path) -> anyhow::Result<()> {
    let file =
        std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = io::BufWriter::new(file);
    write_png(&mut writer, img).with_context(|| format!("encoding {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

pub fn save_rgba_to_buffer(img: &RgbaImage, buffer: &mut Vec<u8>) -> anyhow::Result<()> {
    Ok(write_png(buffer, img)?)
}

/// A fresh `Screenshot YYYY-MM-DD HH.MM.SS.png` path inside `folder`.
///
/// The folder is created if needed. A numeric suffix is added when a
/// screenshot was already saved within the same second.
pub fn image_path(folder: &Path) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(folder)
        .with_context(|| format!("creating save folder {}", folder.display()))?;

    let stem = chrono::Local::now()
        .format("Screenshot %Y-%m-%d %H.%M.%S")
        .to_string();
    let mut path = folder.join(format!("{stem}.png"));
    let mut n = 2;
    while path.exists() {
        path = folder.join(format!("{stem} ({n}).png"));
        n += 1;
    }
    Ok(path)
}

/// Write the image to a kept temporary PNG for collaborators that need a path
pub fn save_to_temp(img: &RgbaImage) -> anyhow::Result<PathBuf> {
    let mut file = tempfile::Builder::new()
        .prefix("screenshot-")
        .suffix(".png")
        .tempfile()?;
    write_png(&mut file, img)?;
    let (_, path) = file.keep()?;
    Ok(path)
}

/// Encode and write on the blocking pool, taking the snapshot by value
pub async fn save_async(img: RgbaImage, path: PathBuf) -> anyhow::Result<PathBuf> {
    tokio::task::spawn_blocking(move || -> anyhow::Result<_> {
        save_rgba(&img, &path)?;
        Ok(path)
    })
    .await?
}

fn write_png<W: io::Write>(w: W, image: &RgbaImage) -> Result<(), png::EncodingError> {
    let mut encoder = png::Encoder::new(w, image.width(), image.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(image.as_raw())?;
    writer.finish()
}
