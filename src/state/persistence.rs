use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use image::ImageFormat;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::surface::Surface;

pub const PROJECT_EXTENSION: &str = "wbrd";
pub const PROJECT_VERSION: u32 = 1;

/// Errors that can occur while saving, loading or exporting a board
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode project: {0}")]
    Encode(#[from] bincode::Error),

    #[error("Failed to write image: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid project data: {0}")]
    InvalidData(String),

    #[error("Unsupported project version {0}")]
    UnsupportedVersion(u32),
}

/// Result type for persistence operations
pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// On-disk board: the whole surface as tightly packed RGBA rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectFile {
    pub version: u32,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl ProjectFile {
    pub fn from_surface(surface: &Surface) -> Self {
        Self {
            version: PROJECT_VERSION,
            width: surface.width(),
            height: surface.height(),
            pixels: surface.to_rgba_bytes(),
        }
    }

    /// Rebuild a surface of exactly `width x height`, centering the stored
    /// pixels when the sizes differ.
    pub fn into_surface(self, width: u32, height: u32, background: egui::Color32) -> PersistenceResult<Surface> {
        if self.version != PROJECT_VERSION {
            return Err(PersistenceError::UnsupportedVersion(self.version));
        }
        let stored = Surface::from_rgba(self.width, self.height, &self.pixels, background).ok_or_else(|| {
            PersistenceError::InvalidData(format!(
                "{} bytes do not describe a {}x{} image",
                self.pixels.len(),
                self.width,
                self.height
            ))
        })?;
        if stored.width() == width && stored.height() == height {
            Ok(stored)
        } else {
            log::info!(
                "Re-centering {}x{} project on a {}x{} world",
                stored.width(),
                stored.height(),
                width,
                height
            );
            Ok(stored.recentered(width, height))
        }
    }
}

pub fn save_project(surface: &Surface, path: &Path) -> PersistenceResult<()> {
    let writer = BufWriter::new(File::create(path)?);
    bincode::serialize_into(writer, &ProjectFile::from_surface(surface))?;
    log::info!("Saved project to {}", path.display());
    Ok(())
}

pub fn load_project(path: &Path) -> PersistenceResult<ProjectFile> {
    let reader = BufReader::new(File::open(path)?);
    let project: ProjectFile = bincode::deserialize_from(reader)?;
    log::info!("Loaded {}x{} project from {}", project.width, project.height, path.display());
    Ok(project)
}

/// Write the full surface 1:1. The format follows the extension; unknown or
/// missing extensions write PNG.
pub fn export_image(surface: &Surface, path: &Path) -> PersistenceResult<()> {
    let format = ImageFormat::from_path(path).unwrap_or(ImageFormat::Png);
    let rgba = surface.to_rgba_image();
    match format {
        // No alpha channel in JPEG.
        ImageFormat::Jpeg => image::DynamicImage::ImageRgba8(rgba)
            .to_rgb8()
            .save_with_format(path, format)?,
        _ => rgba.save_with_format(path, format)?,
    }
    log::info!("Exported {}x{} image to {}", surface.width(), surface.height(), path.display());
    Ok(())
}
