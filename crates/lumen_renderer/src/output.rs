//! Render target and image file writers.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use lumen_math::Color;
use thiserror::Error;

use crate::color::color_to_rgb8;

/// Errors that can occur while writing an image.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("Pixel buffer size mismatch: {actual} != {expected}")]
    SizeMismatch { actual: usize, expected: usize },
}

/// Final color of every pixel, row-major from the top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Color::ZERO)
    }

    /// Create a new image buffer filled with one color.
    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width as usize * height as usize],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let i = self.index(x, y);
        self.pixels[i] = color;
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Quantise to tightly packed 8-bit RGB (values are clamped, no
    /// transfer function is applied).
    pub fn to_rgb8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);
        for color in &self.pixels {
            bytes.extend_from_slice(&color_to_rgb8(*color));
        }
        bytes
    }

    /// Save the image, picking the writer from the file extension.
    pub fn save(&self, path: &Path) -> Result<(), OutputError> {
        let backend = backend_for_path(path)?;
        backend.write(path, self.width, self.height, &self.to_rgb8())?;
        log::info!("Saved {}x{} image to {}", self.width, self.height, path.display());
        Ok(())
    }
}

/// An image file format writer.
///
/// Pixels are tightly packed RGB bytes, rows top to bottom.
pub trait ImageBackend {
    /// Write the image, creating parent directories as needed.
    fn write(&self, path: &Path, width: u32, height: u32, pixels: &[u8]) -> Result<(), OutputError>;

    /// File extension (lowercase, no dot).
    fn file_extension(&self) -> &'static str;
}

fn prepare(path: &Path, width: u32, height: u32, pixels: &[u8]) -> Result<(), OutputError> {
    let expected = width as usize * height as usize * 3;
    if pixels.len() != expected {
        return Err(OutputError::SizeMismatch {
            actual: pixels.len(),
            expected,
        });
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Binary PPM (P6) writer.
#[derive(Default, Clone, Copy, Debug)]
pub struct PpmBackend;

impl ImageBackend for PpmBackend {
    fn write(&self, path: &Path, width: u32, height: u32, pixels: &[u8]) -> Result<(), OutputError> {
        prepare(path, width, height, pixels)?;

        let mut writer = BufWriter::new(File::create(path)?);
        write!(writer, "P6\n{} {}\n255\n", width, height)?;
        writer.write_all(pixels)?;
        writer.flush()?;
        Ok(())
    }

    fn file_extension(&self) -> &'static str {
        "ppm"
    }
}

/// PNG writer using the `image` crate.
#[derive(Default, Clone, Copy, Debug)]
pub struct PngBackend;

impl ImageBackend for PngBackend {
    fn write(&self, path: &Path, width: u32, height: u32, pixels: &[u8]) -> Result<(), OutputError> {
        prepare(path, width, height, pixels)?;

        image::save_buffer_with_format(
            path,
            pixels,
            width,
            height,
            image::ColorType::Rgb8,
            image::ImageFormat::Png,
        )?;
        Ok(())
    }

    fn file_extension(&self) -> &'static str {
        "png"
    }
}

/// Writer matching the extension of `path` (case-insensitive).
pub fn backend_for_path(path: &Path) -> Result<Box<dyn ImageBackend>, OutputError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "ppm" => Ok(Box::new(PpmBackend)),
        "png" => Ok(Box::new(PngBackend)),
        _ => Err(OutputError::UnsupportedFormat(path.display().to_string())),
    }
}
