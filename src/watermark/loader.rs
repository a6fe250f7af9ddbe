//! Source image loading.

use std::io::Cursor;
use std::path::Path;

use image::io::Reader as ImageReader;
use image::RgbaImage;

use super::config::LoaderConfig;
use super::output::OutputFormat;
use super::WatermarkError;

/// A decoded source image, normalized to RGBA8.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pub pixels: RgbaImage,
    /// Container the bytes were decoded from, kept for extension inference
    pub format: Option<OutputFormat>,
}

impl RasterImage {
    pub fn new(pixels: RgbaImage, format: Option<OutputFormat>) -> Self {
        Self { pixels, format }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }
}

/// Load and normalize the image at `path`.
///
/// The format is guessed from the file content. Header dimensions are checked
/// against `config.max_pixels` before the full decode.
pub fn load(path: &Path, config: &LoaderConfig) -> Result<RasterImage, WatermarkError> {
    let data = std::fs::read(path).map_err(|e| WatermarkError::decode(path, e.to_string()))?;

    let reader = ImageReader::new(Cursor::new(data.as_slice()))
        .with_guessed_format()
        .map_err(|e| WatermarkError::decode(path, e.to_string()))?;

    let detected = reader.format();
    let format = detected.and_then(OutputFormat::from_image_format);
    if format.is_none() {
        return Err(WatermarkError::decode(path, "unsupported or unrecognized image format"));
    }

    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| WatermarkError::decode(path, e.to_string()))?;
    validate_dimensions(path, width, height, config)?;

    let decoded = ImageReader::new(Cursor::new(data.as_slice()))
        .with_guessed_format()
        .map_err(|e| WatermarkError::decode(path, e.to_string()))?
        .decode()
        .map_err(|e| WatermarkError::decode(path, e.to_string()))?;

    tracing::debug!(
        path = %path.display(),
        width,
        height,
        source_color = ?decoded.color(),
        format = ?format,
        "Decoded source image"
    );

    Ok(RasterImage::new(decoded.to_rgba8(), format))
}

fn validate_dimensions(
    path: &Path,
    width: u32,
    height: u32,
    config: &LoaderConfig,
) -> Result<(), WatermarkError> {
    let pixels = width as u64 * height as u64;
    if pixels > config.max_pixels {
        return Err(WatermarkError::decode(
            path,
            format!(
                "image is {}x{} ({} pixels), exceeding the limit of {} pixels",
                width, height, pixels, config.max_pixels
            ),
        ));
    }
    Ok(())
}
