//! Output resolution and saving.
//!
//! Picks the destination format from the target path, decides whether alpha
//! must be dropped, encodes in memory and writes exactly one file.
//!
//! # Format policy
//!
//! The color model is chosen from the target extension alone. Extensions in
//! [`ALPHA_INCAPABLE_EXTENSIONS`] are written as RGB; every other supported
//! extension keeps RGBA. The pixel data is never inspected.

use std::io::Write;
use std::path::{Path, PathBuf};

use image::ImageFormat;

use super::config::OutputConfig;
use super::encoder::{rgba_to_rgb, EncoderFactory};
use super::loader::RasterImage;
use super::WatermarkError;

/// Extensions whose container has no per-pixel transparency.
pub const ALPHA_INCAPABLE_EXTENSIONS: &[&str] = &["jpg", "jpeg"];

/// Supported destination formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Png,
    Jpeg,
    Bmp,
    Gif,
    Tiff,
    WebP,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 6] = [
        Self::Png,
        Self::Jpeg,
        Self::Bmp,
        Self::Gif,
        Self::Tiff,
        Self::WebP,
    ];

    /// Container name as reported by decoders ("PNG", "JPEG", ...).
    pub fn name(&self) -> &'static str {
        match self {
            Self::Png => "PNG",
            Self::Jpeg => "JPEG",
            Self::Bmp => "BMP",
            Self::Gif => "GIF",
            Self::Tiff => "TIFF",
            Self::WebP => "WEBP",
        }
    }

    /// Extension inferred for this format: the lower-cased container name.
    pub fn default_extension(&self) -> String {
        self.name().to_lowercase()
    }

    /// Parse a file extension (without the dot, any case).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "bmp" => Some(Self::Bmp),
            "gif" => Some(Self::Gif),
            "tif" | "tiff" => Some(Self::Tiff),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Map a decoder-reported format, if it is one we can write back.
    pub fn from_image_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Png => Some(Self::Png),
            ImageFormat::Jpeg => Some(Self::Jpeg),
            ImageFormat::Bmp => Some(Self::Bmp),
            ImageFormat::Gif => Some(Self::Gif),
            ImageFormat::Tiff => Some(Self::Tiff),
            ImageFormat::WebP => Some(Self::WebP),
            _ => None,
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Channel layout written to the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorModel {
    Rgba,
    Rgb,
}

impl ColorModel {
    /// Color model implied by a target extension.
    pub fn for_extension(ext: &str) -> Self {
        let ext = ext.trim_start_matches('.').to_lowercase();
        if ALPHA_INCAPABLE_EXTENSIONS.contains(&ext.as_str()) {
            Self::Rgb
        } else {
            Self::Rgba
        }
    }

    pub fn channels(&self) -> u8 {
        match self {
            Self::Rgba => 4,
            Self::Rgb => 3,
        }
    }
}

/// A resolved destination: final path, encoder and color model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    pub path: PathBuf,
    pub format: OutputFormat,
    pub color_model: ColorModel,
}

/// A trailing separator, a missing file name or an existing directory.
fn names_directory(path: &Path) -> bool {
    let raw = path.as_os_str().to_string_lossy();
    raw.ends_with('/')
        || raw.ends_with(std::path::MAIN_SEPARATOR)
        || path.file_name().is_none()
        || path.is_dir()
}

/// Resolve the destination for a save.
///
/// When `path` has no extension, one is appended: the lower-cased name of
/// `original_format`, or `config.default_extension` when the source format is
/// unknown.
///
/// # Errors
///
/// Returns `WatermarkError::Encode` when the destination names a directory
/// or its extension is not a supported image format.
pub fn resolve_target(
    path: &Path,
    original_format: Option<OutputFormat>,
    config: &OutputConfig,
) -> Result<OutputTarget, WatermarkError> {
    if names_directory(path) {
        return Err(WatermarkError::encode(
            path,
            "destination names a directory, not a file",
        ));
    }

    let path = match path.extension() {
        Some(_) => path.to_path_buf(),
        None => {
            let ext = original_format
                .map(|f| f.default_extension())
                .unwrap_or_else(|| config.default_extension.to_lowercase());
            tracing::debug!(
                path = %path.display(),
                extension = %ext,
                "Destination has no extension, inferring one"
            );
            let mut name = path.as_os_str().to_os_string();
            name.push(".");
            name.push(&ext);
            PathBuf::from(name)
        }
    };

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_string();

    let format = OutputFormat::from_extension(&ext).ok_or_else(|| {
        WatermarkError::encode(&path, format!("unsupported image extension '{}'", ext))
    })?;

    Ok(OutputTarget {
        color_model: ColorModel::for_extension(&ext),
        path,
        format,
    })
}

/// Encode `image` for `target` and write it.
///
/// The image is fully encoded in memory, written to a temporary file in the
/// destination directory and renamed into place, so a failed save never
/// leaves a file at `target.path`.
pub fn resolve_and_save(
    image: &RasterImage,
    target: &OutputTarget,
    config: &OutputConfig,
) -> Result<PathBuf, WatermarkError> {
    let (width, height) = image.pixels.dimensions();

    let data = match target.color_model {
        ColorModel::Rgba => image.pixels.as_raw().clone(),
        ColorModel::Rgb => rgba_to_rgb(image.pixels.as_raw()),
    };

    let encoder = EncoderFactory::create(target.format, config.jpeg_quality);
    let encoded = encoder
        .encode(&data, width, height, target.color_model)
        .map_err(|e| WatermarkError::encode(&target.path, e))?;

    write_atomically(&target.path, &encoded.data)?;

    tracing::info!(
        path = %target.path.display(),
        format = %target.format,
        channels = target.color_model.channels(),
        bytes = encoded.data.len(),
        "Saved watermarked image"
    );

    Ok(target.path.clone())
}

fn write_atomically(path: &Path, data: &[u8]) -> Result<(), WatermarkError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(|e| {
        WatermarkError::encode(path, format!("cannot write to {}: {}", dir.display(), e))
    })?;
    tmp.write_all(data)
        .and_then(|_| tmp.flush())
        .map_err(|e| WatermarkError::encode(path, e.to_string()))?;
    tmp.persist(path)
        .map_err(|e| WatermarkError::encode(path, e.error.to_string()))?;

    Ok(())
}
