//! Font resolution with a built-in bitmap fallback.
//!
//! The configured TrueType font is looked up as a path first, then in each
//! search directory. When it cannot be found or parsed, the 8x8 bitmap font
//! from `font8x8` is used instead. Resolution never fails.

use std::path::{Path, PathBuf};

use ab_glyph::FontVec;

use super::config::FontConfig;

/// Pixel size of the bitmap fallback font.
pub const BITMAP_FONT_SIZE: u32 = 8;

/// Why the TrueType font could not be used.
#[derive(Debug, thiserror::Error)]
pub enum FontError {
    #[error("font '{name}' not found in any search location")]
    NotFound { name: String },

    #[error("font file {} is not a valid TrueType font: {message}", path.display())]
    Invalid { path: PathBuf, message: String },
}

/// Which branch of font resolution produced a font.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontKind {
    TrueType,
    Bitmap,
}

/// A font ready for measuring and rendering.
pub enum WatermarkFont {
    TrueType {
        font: FontVec,
        /// Pixel height the font is scaled to
        size: f32,
        path: PathBuf,
    },
    Bitmap,
}

impl WatermarkFont {
    pub fn kind(&self) -> FontKind {
        match self {
            Self::TrueType { .. } => FontKind::TrueType,
            Self::Bitmap => FontKind::Bitmap,
        }
    }

    /// Nominal pixel size of the font.
    pub fn pixel_size(&self) -> f32 {
        match self {
            Self::TrueType { size, .. } => *size,
            Self::Bitmap => BITMAP_FONT_SIZE as f32,
        }
    }
}

impl std::fmt::Debug for WatermarkFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TrueType { size, path, .. } => f
                .debug_struct("TrueType")
                .field("size", size)
                .field("path", path)
                .finish_non_exhaustive(),
            Self::Bitmap => f.write_str("Bitmap"),
        }
    }
}

/// Load the configured TrueType font.
///
/// Candidate locations are `config.name` itself, then `config.name` joined to
/// each entry of `config.search_dirs`, in order. The first existing file wins;
/// a parse failure on it is reported rather than moving on.
pub fn load_truetype(config: &FontConfig) -> Result<WatermarkFont, FontError> {
    let path = candidate_paths(config)
        .into_iter()
        .find(|p| p.is_file())
        .ok_or_else(|| FontError::NotFound {
            name: config.name.clone(),
        })?;

    let data = std::fs::read(&path).map_err(|e| FontError::Invalid {
        path: path.clone(),
        message: e.to_string(),
    })?;

    let font = FontVec::try_from_vec(data).map_err(|e| FontError::Invalid {
        path: path.clone(),
        message: e.to_string(),
    })?;

    Ok(WatermarkFont::TrueType {
        font,
        size: config.size as f32,
        path,
    })
}

/// Load the configured TrueType font, or the bitmap font if that fails.
pub fn load_font_or_fallback(config: &FontConfig) -> WatermarkFont {
    match load_truetype(config) {
        Ok(font) => {
            tracing::debug!(font = ?font, "Loaded TrueType font");
            font
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                fallback_size = BITMAP_FONT_SIZE,
                "TrueType font unavailable, using built-in bitmap font"
            );
            WatermarkFont::Bitmap
        }
    }
}

fn candidate_paths(config: &FontConfig) -> Vec<PathBuf> {
    let name = Path::new(&config.name);
    let mut paths = vec![name.to_path_buf()];
    if name.is_relative() {
        paths.extend(config.search_dirs.iter().map(|dir| Path::new(dir).join(name)));
    }
    paths
}
