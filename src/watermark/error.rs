//! Watermark error types.
//!
//! Defines the terminal failures of a watermark run. Font problems are not
//! listed here: they are recovered inside [`super::font`] and never reach
//! the caller.

use std::path::{Path, PathBuf};

/// Errors that can end a watermark run.
#[derive(Debug, thiserror::Error)]
pub enum WatermarkError {
    /// Source file could not be read or is not a supported raster image
    #[error("Failed to decode {}: {message}", path.display())]
    Decode { path: PathBuf, message: String },

    /// Target format is unsupported or the destination is not writable
    #[error("Failed to encode {}: {message}", target.display())]
    Encode { target: PathBuf, message: String },

    /// Overlay and base image disagree on dimensions
    #[error("Failed to composite watermark: {0}")]
    Composite(String),
}

impl WatermarkError {
    pub fn decode(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self::Decode {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }

    pub fn encode(target: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self::Encode {
            target: target.as_ref().to_path_buf(),
            message: message.into(),
        }
    }

    /// Whether the error came from reading the source image.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }

    /// Whether the error came from writing the destination image.
    pub fn is_encode(&self) -> bool {
        matches!(self, Self::Encode { .. })
    }
}
