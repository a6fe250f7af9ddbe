// Error types module

use crate::watermark::{RunFailure, WatermarkError};

/// Top-level application error.
///
/// Separates problems with the caller's setup (bad configuration) from
/// failures of the watermark run itself.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration errors (invalid YAML, missing env vars, out-of-range values)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The watermark run failed to load or save an image
    #[error(transparent)]
    Watermark(#[from] WatermarkError),
}

impl From<RunFailure> for AppError {
    fn from(failure: RunFailure) -> Self {
        Self::Watermark(failure.error)
    }
}
