//! Per-invocation watermark run.
//!
//! A run moves forward through
//! `Idle -> Loaded -> Measured -> Composited -> Saved`, or ends in `Failed`
//! when loading or saving fails. It is split in two calls that match how an
//! interactive caller drives it: [`Watermarker::prepare`] takes the source and
//! text, [`PreparedWatermark::save`] takes the destination. Nothing is written
//! before `save`.

use std::fmt;
use std::path::{Path, PathBuf};

use super::compositor::composite;
use super::config::{FontConfig, LoaderConfig, OutputConfig, TextWatermarkConfig, WatermarkPosition};
use super::font::{load_font_or_fallback, FontKind, WatermarkFont};
use super::loader::{load, RasterImage};
use super::output::{resolve_and_save, resolve_target, ColorModel, OutputFormat};
use super::position::{calculate_position, fits_within, ImageDimensions, PlacementPosition};
use super::text_renderer::{measure_text, parse_hex_color, render_overlay, Color, TextMetrics};
use super::WatermarkError;

/// Stage of a watermark run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Loaded,
    Measured,
    Composited,
    Saved,
    Failed,
}

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loaded => "loaded",
            Self::Measured => "measured",
            Self::Composited => "composited",
            Self::Saved => "saved",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the watermark text is drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font: FontConfig,
    pub color: Color,
    /// 0.0 (invisible) to 1.0 (opaque)
    pub opacity: f32,
    pub margin: u32,
    pub position: WatermarkPosition,
}

impl TextStyle {
    /// Build a style from validated configuration.
    pub fn from_config(config: &TextWatermarkConfig) -> Result<Self, String> {
        config.validate()?;
        Ok(Self {
            font: config.font.clone(),
            color: parse_hex_color(&config.color)?,
            opacity: config.opacity,
            margin: config.margin,
            position: config.position,
        })
    }

    /// Fill alpha for the glyphs, `round(opacity * 255)`.
    pub fn fill_alpha(&self) -> u8 {
        let opacity = if self.opacity.is_finite() {
            self.opacity.clamp(0.0, 1.0)
        } else {
            0.0
        };
        (opacity * 255.0).round() as u8
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        let config = TextWatermarkConfig::default();
        Self {
            font: config.font,
            color: Color::white(),
            opacity: config.opacity,
            margin: config.margin,
            position: config.position,
        }
    }
}

/// The text to stamp and how to draw it. The text may be empty.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WatermarkSpec {
    pub text: String,
    pub style: TextStyle,
}

impl WatermarkSpec {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: TextStyle::default(),
        }
    }

    pub fn with_style(mut self, style: TextStyle) -> Self {
        self.style = style;
        self
    }
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// File that was written
    pub path: PathBuf,
    pub format: OutputFormat,
    pub color_model: ColorModel,
    /// The caller should clear its watermark-text input
    pub reset_text_input: bool,
}

/// A failed run.
#[derive(Debug, thiserror::Error)]
#[error("watermark run failed after reaching '{state}': {error}")]
pub struct RunFailure {
    /// Last state reached before the failure
    pub state: RunState,
    #[source]
    pub error: WatermarkError,
}

impl RunFailure {
    fn new(state: RunState, error: WatermarkError) -> Self {
        tracing::warn!(state = %state, error = %error, "Watermark run failed");
        Self { state, error }
    }

    /// Always `RunState::Failed`.
    pub fn final_state(&self) -> RunState {
        RunState::Failed
    }
}

/// Runs watermark jobs with a fixed configuration.
///
/// Holds no per-run state, so one instance can serve any number of
/// sequential or concurrent runs.
#[derive(Debug)]
pub struct Watermarker {
    font_config: FontConfig,
    font: WatermarkFont,
    output: OutputConfig,
    loader: LoaderConfig,
}

impl Watermarker {
    /// Create a watermarker, resolving `font` once up front.
    pub fn new(font: FontConfig, output: OutputConfig, loader: LoaderConfig) -> Self {
        let resolved = load_font_or_fallback(&font);
        Self {
            font_config: font,
            font: resolved,
            output,
            loader,
        }
    }

    /// Which branch of font resolution the default font came from.
    pub fn font_kind(&self) -> FontKind {
        self.font.kind()
    }

    /// Load `source`, lay out and composite the text.
    ///
    /// Covers `Idle -> Loaded -> Measured -> Composited`.
    pub fn prepare(
        &self,
        source: &Path,
        spec: &WatermarkSpec,
    ) -> Result<PreparedWatermark<'_>, RunFailure> {
        tracing::info!(
            source = %source.display(),
            text_len = spec.text.chars().count(),
            "Starting watermark run"
        );

        let image = load(source, &self.loader).map_err(|e| RunFailure::new(RunState::Idle, e))?;
        transition(RunState::Idle, RunState::Loaded);

        // A style naming a different font than the one resolved up front gets
        // its own lookup for this run.
        let run_font;
        let font = if spec.style.font == self.font_config {
            &self.font
        } else {
            run_font = load_font_or_fallback(&spec.style.font);
            &run_font
        };

        let metrics = measure_text(&spec.text, font);
        let canvas = ImageDimensions {
            width: image.width(),
            height: image.height(),
        };
        let text_dims = metrics.dimensions();
        let position = calculate_position(spec.style.position, &canvas, &text_dims, spec.style.margin);

        if !metrics.is_empty() && !fits_within(&position, &canvas, &text_dims) {
            tracing::warn!(
                x = position.x,
                y = position.y,
                text_width = text_dims.width,
                text_height = text_dims.height,
                canvas_width = canvas.width,
                canvas_height = canvas.height,
                "Watermark text does not fit the image and will be clipped"
            );
        }
        transition(RunState::Loaded, RunState::Measured);

        let composited = if metrics.is_empty() {
            tracing::debug!("Watermark text has no visible glyphs, skipping overlay");
            image
        } else {
            let overlay = render_overlay(
                image.dimensions(),
                &spec.text,
                font,
                position,
                spec.style.color,
                spec.style.fill_alpha(),
            );
            composite(&image, &overlay).map_err(|e| RunFailure::new(RunState::Measured, e))?
        };
        transition(RunState::Measured, RunState::Composited);

        Ok(PreparedWatermark {
            watermarker: self,
            source: source.to_path_buf(),
            image: composited,
            metrics,
            position,
        })
    }

    /// Prepare and save in one call.
    pub fn run(
        &self,
        source: &Path,
        spec: &WatermarkSpec,
        destination: &Path,
    ) -> Result<RunOutcome, RunFailure> {
        self.prepare(source, spec)?.save(destination)
    }
}

/// A composited image waiting for its destination.
#[derive(Debug)]
pub struct PreparedWatermark<'a> {
    watermarker: &'a Watermarker,
    source: PathBuf,
    image: RasterImage,
    metrics: TextMetrics,
    position: PlacementPosition,
}

impl PreparedWatermark<'_> {
    pub fn state(&self) -> RunState {
        RunState::Composited
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn image(&self) -> &RasterImage {
        &self.image
    }

    pub fn metrics(&self) -> TextMetrics {
        self.metrics
    }

    /// Anchor of the text's top-left corner on the image.
    pub fn position(&self) -> PlacementPosition {
        self.position
    }

    /// Encode and write the image to `destination`.
    ///
    /// Covers `Composited -> Saved`. When `destination` has no extension one
    /// is inferred from the source format.
    pub fn save(self, destination: &Path) -> Result<RunOutcome, RunFailure> {
        let output = &self.watermarker.output;

        let target = resolve_target(destination, self.image.format, output)
            .map_err(|e| RunFailure::new(RunState::Composited, e))?;
        let path = resolve_and_save(&self.image, &target, output)
            .map_err(|e| RunFailure::new(RunState::Composited, e))?;
        transition(RunState::Composited, RunState::Saved);

        Ok(RunOutcome {
            path,
            format: target.format,
            color_model: target.color_model,
            reset_text_input: true,
        })
    }
}

fn transition(from: RunState, to: RunState) {
    tracing::debug!(from = %from, to = %to, "Watermark run state changed");
}
