//! Text watermarking engine.
//!
//! Stamps a semi-transparent line of text onto a raster image and writes the
//! result to a new file. A run is a single-threaded pipeline:
//!
//! 1. **Load** ([`loader`]): decode the source, normalize to RGBA8 and keep the
//!    source format tag.
//! 2. **Measure** ([`font`], [`text_renderer::measure_text`], [`position`]):
//!    resolve a font (TrueType or the built-in bitmap fallback), measure the
//!    text's ink box and compute the anchor.
//! 3. **Composite** ([`text_renderer::render_overlay`], [`compositor`]): draw
//!    the text onto a transparent layer and blend it over the source.
//! 4. **Save** ([`output`], [`encoder`]): pick the format and color model from
//!    the destination extension and write exactly one file.
//!
//! [`pipeline::Watermarker`] drives the stages and tracks [`RunState`].
//!
//! # Configuration Example
//!
//! ```yaml
//! watermark:
//!   font:
//!     name: arial.ttf
//!     size: 20
//!   color: "#FFFFFF"
//!   opacity: 0.5
//!   margin: 10
//!   position: bottom-right
//! ```

pub mod compositor;
pub mod config;
pub mod encoder;
pub mod error;
pub mod font;
pub mod loader;
pub mod output;
pub mod pipeline;
pub mod position;
pub mod text_renderer;

// Re-export main types for convenience
pub use compositor::{blend_pixels, composite};
pub use config::{FontConfig, LoaderConfig, OutputConfig, TextWatermarkConfig, WatermarkPosition};
pub use encoder::{EncodedImage, EncoderFactory, ImageEncoder};
pub use error::WatermarkError;
pub use font::{load_font_or_fallback, load_truetype, FontError, FontKind, WatermarkFont};
pub use loader::{load, RasterImage};
pub use output::{
    resolve_and_save, resolve_target, ColorModel, OutputFormat, OutputTarget,
    ALPHA_INCAPABLE_EXTENSIONS,
};
pub use pipeline::{
    PreparedWatermark, RunFailure, RunOutcome, RunState, TextStyle, WatermarkSpec, Watermarker,
};
pub use position::{calculate_position, fits_within, ImageDimensions, PlacementPosition, TextDimensions};
pub use text_renderer::{measure_text, parse_hex_color, render_overlay, Color, OverlayLayer, TextMetrics};
