//! Blending the text overlay onto the source image.
//!
//! Uses the Porter-Duff "over" operator on straight (non-premultiplied)
//! alpha:
//!
//! ```text
//! out_a   = fg_a + bg_a * (1 - fg_a)
//! out_rgb = (fg_rgb * fg_a + bg_rgb * bg_a * (1 - fg_a)) / out_a
//! ```
//!
//! Over an opaque background this reduces to
//! `fg_rgb * fg_a + bg_rgb * (1 - fg_a)`. Background pixels under a fully
//! transparent overlay pixel are copied unchanged.

use image::Rgba;

use super::loader::RasterImage;
use super::text_renderer::OverlayLayer;
use super::WatermarkError;

/// Composite `overlay` over `base`, returning a new image.
///
/// The overlay must have the same dimensions as the base. The source format
/// tag is carried over.
pub fn composite(base: &RasterImage, overlay: &OverlayLayer) -> Result<RasterImage, WatermarkError> {
    if base.dimensions() != overlay.dimensions() {
        let (bw, bh) = base.dimensions();
        let (ow, oh) = overlay.dimensions();
        return Err(WatermarkError::Composite(format!(
            "overlay is {}x{}, base is {}x{}",
            ow, oh, bw, bh
        )));
    }

    let mut pixels = base.pixels.clone();
    let mut touched = 0u64;

    for (target, fg) in pixels.pixels_mut().zip(overlay.image.pixels()) {
        if fg[3] == 0 {
            continue;
        }
        *target = blend_pixels(*target, *fg);
        touched += 1;
    }

    tracing::debug!(
        width = base.width(),
        height = base.height(),
        blended_pixels = touched,
        "Composited overlay"
    );

    Ok(RasterImage::new(pixels, base.format))
}

/// Blend one overlay pixel over one background pixel.
pub fn blend_pixels(background: Rgba<u8>, foreground: Rgba<u8>) -> Rgba<u8> {
    if foreground[3] == 0 {
        return background;
    }

    let fg_alpha = foreground[3] as f32 / 255.0;
    let bg_alpha = background[3] as f32 / 255.0;

    let out_alpha = fg_alpha + bg_alpha * (1.0 - fg_alpha);

    let blend_channel = |fg: u8, bg: u8| -> u8 {
        let fg_f = fg as f32 / 255.0;
        let bg_f = bg as f32 / 255.0;
        let result = (fg_f * fg_alpha + bg_f * bg_alpha * (1.0 - fg_alpha)) / out_alpha;
        (result * 255.0).round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        blend_channel(foreground[0], background[0]),
        blend_channel(foreground[1], background[1]),
        blend_channel(foreground[2], background[2]),
        (out_alpha * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}
