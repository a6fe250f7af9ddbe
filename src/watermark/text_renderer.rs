//! Text measurement and overlay rendering.
//!
//! Both operations walk the same glyph run, so the box returned by
//! [`measure_text`] is exactly the set of pixels [`render_overlay`] may touch.
//!
//! Coordinates from the glyph run are relative to the text origin: the
//! top-left of the line box, with the baseline one ascent below it. The
//! rendered run is shifted so the top-left of its ink box sits on the anchor.

use ab_glyph::{Font, PxScale, ScaleFont};
use font8x8::UnicodeFonts;
use image::{Rgba, RgbaImage};

use super::font::{WatermarkFont, BITMAP_FONT_SIZE};
use super::position::{PlacementPosition, TextDimensions};

/// An RGB fill color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255)
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::white()
    }
}

/// Parse a `#RGB` or `#RRGGBB` color.
pub fn parse_hex_color(hex: &str) -> Result<Color, String> {
    let digits = hex
        .strip_prefix('#')
        .ok_or_else(|| format!("color '{}' must start with '#'", hex))?;

    let component = |s: &str| {
        u8::from_str_radix(s, 16).map_err(|_| format!("color '{}' has an invalid hex digit", hex))
    };

    match digits.len() {
        // Each digit is doubled: 0xF -> 0xFF
        3 if digits.is_ascii() => Ok(Color::new(
            component(&digits[0..1])? * 17,
            component(&digits[1..2])? * 17,
            component(&digits[2..3])? * 17,
        )),
        6 if digits.is_ascii() => Ok(Color::new(
            component(&digits[0..2])?,
            component(&digits[2..4])?,
            component(&digits[4..6])?,
        )),
        _ => Err(format!("color '{}' must be #RGB or #RRGGBB", hex)),
    }
}

/// Ink bounding box of a glyph run, relative to the text origin.
///
/// `right` and `bottom` are exclusive. Text without ink has the zero box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextMetrics {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl TextMetrics {
    pub fn width(&self) -> u32 {
        (self.right - self.left).max(0) as u32
    }

    pub fn height(&self) -> u32 {
        (self.bottom - self.top).max(0) as u32
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    pub fn dimensions(&self) -> TextDimensions {
        TextDimensions {
            width: self.width(),
            height: self.height(),
        }
    }
}

/// A transparent layer with the watermark text drawn on it.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayLayer {
    pub image: RgbaImage,
}

impl OverlayLayer {
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// Measure the ink bounding box of `text` set in `font`.
pub fn measure_text(text: &str, font: &WatermarkFont) -> TextMetrics {
    let mut bounds: Option<TextMetrics> = None;

    for_each_ink_pixel(text, font, |x, y, _| {
        let b = bounds.get_or_insert(TextMetrics {
            left: x,
            top: y,
            right: x + 1,
            bottom: y + 1,
        });
        b.left = b.left.min(x);
        b.top = b.top.min(y);
        b.right = b.right.max(x + 1);
        b.bottom = b.bottom.max(y + 1);
    });

    bounds.unwrap_or_default()
}

/// Render `text` onto a transparent layer of `canvas_size`.
///
/// Glyph coverage is scaled by `alpha`. Pixels falling outside the canvas are
/// dropped, so a negative or oversized placement clips silently.
pub fn render_overlay(
    canvas_size: (u32, u32),
    text: &str,
    font: &WatermarkFont,
    position: PlacementPosition,
    color: Color,
    alpha: u8,
) -> OverlayLayer {
    let (canvas_width, canvas_height) = canvas_size;
    let mut image = RgbaImage::new(canvas_width, canvas_height);

    let metrics = measure_text(text, font);
    if metrics.is_empty() || alpha == 0 {
        return OverlayLayer { image };
    }

    let offset_x = position.x as i64 - metrics.left as i64;
    let offset_y = position.y as i64 - metrics.top as i64;

    for_each_ink_pixel(text, font, |px, py, coverage| {
        let x = px as i64 + offset_x;
        let y = py as i64 + offset_y;
        if x < 0 || y < 0 || x >= canvas_width as i64 || y >= canvas_height as i64 {
            return;
        }

        let pixel_alpha = (coverage.clamp(0.0, 1.0) * alpha as f32).round() as u8;
        if pixel_alpha == 0 {
            return;
        }

        let existing = image.get_pixel_mut(x as u32, y as u32);
        *existing = accumulate(*existing, color, pixel_alpha);
    });

    OverlayLayer { image }
}

/// Merge another same-colored stroke into an overlay pixel ("over" on alpha).
fn accumulate(existing: Rgba<u8>, color: Color, alpha: u8) -> Rgba<u8> {
    let top = alpha as f32 / 255.0;
    let bottom = existing[3] as f32 / 255.0;
    let out = top + bottom * (1.0 - top);
    Rgba([color.r, color.g, color.b, (out * 255.0).round().min(255.0) as u8])
}

/// Call `f(x, y, coverage)` for every pixel of the glyph run with non-zero
/// coverage, in text-origin coordinates.
fn for_each_ink_pixel(text: &str, font: &WatermarkFont, mut f: impl FnMut(i32, i32, f32)) {
    match font {
        WatermarkFont::TrueType { font, size, .. } => {
            let scale = PxScale::from(*size);
            let scaled_font = font.as_scaled(scale);
            let baseline_y = scaled_font.ascent();

            let mut cursor_x = 0.0f32;
            let mut prev_glyph: Option<ab_glyph::GlyphId> = None;

            for c in text.chars() {
                let glyph_id = scaled_font.glyph_id(c);

                if let Some(prev) = prev_glyph {
                    cursor_x += scaled_font.kern(prev, glyph_id);
                }

                let glyph =
                    glyph_id.with_scale_and_position(scale, ab_glyph::point(cursor_x, baseline_y));

                if let Some(outlined) = font.outline_glyph(glyph) {
                    let bounds = outlined.px_bounds();
                    let min_x = bounds.min.x.floor() as i32;
                    let min_y = bounds.min.y.floor() as i32;

                    outlined.draw(|px, py, coverage| {
                        if coverage > 0.0 {
                            f(min_x + px as i32, min_y + py as i32, coverage);
                        }
                    });
                }

                cursor_x += scaled_font.h_advance(glyph_id);
                prev_glyph = Some(glyph_id);
            }
        }
        WatermarkFont::Bitmap => {
            let advance = BITMAP_FONT_SIZE as i32;
            for (index, c) in text.chars().enumerate() {
                let rows = bitmap_glyph(c);
                let origin_x = index as i32 * advance;
                for (row, bits) in rows.into_iter().enumerate() {
                    for col in 0..8 {
                        // Least significant bit is the leftmost pixel
                        if (bits >> col) & 1 == 1 {
                            f(origin_x + col, row as i32, 1.0);
                        }
                    }
                }
            }
        }
    }
}

fn bitmap_glyph(c: char) -> [u8; 8] {
    font8x8::BASIC_FONTS
        .get(c)
        .or_else(|| font8x8::LATIN_FONTS.get(c))
        .or_else(|| font8x8::BASIC_FONTS.get('?'))
        .unwrap_or([0; 8])
}
