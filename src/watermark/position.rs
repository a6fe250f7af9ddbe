//! Anchor calculation for the watermark text.
//!
//! The anchor is where the top-left corner of the text's ink bounding box
//! lands on the canvas. Any of the nine grid positions may be used; the
//! default is bottom-right.
//!
//! Coordinates are signed. Text larger than the canvas produces negative
//! coordinates and is clipped when rendered.
//!
//! ```ignore
//! use textmark::watermark::position::{calculate_position, ImageDimensions, TextDimensions};
//! use textmark::watermark::WatermarkPosition;
//!
//! let canvas = ImageDimensions { width: 800, height: 600 };
//! let text = TextDimensions { width: 100, height: 50 };
//!
//! let pos = calculate_position(WatermarkPosition::BottomRight, &canvas, &text, 10);
//! assert_eq!((pos.x, pos.y), (690, 540)); // 800 - 100 - 10, 600 - 50 - 10
//! ```

use super::WatermarkPosition;

/// Dimensions of the canvas being watermarked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

/// Dimensions of the text's ink bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextDimensions {
    pub width: u32,
    pub height: u32,
}

/// Canvas coordinates of the text anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementPosition {
    pub x: i32,
    pub y: i32,
}

impl PlacementPosition {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Calculate the anchor for `text` on `canvas`.
///
/// Edge-aligned positions keep `margin` pixels between the text and the edge;
/// centered axes ignore the margin.
pub fn calculate_position(
    position: WatermarkPosition,
    canvas: &ImageDimensions,
    text: &TextDimensions,
    margin: u32,
) -> PlacementPosition {
    // u32 inputs cannot overflow i64; anchors saturate into i32
    let img_w = i64::from(canvas.width);
    let img_h = i64::from(canvas.height);
    let txt_w = i64::from(text.width);
    let txt_h = i64::from(text.height);
    let m = i64::from(margin);

    let left = saturate(m);
    let h_center = saturate((img_w - txt_w) / 2);
    let right = saturate(img_w - txt_w - m);
    let top = saturate(m);
    let v_center = saturate((img_h - txt_h) / 2);
    let bottom = saturate(img_h - txt_h - m);

    match position {
        WatermarkPosition::TopLeft => PlacementPosition::new(left, top),
        WatermarkPosition::TopCenter => PlacementPosition::new(h_center, top),
        WatermarkPosition::TopRight => PlacementPosition::new(right, top),
        WatermarkPosition::CenterLeft => PlacementPosition::new(left, v_center),
        WatermarkPosition::Center => PlacementPosition::new(h_center, v_center),
        WatermarkPosition::CenterRight => PlacementPosition::new(right, v_center),
        WatermarkPosition::BottomLeft => PlacementPosition::new(left, bottom),
        WatermarkPosition::BottomCenter => PlacementPosition::new(h_center, bottom),
        WatermarkPosition::BottomRight => PlacementPosition::new(right, bottom),
    }
}

fn saturate(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Whether the text placed at `pos` lies entirely inside the canvas.
///
/// When this is false the overflowing part is clipped at render time.
pub fn fits_within(pos: &PlacementPosition, canvas: &ImageDimensions, text: &TextDimensions) -> bool {
    pos.x >= 0
        && pos.y >= 0
        && pos.x as i64 + text.width as i64 <= canvas.width as i64
        && pos.y as i64 + text.height as i64 <= canvas.height as i64
}
