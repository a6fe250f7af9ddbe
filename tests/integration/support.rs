//! Shared fixtures for the integration tests.

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::path::{Path, PathBuf};
use textmark::watermark::{
    FontConfig, LoaderConfig, OutputConfig, TextStyle, WatermarkSpec, Watermarker,
};

/// Font config that never resolves, forcing the bitmap fallback.
pub fn missing_font() -> FontConfig {
    FontConfig {
        name: "textmark-missing-font.ttf".to_string(),
        size: 20,
        search_dirs: vec!["/nonexistent/fonts".to_string()],
    }
}

/// A TrueType font found on the host, if any.
pub fn system_font() -> Option<FontConfig> {
    const CANDIDATES: &[&str] = &[
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/Library/Fonts/Arial.ttf",
        "/System/Library/Fonts/Supplemental/Arial.ttf",
        "C:\\Windows\\Fonts\\arial.ttf",
    ];
    CANDIDATES
        .iter()
        .find(|p| Path::new(p).is_file())
        .map(|p| FontConfig {
            name: p.to_string(),
            size: 20,
            search_dirs: Vec::new(),
        })
}

pub fn watermarker(font: &FontConfig) -> Watermarker {
    Watermarker::new(font.clone(), OutputConfig::default(), LoaderConfig::default())
}

pub fn spec(text: &str, font: &FontConfig) -> WatermarkSpec {
    WatermarkSpec::new(text).with_style(TextStyle {
        font: font.clone(),
        ..TextStyle::default()
    })
}

/// Opaque image with a gradient so every row and column differs.
pub fn gradient(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x * 7 % 256) as u8, (y * 11 % 256) as u8, ((x + y) % 256) as u8, 255])
    })
}

/// Opaque image with a handful of flat colors, safe for palette formats.
pub fn blocks(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| match ((x / 10) + (y / 10)) % 3 {
        0 => Rgba([200, 30, 30, 255]),
        1 => Rgba([30, 200, 30, 255]),
        _ => Rgba([30, 30, 200, 255]),
    })
}

pub fn write_image(dir: &Path, name: &str, image: &RgbaImage, format: ImageFormat) -> PathBuf {
    let path = dir.join(name);
    let dynamic = match format {
        // JPEG and BMP writers in `image` take RGB here
        ImageFormat::Jpeg | ImageFormat::Bmp => DynamicImage::ImageRgb8(
            DynamicImage::ImageRgba8(image.clone()).to_rgb8(),
        ),
        _ => DynamicImage::ImageRgba8(image.clone()),
    };
    dynamic.save_with_format(&path, format).unwrap();
    path
}

/// Bounding box `(x0, y0, x1, y1)` of pixels that differ between two images.
pub fn diff_bounds(a: &RgbaImage, b: &RgbaImage) -> Option<(u32, u32, u32, u32)> {
    assert_eq!(a.dimensions(), b.dimensions());
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for (x, y, p) in a.enumerate_pixels() {
        if p == b.get_pixel(x, y) {
            continue;
        }
        let bb = bounds.get_or_insert((x, y, x + 1, y + 1));
        bb.0 = bb.0.min(x);
        bb.1 = bb.1.min(y);
        bb.2 = bb.2.max(x + 1);
        bb.3 = bb.3.max(y + 1);
    }
    bounds
}

pub fn file_count(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}
