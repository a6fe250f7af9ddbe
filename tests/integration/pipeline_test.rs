//! End-to-end watermark runs: load, measure, composite, save.

use super::support::*;
use image::{ImageFormat, Rgba};
use rstest::rstest;
use textmark::watermark::{
    load, FontConfig, FontKind, LoaderConfig, RunState, WatermarkPosition,
};

fn assert_draft_scenario(font: &FontConfig, expected_kind: FontKind) {
    let dir = tempfile::tempdir().unwrap();
    let source_pixels = gradient(200, 100);
    let source = write_image(dir.path(), "source.png", &source_pixels, ImageFormat::Png);

    let watermarker = watermarker(font);
    assert_eq!(watermarker.font_kind(), expected_kind);

    let outcome = watermarker
        .run(&source, &spec("DRAFT", font), &dir.path().join("out.png"))
        .unwrap();
    assert!(outcome.reset_text_input);

    let saved = image::open(&outcome.path).unwrap().to_rgba8();
    assert_eq!(saved.dimensions(), (200, 100));

    // Changed pixels sit in the bottom-right region, inside the margin
    let (x0, y0, x1, y1) = diff_bounds(&saved, &source_pixels).expect("watermark not drawn");
    assert!(x1 <= 200 - 10 && y1 <= 100 - 10, "ink past margin: {:?}", (x1, y1));
    assert!(x0 >= 100 && y0 >= 50, "ink outside bottom-right: {:?}", (x0, y0));

    // The base is opaque, so the result stays opaque
    assert!(saved.pixels().all(|p| p[3] == 255));
}

#[test]
fn test_draft_scenario_with_system_font() {
    let Some(font) = system_font() else {
        return;
    };
    assert_draft_scenario(&font, FontKind::TrueType);
}

#[test]
fn test_draft_scenario_with_fallback_font() {
    assert_draft_scenario(&missing_font(), FontKind::Bitmap);
}

// Test: the ink box is flush with the bottom-right margin
#[rstest]
#[case(0)]
#[case(5)]
#[case(10)]
#[case(25)]
fn test_bottom_right_anchor_respects_margin(#[case] margin: u32) {
    let dir = tempfile::tempdir().unwrap();
    let source_pixels = blocks(120, 60);
    let source = write_image(dir.path(), "source.png", &source_pixels, ImageFormat::Png);

    let font = missing_font();
    let mut spec = spec("Hi!", &font);
    spec.style.margin = margin;
    spec.style.opacity = 1.0;
    spec.style.color = textmark::watermark::Color::black();

    let outcome = watermarker(&font)
        .run(&source, &spec, &dir.path().join("out.png"))
        .unwrap();

    let saved = image::open(&outcome.path).unwrap().to_rgba8();
    let (_, _, x1, y1) = diff_bounds(&saved, &source_pixels).unwrap();
    assert_eq!((x1, y1), (120 - margin, 60 - margin));
}

#[rstest]
#[case(WatermarkPosition::TopLeft)]
#[case(WatermarkPosition::TopCenter)]
#[case(WatermarkPosition::Center)]
#[case(WatermarkPosition::CenterRight)]
#[case(WatermarkPosition::BottomLeft)]
fn test_grid_positions_stay_inside_canvas(#[case] position: WatermarkPosition) {
    let dir = tempfile::tempdir().unwrap();
    let source_pixels = blocks(150, 90);
    let source = write_image(dir.path(), "source.png", &source_pixels, ImageFormat::Png);

    let font = missing_font();
    let mut spec = spec("MARK", &font);
    spec.style.position = position;
    spec.style.opacity = 1.0;
    spec.style.color = textmark::watermark::Color::black();

    let marker = watermarker(&font);
    let prepared = marker.prepare(&source, &spec).unwrap();
    let pos = prepared.position();
    let metrics = prepared.metrics();
    assert!(pos.x >= 0 && pos.y >= 0);
    assert!(pos.x as u32 + metrics.width() <= 150);
    assert!(pos.y as u32 + metrics.height() <= 90);

    let (x0, y0, _, _) = diff_bounds(&prepared.image().pixels, &source_pixels).unwrap();
    assert_eq!((x0 as i32, y0 as i32), (pos.x, pos.y));
}

// Test: text bigger than the image is clipped, not rejected
#[test]
fn test_oversized_text_is_clipped() {
    let dir = tempfile::tempdir().unwrap();
    let source_pixels = blocks(24, 12);
    let source = write_image(dir.path(), "tiny.png", &source_pixels, ImageFormat::Png);

    let font = missing_font();
    let outcome = watermarker(&font)
        .run(
            &source,
            &spec("A VERY LONG WATERMARK", &font),
            &dir.path().join("out.png"),
        )
        .unwrap();

    let saved = image::open(&outcome.path).unwrap().to_rgba8();
    assert_eq!(saved.dimensions(), (24, 12));
}

#[test]
fn test_margin_past_i32_range_clips_everything() {
    let dir = tempfile::tempdir().unwrap();
    let source_pixels = gradient(200, 100);
    let source = write_image(dir.path(), "source.png", &source_pixels, ImageFormat::Png);

    let font = missing_font();
    let mut watermark = spec("DRAFT", &font);
    watermark.style.margin = 3_000_000_000;

    let marker = watermarker(&font);
    let prepared = marker.prepare(&source, &watermark).unwrap();
    assert!(prepared.position().x < 0 && prepared.position().y < 0);

    let outcome = prepared.save(&dir.path().join("out.png")).unwrap();
    assert_eq!(image::open(&outcome.path).unwrap().to_rgba8(), source_pixels);
}

#[test]
fn test_empty_text_resaves_identical_image() {
    let dir = tempfile::tempdir().unwrap();
    let source_pixels = gradient(40, 30);
    let source = write_image(dir.path(), "source.png", &source_pixels, ImageFormat::Png);

    let font = missing_font();
    let marker = watermarker(&font);
    let prepared = marker.prepare(&source, &spec("", &font)).unwrap();
    assert!(prepared.metrics().is_empty());
    assert_eq!(prepared.image().pixels, source_pixels);

    let outcome = prepared.save(&dir.path().join("copy.png")).unwrap();
    assert_eq!(image::open(&outcome.path).unwrap().to_rgba8(), source_pixels);
}

#[test]
fn test_corrupt_source_fails_before_writing() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("corrupt.png");
    std::fs::write(&source, b"\x89PNG\r\n\x1a\nthis is not really a png").unwrap();
    let dest = dir.path().join("out.png");

    let font = missing_font();
    let spec = spec("DRAFT", &font);
    let failure = watermarker(&font).run(&source, &spec, &dest).unwrap_err();

    assert_eq!(failure.state, RunState::Idle);
    assert_eq!(failure.final_state(), RunState::Failed);
    assert!(failure.error.is_decode());
    assert!(!dest.exists());
    assert_eq!(file_count(dir.path()), 1);
    // The caller's text is untouched
    assert_eq!(spec.text, "DRAFT");
}

#[test]
fn test_transparent_source_gets_translucent_text() {
    let dir = tempfile::tempdir().unwrap();
    let source_pixels = image::RgbaImage::from_pixel(80, 40, Rgba([0, 0, 0, 0]));
    let source = write_image(dir.path(), "clear.png", &source_pixels, ImageFormat::Png);

    let font = missing_font();
    let outcome = watermarker(&font)
        .run(&source, &spec("ok", &font), &dir.path().join("out.png"))
        .unwrap();

    let saved = image::open(&outcome.path).unwrap().to_rgba8();
    let inked: Vec<_> = saved.pixels().filter(|p| p[3] > 0).collect();
    assert!(!inked.is_empty());
    // White at opacity 0.5 over a fully transparent base
    assert!(inked.iter().all(|p| **p == Rgba([255, 255, 255, 128])));
}

#[test]
fn test_loaded_image_matches_decoder_output() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_image(dir.path(), "source.tiff", &gradient(16, 9), ImageFormat::Tiff);

    let loaded = load(&source, &LoaderConfig::default()).unwrap();
    assert_eq!(loaded.pixels, image::open(&source).unwrap().to_rgba8());
}
