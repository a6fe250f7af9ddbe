//! The `textmark` binary as a user would run it.

use super::support::*;
use image::{ImageFormat, Rgba};
use std::io::Write;
use std::process::Command;

fn textmark() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_textmark"));
    cmd.env("RUST_LOG", "warn");
    cmd
}

#[test]
fn test_cli_writes_default_destination() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_image(dir.path(), "photo.png", &blocks(100, 50), ImageFormat::Png);

    let output = textmark()
        .arg(&source)
        .args(["--text", "DRAFT", "--font", "textmark-missing-font.ttf"])
        .output()
        .unwrap();

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let expected = dir.path().join("photo-watermarked.png");
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), expected.to_string_lossy());
    assert!(expected.exists());
}

#[test]
fn test_cli_applies_config_file_and_flags() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_image(dir.path(), "in.png", &blocks(80, 40), ImageFormat::Png);
    let dest = dir.path().join("out.png");

    let config_path = dir.path().join("textmark.yaml");
    let mut file = std::fs::File::create(&config_path).unwrap();
    writeln!(
        file,
        "watermark:\n  font:\n    name: textmark-missing-font.ttf\n    search_dirs: []\n  color: \"#000000\"\n  opacity: 1.0\n  margin: 0"
    )
    .unwrap();

    let status = textmark()
        .arg(&source)
        .arg("--config")
        .arg(&config_path)
        .args(["--text", "x", "--position", "top-left", "--output"])
        .arg(&dest)
        .status()
        .unwrap();
    assert!(status.success());

    let saved = image::open(&dest).unwrap().to_rgba8();
    let (x0, y0, _, _) = diff_bounds(&saved, &blocks(80, 40)).unwrap();
    assert_eq!((x0, y0), (0, 0));
    assert!(saved.pixels().any(|p| *p == Rgba([0, 0, 0, 255])));
}

#[test]
fn test_cli_corrupt_source_exits_with_failure() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("broken.png");
    std::fs::write(&source, b"not an image").unwrap();

    let output = textmark()
        .arg(&source)
        .args(["--text", "DRAFT"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to decode"));
    assert_eq!(file_count(dir.path()), 1);
}

#[test]
fn test_cli_rejects_invalid_opacity() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_image(dir.path(), "in.png", &blocks(10, 10), ImageFormat::Png);

    let output = textmark()
        .arg(&source)
        .args(["--text", "x", "--opacity", "3"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Configuration error"));
    assert_eq!(file_count(dir.path()), 1);
}
