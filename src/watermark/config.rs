//! Watermark configuration types.
//!
//! This module defines the tunable parts of a watermark run:
//! - Text styling (font, color, opacity, margin, anchor)
//! - Output encoding defaults
//! - Loader safety limits
//!
//! All fields carry serde defaults so a partial YAML document is valid.

use serde::{Deserialize, Serialize};

use super::output::OutputFormat;

// Default values
fn default_font_name() -> String {
    "arial.ttf".to_string()
}

fn default_font_size() -> u32 {
    20
}

fn default_font_search_dirs() -> Vec<String> {
    [
        ".",
        // Linux
        "/usr/share/fonts/truetype/msttcorefonts",
        "/usr/share/fonts/truetype/dejavu",
        "/usr/share/fonts/truetype/liberation",
        "/usr/share/fonts/TTF",
        // macOS
        "/Library/Fonts",
        "/System/Library/Fonts/Supplemental",
        // Windows
        "C:\\Windows\\Fonts",
    ]
    .iter()
    .map(|d| d.to_string())
    .collect()
}

fn default_color() -> String {
    "#FFFFFF".to_string()
}

fn default_opacity() -> f32 {
    0.5
}

fn default_margin() -> u32 {
    10
}

fn default_extension() -> String {
    "png".to_string()
}

fn default_jpeg_quality() -> u8 {
    75
}

fn default_max_pixels() -> u64 {
    100_000_000
}

/// Anchor of the watermark on the image (9-grid).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WatermarkPosition {
    TopLeft,
    TopCenter,
    TopRight,
    CenterLeft,
    Center,
    CenterRight,
    BottomLeft,
    BottomCenter,
    #[default]
    BottomRight,
}

impl WatermarkPosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TopLeft => "top-left",
            Self::TopCenter => "top-center",
            Self::TopRight => "top-right",
            Self::CenterLeft => "center-left",
            Self::Center => "center",
            Self::CenterRight => "center-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomCenter => "bottom-center",
            Self::BottomRight => "bottom-right",
        }
    }
}

impl std::str::FromStr for WatermarkPosition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "top-left" => Ok(Self::TopLeft),
            "top-center" => Ok(Self::TopCenter),
            "top-right" => Ok(Self::TopRight),
            "center-left" => Ok(Self::CenterLeft),
            "center" => Ok(Self::Center),
            "center-right" => Ok(Self::CenterRight),
            "bottom-left" => Ok(Self::BottomLeft),
            "bottom-center" => Ok(Self::BottomCenter),
            "bottom-right" => Ok(Self::BottomRight),
            other => Err(format!("unknown watermark position '{}'", other)),
        }
    }
}

/// Which TrueType font to try before falling back to the bitmap font.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontConfig {
    /// File name or path of the TrueType font (default: "arial.ttf")
    #[serde(default = "default_font_name")]
    pub name: String,

    /// Font size in pixels (default: 20)
    #[serde(default = "default_font_size")]
    pub size: u32,

    /// Directories searched for `name` when it is not a usable path
    #[serde(default = "default_font_search_dirs")]
    pub search_dirs: Vec<String>,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            name: default_font_name(),
            size: default_font_size(),
            search_dirs: default_font_search_dirs(),
        }
    }
}

/// Text watermark styling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextWatermarkConfig {
    #[serde(default)]
    pub font: FontConfig,

    /// Text color as hex string (default: "#FFFFFF")
    #[serde(default = "default_color")]
    pub color: String,

    /// Opacity from 0.0 (transparent) to 1.0 (opaque) (default: 0.5)
    #[serde(default = "default_opacity")]
    pub opacity: f32,

    /// Margin from edge in pixels (default: 10)
    #[serde(default = "default_margin")]
    pub margin: u32,

    /// Anchor on the image (default: bottom-right)
    #[serde(default)]
    pub position: WatermarkPosition,
}

impl Default for TextWatermarkConfig {
    fn default() -> Self {
        Self {
            font: FontConfig::default(),
            color: default_color(),
            opacity: default_opacity(),
            margin: default_margin(),
            position: WatermarkPosition::default(),
        }
    }
}

/// Output encoding defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Extension used when neither the destination nor the source format
    /// provides one (default: "png")
    #[serde(default = "default_extension")]
    pub default_extension: String,

    /// JPEG quality 1-100 (default: 75)
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            default_extension: default_extension(),
            jpeg_quality: default_jpeg_quality(),
        }
    }
}

/// Loader safety limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Maximum decoded pixel count (image bomb protection)
    #[serde(default = "default_max_pixels")]
    pub max_pixels: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            max_pixels: default_max_pixels(),
        }
    }
}

impl TextWatermarkConfig {
    /// Validate the text watermark configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.font.name.trim().is_empty() {
            return Err("Watermark font name cannot be empty".to_string());
        }

        if self.font.size == 0 || self.font.size > 1000 {
            return Err(format!(
                "Watermark font size must be between 1 and 1000 pixels, got {}",
                self.font.size
            ));
        }

        // Check for NaN/Infinity and valid range
        if !self.opacity.is_finite() || !(0.0..=1.0).contains(&self.opacity) {
            return Err(format!(
                "Watermark opacity must be a finite value between 0.0 and 1.0, got {}",
                self.opacity
            ));
        }

        // Validate hex color format (#RGB or #RRGGBB)
        if let Some(hex_part) = self.color.strip_prefix('#') {
            let len = hex_part.len();
            if (len != 3 && len != 6) || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(format!(
                    "Watermark color must be in #RGB or #RRGGBB format with valid hex characters, got '{}'",
                    self.color
                ));
            }
        } else {
            return Err(format!(
                "Watermark color must be a hex string starting with '#', got '{}'",
                self.color
            ));
        }

        Ok(())
    }
}

impl OutputConfig {
    pub fn validate(&self) -> Result<(), String> {
        if OutputFormat::from_extension(&self.default_extension).is_none() {
            return Err(format!(
                "Output default_extension '{}' is not a supported image format",
                self.default_extension
            ));
        }

        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(format!(
                "Output jpeg_quality must be between 1 and 100, got {}",
                self.jpeg_quality
            ));
        }

        Ok(())
    }
}

impl LoaderConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_pixels == 0 {
            return Err("Loader max_pixels must be greater than 0".to_string());
        }
        Ok(())
    }
}
