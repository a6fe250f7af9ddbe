//! Image encoder abstraction
//!
//! Provides a trait-based encoder system that allows:
//! - One encoder per destination format
//! - Encoding either RGBA or RGB pixel data
//! - Format-specific options (JPEG quality)

use std::io::Cursor;

use image::ColorType;

use super::output::{ColorModel, OutputFormat};

/// Result of encoding an image in memory
#[derive(Debug)]
pub struct EncodedImage {
    /// The encoded image data
    pub data: Vec<u8>,
    /// The output format
    pub format: OutputFormat,
    /// Color model of the encoded pixels
    pub color_model: ColorModel,
}

/// Trait for image encoders
///
/// Implementations encode raw 8-bit pixel data to a single format. The
/// trait is object-safe so the factory can hand out boxed encoders.
pub trait ImageEncoder: Send + Sync {
    /// The output format this encoder produces
    fn format(&self) -> OutputFormat;

    /// Encode raw pixel data to the target format
    ///
    /// # Arguments
    /// * `data` - Raw pixel data, 4 bytes per pixel for `Rgba`, 3 for `Rgb`
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    /// * `color_model` - Layout of `data`
    ///
    /// # Returns
    /// * `Ok(EncodedImage)` - Encoded image bytes
    /// * `Err(String)` - Encoder error message
    fn encode(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        color_model: ColorModel,
    ) -> Result<EncodedImage, String>;
}

fn color_type(model: ColorModel) -> ColorType {
    match model {
        ColorModel::Rgba => ColorType::Rgba8,
        ColorModel::Rgb => ColorType::Rgb8,
    }
}

/// JPEG encoder using the image crate
pub struct JpegEncoder {
    /// Quality value (1-100, where 100 is best quality)
    pub quality: u8,
}

impl ImageEncoder for JpegEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::Jpeg
    }

    fn encode(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        color_model: ColorModel,
    ) -> Result<EncodedImage, String> {
        use image::codecs::jpeg::JpegEncoder as ImageJpegEncoder;
        use image::ImageEncoder as _;

        let mut output = Cursor::new(Vec::new());
        let encoder = ImageJpegEncoder::new_with_quality(&mut output, self.quality.clamp(1, 100));

        encoder
            .write_image(data, width, height, color_type(color_model))
            .map_err(|e| e.to_string())?;

        Ok(EncodedImage {
            data: output.into_inner(),
            format: OutputFormat::Jpeg,
            color_model,
        })
    }
}

/// PNG encoder using the image crate
pub struct PngEncoder;

impl ImageEncoder for PngEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::Png
    }

    fn encode(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        color_model: ColorModel,
    ) -> Result<EncodedImage, String> {
        use image::codecs::png::PngEncoder as ImagePngEncoder;
        use image::ImageEncoder as _;

        let mut output = Cursor::new(Vec::new());
        ImagePngEncoder::new(&mut output)
            .write_image(data, width, height, color_type(color_model))
            .map_err(|e| e.to_string())?;

        Ok(EncodedImage {
            data: output.into_inner(),
            format: OutputFormat::Png,
            color_model,
        })
    }
}

/// BMP encoder using the image crate
pub struct BmpEncoder;

impl ImageEncoder for BmpEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::Bmp
    }

    fn encode(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        color_model: ColorModel,
    ) -> Result<EncodedImage, String> {
        use image::codecs::bmp::BmpEncoder as ImageBmpEncoder;
        use image::ImageEncoder as _;

        let mut output = Cursor::new(Vec::new());
        ImageBmpEncoder::new(&mut output)
            .write_image(data, width, height, color_type(color_model))
            .map_err(|e| e.to_string())?;

        Ok(EncodedImage {
            data: output.into_inner(),
            format: OutputFormat::Bmp,
            color_model,
        })
    }
}

/// GIF encoder using the image crate
///
/// The encoder quantizes to a 256-color palette; fully transparent pixels
/// stay transparent.
pub struct GifEncoder;

impl ImageEncoder for GifEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::Gif
    }

    fn encode(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        color_model: ColorModel,
    ) -> Result<EncodedImage, String> {
        use image::codecs::gif::GifEncoder as ImageGifEncoder;

        let mut output = Vec::new();
        {
            let mut encoder = ImageGifEncoder::new(&mut output);
            encoder
                .encode(data, width, height, color_type(color_model))
                .map_err(|e| e.to_string())?;
        }

        Ok(EncodedImage {
            data: output,
            format: OutputFormat::Gif,
            color_model,
        })
    }
}

/// TIFF encoder using the image crate
pub struct TiffEncoder;

impl ImageEncoder for TiffEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::Tiff
    }

    fn encode(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        color_model: ColorModel,
    ) -> Result<EncodedImage, String> {
        use image::codecs::tiff::TiffEncoder as ImageTiffEncoder;
        use image::ImageEncoder as _;

        let mut output = Cursor::new(Vec::new());
        ImageTiffEncoder::new(&mut output)
            .write_image(data, width, height, color_type(color_model))
            .map_err(|e| e.to_string())?;

        Ok(EncodedImage {
            data: output.into_inner(),
            format: OutputFormat::Tiff,
            color_model,
        })
    }
}

/// WebP encoder using the image crate
///
/// Note: The `image` crate only supports lossless WebP encoding.
pub struct WebPEncoder;

impl ImageEncoder for WebPEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::WebP
    }

    fn encode(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        color_model: ColorModel,
    ) -> Result<EncodedImage, String> {
        use image::codecs::webp::WebPEncoder as ImageWebPEncoder;
        use image::ImageEncoder as _;

        let mut output = Cursor::new(Vec::new());
        ImageWebPEncoder::new_lossless(&mut output)
            .write_image(data, width, height, color_type(color_model))
            .map_err(|e| e.to_string())?;

        Ok(EncodedImage {
            data: output.into_inner(),
            format: OutputFormat::WebP,
            color_model,
        })
    }
}

/// Factory for creating encoders based on output format
pub struct EncoderFactory;

impl EncoderFactory {
    /// Create an encoder for the specified output format
    pub fn create(format: OutputFormat, jpeg_quality: u8) -> Box<dyn ImageEncoder> {
        match format {
            OutputFormat::Jpeg => Box::new(JpegEncoder {
                quality: jpeg_quality,
            }),
            OutputFormat::Png => Box::new(PngEncoder),
            OutputFormat::Bmp => Box::new(BmpEncoder),
            OutputFormat::Gif => Box::new(GifEncoder),
            OutputFormat::Tiff => Box::new(TiffEncoder),
            OutputFormat::WebP => Box::new(WebPEncoder),
        }
    }
}

/// Convert RGBA to RGB by discarding alpha channel
pub fn rgba_to_rgb(rgba: &[u8]) -> Vec<u8> {
    let pixel_count = rgba.len() / 4;
    let mut rgb = Vec::with_capacity(pixel_count * 3);

    for chunk in rgba.chunks_exact(4) {
        rgb.extend_from_slice(&chunk[..3]);
    }

    rgb
}
