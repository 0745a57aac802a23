//! Upload validation and decoding.
//!
//! An upload is accepted only when its file name carries one of the allowed
//! extensions, its size is within the configured limit and its magic bytes
//! identify a supported raster format. Everything else fails with
//! [`TextlensError::UnsupportedImageFormat`] before any OCR work happens.

use std::io::Cursor;

use image::{DynamicImage, GenericImageView, ImageFormat};
use tracing::debug;

use crate::config::Config;
use crate::error::{Result, TextlensError};

pub const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp", "gif"];

/// Decoded bitmap plus the format it was decoded from.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub bitmap: DynamicImage,
    pub format: ImageFormat,
}

impl Image {
    pub fn new(bitmap: DynamicImage, format: ImageFormat) -> Self {
        Self { bitmap, format }
    }

    pub fn width(&self) -> u32 {
        self.bitmap.width()
    }

    pub fn height(&self) -> u32 {
        self.bitmap.height()
    }

    /// Lossless PNG encoding handed to OCR engines.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        self.bitmap
            .write_to(&mut Cursor::new(&mut output), ImageFormat::Png)
            .map_err(|e| TextlensError::Processing(format!("Failed to encode image: {e}")))?;
        Ok(output)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct IngestLimits {
    pub max_bytes: usize,
    pub min_dimension: u32,
    pub max_dimension: u32,
}

impl IngestLimits {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_bytes: config.server.max_upload_bytes,
            min_dimension: config.ocr.min_image_dimension,
            max_dimension: config.ocr.max_image_dimension,
        }
    }
}

impl Default for IngestLimits {
    fn default() -> Self {
        Self {
            max_bytes: 10 * 1024 * 1024,
            min_dimension: 10,
            max_dimension: 8192,
        }
    }
}

/// Lower-cased extension of `file_name`, if it has one.
pub fn file_extension(file_name: &str) -> Option<String> {
    std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

pub fn is_allowed_extension(file_name: &str) -> bool {
    file_extension(file_name)
        .map(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Identify the raster format from magic bytes.
pub fn sniff_format(bytes: &[u8]) -> Option<ImageFormat> {
    let kind = infer::get(bytes)?;
    match kind.mime_type() {
        "image/jpeg" => Some(ImageFormat::Jpeg),
        "image/png" => Some(ImageFormat::Png),
        "image/bmp" => Some(ImageFormat::Bmp),
        "image/tiff" => Some(ImageFormat::Tiff),
        "image/webp" => Some(ImageFormat::WebP),
        "image/gif" => Some(ImageFormat::Gif),
        _ => None,
    }
}

/// Validate and decode an uploaded file.
pub fn ingest(file_name: &str, bytes: &[u8], limits: &IngestLimits) -> Result<Image> {
    if !is_allowed_extension(file_name) {
        return Err(TextlensError::UnsupportedImageFormat(format!(
            "'{file_name}' does not have a supported extension (allowed: {})",
            ALLOWED_EXTENSIONS.join(", ")
        )));
    }

    if bytes.is_empty() {
        return Err(TextlensError::UnsupportedImageFormat(
            "Uploaded file is empty".to_string(),
        ));
    }

    if bytes.len() > limits.max_bytes {
        return Err(TextlensError::Validation(format!(
            "File too large: {} bytes, maximum {} bytes",
            bytes.len(),
            limits.max_bytes
        )));
    }

    let format = sniff_format(bytes).ok_or_else(|| {
        TextlensError::UnsupportedImageFormat(format!(
            "'{file_name}' is not a recognized image file"
        ))
    })?;

    let bitmap = image::load_from_memory_with_format(bytes, format).map_err(|e| {
        TextlensError::UnsupportedImageFormat(format!("Failed to decode image: {e}"))
    })?;

    let (width, height) = bitmap.dimensions();
    if width < limits.min_dimension || height < limits.min_dimension {
        return Err(TextlensError::Validation(format!(
            "Image too small: {}x{}, minimum {}x{}",
            width, height, limits.min_dimension, limits.min_dimension
        )));
    }

    let bitmap = resize_if_needed(bitmap, limits.max_dimension);
    debug!(?format, width, height, "Image decoded");

    Ok(Image::new(bitmap, format))
}

/// Downscale so the longest side fits `max_dim`, keeping the aspect ratio.
fn resize_if_needed(img: DynamicImage, max_dim: u32) -> DynamicImage {
    let (width, height) = img.dimensions();
    if width <= max_dim && height <= max_dim {
        return img;
    }

    let ratio = if width > height {
        max_dim as f32 / width as f32
    } else {
        max_dim as f32 / height as f32
    };

    let new_width = ((width as f32 * ratio) as u32).max(1);
    let new_height = ((height as f32 * ratio) as u32).max(1);

    img.resize(new_width, new_height, image::imageops::FilterType::Lanczos3)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut output = Vec::new();
        img.write_to(&mut Cursor::new(&mut output), format).unwrap();
        output
    }

    #[test]
    fn test_supported_formats_decode_with_dimensions() {
        let rgb = DynamicImage::new_rgb8(64, 32);
        let rgba = DynamicImage::new_rgba8(64, 32);
        let cases = [
            ("scan.png", encode(&rgb, ImageFormat::Png), ImageFormat::Png),
            ("scan.JPG", encode(&rgb, ImageFormat::Jpeg), ImageFormat::Jpeg),
            ("scan.bmp", encode(&rgb, ImageFormat::Bmp), ImageFormat::Bmp),
            ("scan.tif", encode(&rgb, ImageFormat::Tiff), ImageFormat::Tiff),
            ("scan.gif", encode(&rgba, ImageFormat::Gif), ImageFormat::Gif),
        ];

        for (name, bytes, expected) in cases {
            let image = ingest(name, &bytes, &IngestLimits::default())
                .unwrap_or_else(|e| panic!("{name} failed: {e}"));
            assert_eq!(image.format, expected, "{name}");
            assert_eq!((image.width(), image.height()), (64, 32), "{name}");
        }
    }

    #[test]
    fn test_disguised_extension_is_rejected() {
        let bytes = encode(&DynamicImage::new_rgb8(20, 20), ImageFormat::Bmp);
        let err = ingest("scan.xyz", &bytes, &IngestLimits::default()).unwrap_err();
        assert!(matches!(err, TextlensError::UnsupportedImageFormat(_)));
    }

    #[test]
    fn test_non_image_payload_is_rejected() {
        let err = ingest("notes.png", b"just some text", &IngestLimits::default()).unwrap_err();
        assert!(matches!(err, TextlensError::UnsupportedImageFormat(_)));
    }

    #[test]
    fn test_truncated_image_is_rejected() {
        let bytes = encode(&DynamicImage::new_rgb8(40, 40), ImageFormat::Png);
        let err = ingest("scan.png", &bytes[..bytes.len() / 2], &IngestLimits::default())
            .unwrap_err();
        assert!(matches!(err, TextlensError::UnsupportedImageFormat(_)));
    }

    #[test]
    fn test_empty_upload_is_rejected() {
        let err = ingest("scan.png", &[], &IngestLimits::default()).unwrap_err();
        assert!(matches!(err, TextlensError::UnsupportedImageFormat(_)));
    }

    #[test]
    fn test_oversized_upload_is_rejected() {
        let bytes = encode(&DynamicImage::new_rgb8(40, 40), ImageFormat::Png);
        let limits = IngestLimits {
            max_bytes: 16,
            ..IngestLimits::default()
        };
        let err = ingest("scan.png", &bytes, &limits).unwrap_err();
        assert!(matches!(err, TextlensError::Validation(_)));
    }

    #[test]
    fn test_tiny_image_is_rejected() {
        let bytes = encode(&DynamicImage::new_rgb8(4, 40), ImageFormat::Png);
        let err = ingest("scan.png", &bytes, &IngestLimits::default()).unwrap_err();
        assert!(err.to_string().contains("4x40"));
    }

    #[test]
    fn test_large_image_is_downscaled() {
        let bytes = encode(&DynamicImage::new_rgb8(400, 100), ImageFormat::Png);
        let limits = IngestLimits {
            max_dimension: 200,
            ..IngestLimits::default()
        };
        let image = ingest("scan.png", &bytes, &limits).unwrap();
        assert_eq!((image.width(), image.height()), (200, 50));
    }

    #[test]
    fn test_extension_helpers() {
        assert_eq!(file_extension("a/b/Photo.JPEG").as_deref(), Some("jpeg"));
        assert_eq!(file_extension("README"), None);
        assert!(is_allowed_extension("x.webp"));
        assert!(!is_allowed_extension("x.pdf"));
    }
}
