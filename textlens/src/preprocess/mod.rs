//! Bitmap cleanup applied before OCR.
//!
//! Every step is a pure function of its input, so the same image and
//! options always produce the same output. Step order:
//!
//! 1. grayscale conversion
//! 2. contrast stretch (optional)
//! 3. adaptive Gaussian threshold
//! 4. 3x3 median denoise
//! 5. background-noise removal (optional, morphological open/close)
//! 6. deskew (optional)
//! 7. 2x upscale (optional)
//!
//! Thresholding and the morphological steps need a single channel, so they
//! convert to grayscale themselves when step 1 is switched off. Background
//! removal binarizes first when thresholding is off.

mod deskew;
mod filters;

pub use deskew::{deskew, estimate_skew};
pub use filters::{adaptive_threshold, open_close, stretch_contrast};

use image::{imageops::FilterType, DynamicImage};
use imageproc::filter::median_filter;
use tracing::debug;

use crate::ingest::Image;
use crate::models::{PreprocessingOptions, ProcessingConfiguration};

/// Apply the configured preprocessing. Returns the input untouched when
/// preprocessing is disabled or every step is switched off.
pub fn preprocess(image: Image, config: &ProcessingConfiguration) -> Image {
    if !config.preprocessing_enabled() || !config.preprocessing().any_enabled() {
        return image;
    }
    apply(image, config.preprocessing())
}

pub fn apply(image: Image, options: &PreprocessingOptions) -> Image {
    let Image { bitmap, format } = image;
    let started = std::time::Instant::now();

    let mut bitmap = if options.grayscale {
        DynamicImage::ImageLuma8(bitmap.to_luma8())
    } else {
        bitmap
    };

    if options.enhance_contrast {
        bitmap = DynamicImage::ImageLuma8(stretch_contrast(&bitmap.to_luma8()));
    }

    if options.threshold {
        bitmap = DynamicImage::ImageLuma8(adaptive_threshold(&bitmap.to_luma8()));
    }

    if options.denoise {
        bitmap = denoise(bitmap);
    }

    if options.remove_background_noise {
        // Median of a binary image stays binary.
        let binary = if options.threshold {
            bitmap.to_luma8()
        } else {
            adaptive_threshold(&bitmap.to_luma8())
        };
        bitmap = DynamicImage::ImageLuma8(open_close(&binary));
    }

    if options.deskew {
        bitmap = deskew(bitmap);
    }

    if options.upscale {
        let (width, height) = (bitmap.width(), bitmap.height());
        bitmap = bitmap.resize_exact(width * 2, height * 2, FilterType::CatmullRom);
    }

    debug!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        width = bitmap.width(),
        height = bitmap.height(),
        "Preprocessing finished"
    );

    Image::new(bitmap, format)
}

fn denoise(bitmap: DynamicImage) -> DynamicImage {
    match bitmap {
        DynamicImage::ImageLuma8(gray) => DynamicImage::ImageLuma8(median_filter(&gray, 1, 1)),
        DynamicImage::ImageRgb8(rgb) => DynamicImage::ImageRgb8(median_filter(&rgb, 1, 1)),
        DynamicImage::ImageRgba8(rgba) => DynamicImage::ImageRgba8(median_filter(&rgba, 1, 1)),
        other => DynamicImage::ImageRgb8(median_filter(&other.to_rgb8(), 1, 1)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};

    fn sample_image() -> Image {
        let rgb = RgbImage::from_fn(40, 30, |x, y| {
            if (10..30).contains(&x) && (12..18).contains(&y) {
                Rgb([30, 40, 50])
            } else {
                Rgb([230, 220, 210])
            }
        });
        Image::new(DynamicImage::ImageRgb8(rgb), ImageFormat::Png)
    }

    #[test]
    fn test_disabled_preprocessing_returns_input_unchanged() {
        let config = ProcessingConfiguration::builder()
            .preprocessing_enabled(false)
            .build()
            .unwrap();
        let input = sample_image();
        let output = preprocess(input.clone(), &config);
        assert_eq!(output, input);
    }

    #[test]
    fn test_default_pipeline_produces_binary_grayscale() {
        let config = ProcessingConfiguration::default();
        let output = preprocess(sample_image(), &config);
        let DynamicImage::ImageLuma8(gray) = &output.bitmap else {
            panic!("expected grayscale output");
        };
        assert!(gray.pixels().all(|p| p[0] == 0 || p[0] == 255));
        assert_eq!((output.width(), output.height()), (40, 30));
        assert_eq!(output.format, ImageFormat::Png);
    }

    #[test]
    fn test_preprocessing_is_deterministic() {
        let config = ProcessingConfiguration::default();
        let a = preprocess(sample_image(), &config);
        let b = preprocess(sample_image(), &config);
        assert_eq!(a, b);
    }

    #[test]
    fn test_grayscale_only() {
        let options = PreprocessingOptions {
            grayscale: true,
            ..PreprocessingOptions::none()
        };
        let output = apply(sample_image(), &options);
        assert!(matches!(output.bitmap, DynamicImage::ImageLuma8(_)));
    }

    #[test]
    fn test_denoise_keeps_color_when_grayscale_disabled() {
        let options = PreprocessingOptions {
            denoise: true,
            ..PreprocessingOptions::none()
        };
        let output = apply(sample_image(), &options);
        assert!(matches!(output.bitmap, DynamicImage::ImageRgb8(_)));
    }

    #[test]
    fn test_upscale_doubles_dimensions() {
        let options = PreprocessingOptions {
            upscale: true,
            ..PreprocessingOptions::none()
        };
        let output = apply(sample_image(), &options);
        assert_eq!((output.width(), output.height()), (80, 60));
    }

    #[test]
    fn test_median_denoise_removes_isolated_speckle() {
        let mut gray = image::GrayImage::from_pixel(9, 9, image::Luma([255]));
        gray.put_pixel(4, 4, image::Luma([0]));
        let options = PreprocessingOptions {
            denoise: true,
            ..PreprocessingOptions::none()
        };
        let output = apply(
            Image::new(DynamicImage::ImageLuma8(gray), ImageFormat::Png),
            &options,
        );
        assert!(output.bitmap.to_luma8().pixels().all(|p| p[0] == 255));
    }

    #[test]
    fn test_background_removal_binarizes_without_threshold() {
        let options = PreprocessingOptions {
            remove_background_noise: true,
            ..PreprocessingOptions::none()
        };
        let output = apply(sample_image(), &options);
        let gray = output.bitmap.to_luma8();
        assert!(gray.pixels().all(|p| p[0] == 0 || p[0] == 255));
        assert_eq!(gray.get_pixel(20, 15)[0], 0);
    }

    #[test]
    fn test_enabled_but_all_steps_off_is_identity() {
        let input = sample_image();
        let output = apply(input.clone(), &PreprocessingOptions::none());
        assert_eq!(output, input);
    }
}
