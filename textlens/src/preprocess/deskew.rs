//! Skew correction by projection-profile search.
//!
//! Candidate rotations are tried on a downscaled copy; the one whose
//! horizontal ink profile is most peaked (text lines lying flat) wins.

use image::{imageops, DynamicImage, GrayImage, Luma, Rgb, Rgba};
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};
use tracing::debug;

/// Largest correction tried, in degrees either way.
pub const MAX_SKEW_DEGREES: f32 = 10.0;
const STEP_DEGREES: f32 = 0.5;
/// Longest side of the copy the angle is estimated on.
const ESTIMATE_SIDE: u32 = 600;
/// Pixels darker than this count as ink.
const INK_LEVEL: u8 = 128;

fn sample(gray: &GrayImage) -> GrayImage {
    let longest = gray.width().max(gray.height());
    if longest <= ESTIMATE_SIDE {
        return gray.clone();
    }
    let scale = ESTIMATE_SIDE as f32 / longest as f32;
    let width = ((gray.width() as f32 * scale).round() as u32).max(1);
    let height = ((gray.height() as f32 * scale).round() as u32).max(1);
    imageops::resize(gray, width, height, imageops::FilterType::Triangle)
}

fn profile_score(gray: &GrayImage) -> u64 {
    gray.rows()
        .map(|row| {
            let ink = row.filter(|p| p[0] < INK_LEVEL).count() as u64;
            ink * ink
        })
        .sum()
}

/// Rotation in radians, as taken by [`rotate_about_center`], that levels
/// the text. Zero for blank or already level pages.
pub fn estimate_skew(gray: &GrayImage) -> f32 {
    let sample = sample(gray);
    let steps = (MAX_SKEW_DEGREES / STEP_DEGREES) as i32;
    let mut candidates: Vec<f32> = (-steps..=steps).map(|i| i as f32 * STEP_DEGREES).collect();
    // Smaller corrections win ties.
    candidates.sort_by(|a, b| a.abs().total_cmp(&b.abs()));

    let mut best_degrees = 0.0f32;
    let mut best_score = 0u64;
    for degrees in candidates {
        let score = if degrees == 0.0 {
            profile_score(&sample)
        } else {
            let rotated = rotate_about_center(
                &sample,
                degrees.to_radians(),
                Interpolation::Nearest,
                Luma([255]),
            );
            profile_score(&rotated)
        };
        if score > best_score {
            best_score = score;
            best_degrees = degrees;
        }
    }

    best_degrees.to_radians()
}

/// Rotate `bitmap` so its text lines are horizontal. Uncovered corners are
/// filled with white.
pub fn deskew(bitmap: DynamicImage) -> DynamicImage {
    let angle = estimate_skew(&bitmap.to_luma8());
    if angle == 0.0 {
        return bitmap;
    }
    debug!(degrees = angle.to_degrees(), "Correcting skew");

    let interpolation = Interpolation::Bilinear;
    match bitmap {
        DynamicImage::ImageLuma8(gray) => DynamicImage::ImageLuma8(rotate_about_center(
            &gray,
            angle,
            interpolation,
            Luma([255]),
        )),
        DynamicImage::ImageRgba8(rgba) => DynamicImage::ImageRgba8(rotate_about_center(
            &rgba,
            angle,
            interpolation,
            Rgba([255, 255, 255, 255]),
        )),
        other => DynamicImage::ImageRgb8(rotate_about_center(
            &other.to_rgb8(),
            angle,
            interpolation,
            Rgb([255, 255, 255]),
        )),
    }
}
