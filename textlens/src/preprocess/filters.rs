use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::filter::gaussian_blur_f32;
use imageproc::morphology::{close, open};

/// Side of the square neighbourhood used for the local threshold.
pub const THRESHOLD_BLOCK_SIZE: u32 = 11;
/// Constant subtracted from the local mean.
pub const THRESHOLD_OFFSET: i16 = 2;

/// Adaptive Gaussian threshold: a pixel becomes white when it is brighter
/// than its Gaussian-weighted neighbourhood mean minus [`THRESHOLD_OFFSET`].
/// Output contains only 0 and 255.
pub fn adaptive_threshold(gray: &GrayImage) -> GrayImage {
    // Same sigma OpenCV derives from the block size.
    let sigma = 0.3 * ((THRESHOLD_BLOCK_SIZE as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let local_mean = gaussian_blur_f32(gray, sigma);

    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let value = gray.get_pixel(x, y)[0] as i16;
        let mean = local_mean.get_pixel(x, y)[0] as i16;
        if value > mean - THRESHOLD_OFFSET {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

/// Linear stretch mapping the darkest pixel to 0 and the lightest to 255.
/// Flat images are returned untouched.
pub fn stretch_contrast(gray: &GrayImage) -> GrayImage {
    let (min_val, max_val) = gray
        .pixels()
        .fold((u8::MAX, u8::MIN), |(lo, hi), p| (lo.min(p[0]), hi.max(p[0])));

    if max_val <= min_val {
        return gray.clone();
    }
    imageproc::contrast::stretch_contrast(gray, min_val, max_val, 0, 255)
}

/// Morphological opening then closing on a binary page with a 3x3 square.
/// Clears specks smaller than the structuring element from both the paper
/// and the ink.
pub fn open_close(binary: &GrayImage) -> GrayImage {
    close(&open(binary, Norm::LInf, 1), Norm::LInf, 1)
}
