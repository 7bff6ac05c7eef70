use crate::error::OcrError;
use image::GrayImage;
use imageproc::filter::median_filter;

/// Apply median filter to reduce noise
/// Median filter preserves edges better than a mean filter
pub fn apply(image: GrayImage, radius: u32) -> Result<GrayImage, OcrError> {
    // radius 1 = 3x3 window, effective for salt-and-pepper noise
    Ok(median_filter(&image, radius, radius))
}
