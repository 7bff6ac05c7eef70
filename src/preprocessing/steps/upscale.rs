use crate::error::OcrError;
use image::imageops::{self, FilterType};
use image::GrayImage;

/// Upscale small images so characters reach a recognizable pixel height
/// Images whose longest side is at least `min_dimension` are returned as-is
pub fn apply(image: GrayImage, min_dimension: u32, factor: f32) -> Result<GrayImage, OcrError> {
    let (width, height) = image.dimensions();

    if width == 0 || height == 0 || width.max(height) >= min_dimension {
        return Ok(image);
    }

    let new_width = (width as f32 * factor).round() as u32;
    let new_height = (height as f32 * factor).round() as u32;

    tracing::debug!(
        "Upscaling {}x{} to {}x{}",
        width,
        height,
        new_width,
        new_height
    );

    // Catmull-Rom is the cubic filter
    Ok(imageops::resize(
        &image,
        new_width,
        new_height,
        FilterType::CatmullRom,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upscale_doubles_small_image() {
        let img = GrayImage::new(300, 200);
        let result = apply(img, 800, 2.0).unwrap();
        assert_eq!(result.dimensions(), (600, 400));
    }

    #[test]
    fn test_upscale_uses_longest_side() {
        // Height is small but width already reaches the minimum
        let img = GrayImage::new(800, 100);
        let result = apply(img, 800, 2.0).unwrap();
        assert_eq!(result.dimensions(), (800, 100));
    }

    #[test]
    fn test_upscale_just_below_minimum() {
        let img = GrayImage::new(799, 10);
        let result = apply(img, 800, 2.0).unwrap();
        assert_eq!(result.dimensions(), (1598, 20));
    }
}
