use crate::error::OcrError;
use image::{imageops, GrayImage};

/// Decode raw image bytes and convert to grayscale
/// This is the foundation for every other preprocessing step
pub fn decode(raw: &[u8]) -> Result<GrayImage, OcrError> {
    let image = image::load_from_memory(raw).map_err(|e| OcrError::Decode(e.to_string()))?;
    let rgb = image.to_rgb8();
    Ok(imageops::grayscale(&rgb))
}
