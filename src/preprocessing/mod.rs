//! Image preprocessing module for OCR enhancement
//!
//! Turns raw image bytes into a binarized, deskewed grayscale raster.

pub mod pipeline;
pub mod steps;

pub use pipeline::{Pipeline, PreprocessOptions, PreprocessingResult, StepTiming};
pub use steps::threshold::ThresholdMethod;

use crate::error::OcrError;

/// Decode `raw` and run the full normalization pipeline on it
pub fn normalize(raw: &[u8], options: &PreprocessOptions) -> Result<PreprocessingResult, OcrError> {
    Pipeline::new(options.clone()).process(raw)
}
