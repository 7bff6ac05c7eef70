use crate::error::OcrError;
use image::GrayImage;
use serde::Serialize;
use std::time::Instant;

use super::steps;
use super::steps::threshold::ThresholdMethod;

/// Tunables for the normalization pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct PreprocessOptions {
    /// Images whose longest side is below this are upscaled
    pub upscale_below: u32,
    pub upscale_factor: f32,
    /// Median filter radius (1 = 3x3 window)
    pub median_radius: u32,
    /// Adaptive threshold block size, odd
    pub threshold_block_size: u32,
    /// Subtracted from the local mean before comparing
    pub threshold_bias: f32,
    pub threshold_method: ThresholdMethod,
    /// Tilts up to this many degrees are not corrected
    pub deskew_deadband_degrees: f32,
}

impl Default for PreprocessOptions {
    fn default() -> Self {
        Self {
            upscale_below: 800,
            upscale_factor: 2.0,
            median_radius: 1,
            threshold_block_size: 15,
            threshold_bias: 6.0,
            threshold_method: ThresholdMethod::Gaussian,
            deskew_deadband_degrees: 0.1,
        }
    }
}

impl PreprocessOptions {
    pub fn validate(&self) -> Result<(), OcrError> {
        if !self.upscale_factor.is_finite() || self.upscale_factor < 1.0 {
            return Err(OcrError::Config(format!(
                "upscale factor must be at least 1.0, got {}",
                self.upscale_factor
            )));
        }
        if self.threshold_block_size < 3 || self.threshold_block_size % 2 == 0 {
            return Err(OcrError::Config(format!(
                "threshold block size must be odd and at least 3, got {}",
                self.threshold_block_size
            )));
        }
        if !self.threshold_bias.is_finite() {
            return Err(OcrError::Config("threshold bias must be finite".to_string()));
        }
        if !self.deskew_deadband_degrees.is_finite() || self.deskew_deadband_degrees < 0.0 {
            return Err(OcrError::Config(format!(
                "deskew deadband must be non-negative, got {}",
                self.deskew_deadband_degrees
            )));
        }
        Ok(())
    }
}

/// Timing information for a single preprocessing step
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepTiming {
    pub name: String,
    pub time_ms: u64,
}

/// Result of preprocessing including timing stats
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreprocessingResult {
    /// Normalized raster (not serialized)
    #[serde(skip)]
    pub image: GrayImage,
    /// Total preprocessing time in milliseconds
    pub total_time_ms: u64,
    /// Rotation applied by deskew, in degrees
    pub rotation_degrees: Option<f32>,
    /// Individual step timings
    pub steps: Vec<StepTiming>,
}

/// Preprocessing pipeline: grayscale, upscale, denoise, threshold, deskew
pub struct Pipeline {
    options: PreprocessOptions,
}

impl Pipeline {
    pub fn new(options: PreprocessOptions) -> Self {
        Self { options }
    }

    /// Decode raw image bytes and normalize them
    pub fn process(&self, raw: &[u8]) -> Result<PreprocessingResult, OcrError> {
        let start = Instant::now();
        let mut steps_timing = Vec::new();

        let img = self.run_step("grayscale", raw, &mut steps_timing, steps::grayscale::decode)?;
        let (width, height) = img.dimensions();
        tracing::debug!("Decoded {}x{} image", width, height);

        let mut result = self.normalize_raster(img, steps_timing)?;
        result.total_time_ms = start.elapsed().as_millis() as u64;
        Ok(result)
    }

    /// Run every step after decoding on an existing grayscale raster
    pub fn process_raster(&self, image: GrayImage) -> Result<PreprocessingResult, OcrError> {
        let start = Instant::now();
        let mut result = self.normalize_raster(image, Vec::new())?;
        result.total_time_ms = start.elapsed().as_millis() as u64;
        Ok(result)
    }

    fn normalize_raster(
        &self,
        image: GrayImage,
        mut steps_timing: Vec<StepTiming>,
    ) -> Result<PreprocessingResult, OcrError> {
        let o = &self.options;
        let mut img = image;

        img = self.run_step("upscale", img, &mut steps_timing, |img| {
            steps::upscale::apply(img, o.upscale_below, o.upscale_factor)
        })?;

        img = self.run_step("denoise", img, &mut steps_timing, |img| {
            steps::denoise::apply(img, o.median_radius)
        })?;

        img = self.run_step("threshold", img, &mut steps_timing, |img| {
            steps::threshold::apply(
                img,
                o.threshold_block_size,
                o.threshold_bias,
                o.threshold_method,
            )
        })?;

        let mut rotation_degrees = None;
        img = self.run_step("deskew", img, &mut steps_timing, |img| {
            let (img, rotation) = steps::deskew::apply(img, o.deskew_deadband_degrees)?;
            rotation_degrees = rotation;
            Ok(img)
        })?;

        Ok(PreprocessingResult {
            image: img,
            total_time_ms: 0,
            rotation_degrees,
            steps: steps_timing,
        })
    }

    fn run_step<I, F>(
        &self,
        name: &str,
        input: I,
        timings: &mut Vec<StepTiming>,
        step_fn: F,
    ) -> Result<GrayImage, OcrError>
    where
        F: FnOnce(I) -> Result<GrayImage, OcrError>,
    {
        let step_start = Instant::now();
        let result = step_fn(input)?;
        timings.push(StepTiming {
            name: name.to_string(),
            time_ms: step_start.elapsed().as_millis() as u64,
        });
        Ok(result)
    }
}
