//! One extraction call: normalize, recognize, group lines, find amounts, triage

use crate::config::{validate_threshold, ExtractionConfig};
use crate::engine::{Recognizer, Token};
use crate::error::OcrError;
use crate::extraction::{aggregate, extract, triage, ExtractionResult};
use crate::preprocessing::{normalize, PreprocessingResult};
use image::GrayImage;
use std::sync::Arc;
use std::time::Instant;

/// Runs the full extraction for raw image bytes against one engine
#[derive(Clone)]
pub struct OcrProcessor {
    recognizer: Arc<dyn Recognizer>,
    config: ExtractionConfig,
}

impl OcrProcessor {
    pub fn new(recognizer: Arc<dyn Recognizer>, config: ExtractionConfig) -> Result<Self, OcrError> {
        config.validate()?;
        Ok(Self { recognizer, config })
    }

    pub fn engine_name(&self) -> &'static str {
        self.recognizer.name()
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Extract and triage amounts using the configured threshold
    pub fn extract_amounts(&self, raw: &[u8]) -> Result<ExtractionResult, OcrError> {
        self.extract_amounts_with_threshold(raw, self.config.confidence_threshold)
    }

    /// Extract and triage amounts with a threshold for this call only
    pub fn extract_amounts_with_threshold(
        &self,
        raw: &[u8],
        threshold: f32,
    ) -> Result<ExtractionResult, OcrError> {
        // Reject a bad threshold before spending time on recognition
        validate_threshold(threshold)?;

        let normalized = self.normalize(raw)?;
        let tokens = self.recognize(&normalized.image)?;
        self.finish(&tokens, threshold)
    }

    /// Stage 1: decode and normalize the image
    pub fn normalize(&self, raw: &[u8]) -> Result<PreprocessingResult, OcrError> {
        let result = normalize(raw, &self.config.preprocess)?;
        tracing::debug!(
            "Preprocessed to {}x{} in {}ms (rotation: {:?})",
            result.image.width(),
            result.image.height(),
            result.total_time_ms,
            result.rotation_degrees
        );
        Ok(result)
    }

    /// Stage 2: run the recognition engine
    pub fn recognize(&self, raster: &GrayImage) -> Result<Vec<Token>, OcrError> {
        let start = Instant::now();
        let tokens = self.recognizer.recognize(raster)?;
        tracing::debug!(
            "{} produced {} tokens in {}ms",
            self.recognizer.name(),
            tokens.len(),
            start.elapsed().as_millis()
        );
        Ok(tokens)
    }

    /// Stages 3 to 5: lines, amounts, triage
    pub fn finish(&self, tokens: &[Token], threshold: f32) -> Result<ExtractionResult, OcrError> {
        let lines = aggregate(tokens);
        let amounts = extract(&lines);
        let result = triage(amounts, threshold)?;

        tracing::debug!(
            "{} lines, {} amounts ({} auto-import, {} to confirm), avg confidence {:.2}",
            lines.len(),
            result.meta.count,
            result.auto_import.len(),
            result.needs_confirm.len(),
            result.meta.avg_confidence
        );

        Ok(result)
    }
}

/// Function-style entry point: extract amounts from `raw` with `recognizer`
pub fn extract_amounts(
    raw: &[u8],
    recognizer: Arc<dyn Recognizer>,
    config: &ExtractionConfig,
) -> Result<ExtractionResult, OcrError> {
    OcrProcessor::new(recognizer, config.clone())?.extract_amounts(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::fixed::FixedRecognizer;
    use crate::extraction::Line;

    fn processor(lines: &[(&str, f32)]) -> OcrProcessor {
        OcrProcessor::new(
            Arc::new(FixedRecognizer::from_lines(lines)),
            ExtractionConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_amount_due_scenario() {
        let lines = vec![Line {
            line_id: 0,
            text: "Amount Due N 1,000.50".to_string(),
            mean_confidence: 0.92,
        }];

        let result = triage(extract(&lines), 0.80).unwrap();

        assert_eq!(result.all.len(), 1);
        assert_eq!(result.all[0].amount, 1000.50);
        assert_eq!(result.all[0].confidence, 0.92);
        assert_eq!(result.auto_import, result.all);
        assert!(result.needs_confirm.is_empty());
        assert_eq!(result.meta.count, 1);
        assert_eq!(result.meta.avg_confidence, 0.92);
    }

    #[test]
    fn test_finish_with_no_tokens_is_empty_result() {
        let result = processor(&[]).finish(&[], 0.8).unwrap();
        assert_eq!(result, ExtractionResult::empty());
    }

    #[test]
    fn test_finish_ignores_lines_without_amounts() {
        let p = processor(&[]);
        let tokens = vec![Token::new("Thank", 0, 0.9), Token::new("you", 0, 0.9)];
        let result = p.finish(&tokens, 0.8).unwrap();
        assert!(result.all.is_empty());
        assert_eq!(result.meta.avg_confidence, 0.0);
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = ExtractionConfig {
            confidence_threshold: 2.0,
            ..Default::default()
        };
        let result = OcrProcessor::new(Arc::new(FixedRecognizer::new(Vec::new())), config);
        assert!(matches!(result, Err(OcrError::Config(_))));
    }

    #[test]
    fn test_invalid_threshold_fails_before_decoding() {
        // Garbage bytes would be a decode error; the threshold is checked first
        let result = processor(&[]).extract_amounts_with_threshold(b"junk", -1.0);
        assert!(matches!(result, Err(OcrError::Config(_))));
    }

    #[test]
    fn test_undecodable_input() {
        let result = processor(&[("Total 5", 0.9)]).extract_amounts(b"junk");
        assert!(matches!(result, Err(OcrError::Decode(_))));
    }
}
