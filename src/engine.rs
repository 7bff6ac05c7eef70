use crate::error::OcrError;
use image::GrayImage;
use serde::Serialize;

/// A single recognized word or fragment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub text: String,
    pub line_id: u32,
    /// Always within [0, 1]
    pub confidence: f32,
}

impl Token {
    /// Create a token, clamping the engine's confidence into [0, 1].
    ///
    /// Engines report negative values (and occasionally NaN) when no
    /// confidence is available; those become 0.
    pub fn new(text: impl Into<String>, line_id: u32, confidence: f32) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        Self {
            text: text.into(),
            line_id,
            confidence,
        }
    }
}

/// Trait that all recognition engines must implement
pub trait Recognizer: Send + Sync {
    /// Returns the engine identifier (e.g., "ocrs", "leptess")
    fn name(&self) -> &'static str;

    /// Returns a human-readable description of the engine
    fn description(&self) -> &'static str;

    /// Recognize a normalized raster and return its token stream
    fn recognize(&self, raster: &GrayImage) -> Result<Vec<Token>, OcrError>;

    /// Get supported languages
    fn supported_languages(&self) -> Vec<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_clamps_negative_confidence() {
        assert_eq!(Token::new(" ", 1, -1.0).confidence, 0.0);
    }

    #[test]
    fn test_token_clamps_out_of_range_and_nan() {
        assert_eq!(Token::new("x", 1, 1.7).confidence, 1.0);
        assert_eq!(Token::new("x", 1, f32::NAN).confidence, 0.0);
        assert_eq!(Token::new("x", 1, 0.42).confidence, 0.42);
    }
}
