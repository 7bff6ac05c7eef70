//! Engine that returns a preset token list
//!
//! Used by tests, and by callers that already hold a token stream from an
//! engine running elsewhere.

use crate::engine::{Recognizer, Token};
use crate::error::OcrError;
use image::GrayImage;

pub struct FixedRecognizer {
    tokens: Vec<Token>,
}

impl FixedRecognizer {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    /// One token per whitespace-separated word, one line per input line
    pub fn from_lines(lines: &[(&str, f32)]) -> Self {
        let tokens = lines
            .iter()
            .enumerate()
            .flat_map(|(line_id, (text, confidence))| {
                text.split_whitespace()
                    .map(move |word| Token::new(word, line_id as u32, *confidence))
            })
            .collect();
        Self { tokens }
    }
}

impl Recognizer for FixedRecognizer {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn description(&self) -> &'static str {
        "Returns a preset token stream regardless of the image"
    }

    fn recognize(&self, _raster: &GrayImage) -> Result<Vec<Token>, OcrError> {
        Ok(self.tokens.clone())
    }

    fn supported_languages(&self) -> Vec<String> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_returns_preset_tokens() {
        let tokens = vec![Token::new("Total", 0, 0.9), Token::new("5", 0, 0.8)];
        let engine = FixedRecognizer::new(tokens.clone());
        assert_eq!(engine.recognize(&GrayImage::new(1, 1)).unwrap(), tokens);
    }

    #[test]
    fn test_from_lines_splits_words() {
        let engine = FixedRecognizer::from_lines(&[("Total NGN 5", 0.9), ("Thanks", 0.4)]);
        let tokens = engine.recognize(&GrayImage::new(1, 1)).unwrap();

        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[2], Token::new("5", 0, 0.9));
        assert_eq!(tokens[3], Token::new("Thanks", 1, 0.4));
    }
}
