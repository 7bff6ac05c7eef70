//! OCRS engine implementation
//!
//! Pure Rust OCR engine using the ocrs library. No system dependencies required.
//! Downloads neural network models automatically on first use.

use super::download::{cache_dir, ensure_downloaded};
use crate::config::EngineMode;
use crate::engine::{Recognizer, Token};
use crate::error::OcrError;
use image::{DynamicImage, GrayImage};
use ocrs::{DecodeMethod, ImageSource, OcrEngine as OcrsOcrEngine, OcrEngineParams};
use rten::Model;

/// Default model URLs from the ocrs project
const DETECTION_MODEL_URL: &str =
    "https://ocrs-models.s3-accelerate.amazonaws.com/text-detection.rten";
const RECOGNITION_MODEL_URL: &str =
    "https://ocrs-models.s3-accelerate.amazonaws.com/text-recognition.rten";

/// Recognizer wrapping the ocrs library
pub struct OcrsRecognizer {
    engine: OcrsOcrEngine,
}

impl OcrsRecognizer {
    /// Create the engine, downloading models if needed
    pub fn new(mode: &EngineMode) -> Result<Self, OcrError> {
        if mode.recognition_languages().any(|lang| lang != "eng") {
            tracing::warn!(
                "ocrs only recognizes English/Latin text, ignoring languages {}",
                mode.language_spec()
            );
        }

        let models = cache_dir("models")?;
        let detection_model_path =
            ensure_downloaded(DETECTION_MODEL_URL, &models, "text-detection.rten")?;
        let recognition_model_path =
            ensure_downloaded(RECOGNITION_MODEL_URL, &models, "text-recognition.rten")?;

        let detection_model = Model::load_file(&detection_model_path).map_err(|e| {
            OcrError::InitializationError(format!("Failed to load detection model: {}", e))
        })?;
        let recognition_model = Model::load_file(&recognition_model_path).map_err(|e| {
            OcrError::InitializationError(format!("Failed to load recognition model: {}", e))
        })?;

        let engine = OcrsOcrEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            decode_method: DecodeMethod::Greedy,
            ..Default::default()
        })
        .map_err(|e| {
            OcrError::InitializationError(format!("Failed to create OCR engine: {}", e))
        })?;

        tracing::info!("ocrs engine initialized successfully");

        Ok(Self { engine })
    }
}

impl Recognizer for OcrsRecognizer {
    fn name(&self) -> &'static str {
        "ocrs"
    }

    fn description(&self) -> &'static str {
        "Pure Rust OCR engine - fast, no system dependencies required"
    }

    fn recognize(&self, raster: &GrayImage) -> Result<Vec<Token>, OcrError> {
        // ImageSource::from_bytes expects HWC RGB
        let rgb_img = DynamicImage::ImageLuma8(raster.clone()).into_rgb8();
        let dimensions = rgb_img.dimensions();

        let img_source = ImageSource::from_bytes(rgb_img.as_raw(), dimensions).map_err(|e| {
            OcrError::Recognition(format!("Failed to create image source: {}", e))
        })?;

        let ocr_input = self
            .engine
            .prepare_input(img_source)
            .map_err(|e| OcrError::Recognition(format!("Failed to prepare input: {}", e)))?;

        let word_rects = self
            .engine
            .detect_words(&ocr_input)
            .map_err(|e| OcrError::Recognition(format!("Failed to detect words: {}", e)))?;

        let line_rects = self.engine.find_text_lines(&ocr_input, &word_rects);

        let line_texts = self
            .engine
            .recognize_text(&ocr_input, &line_rects)
            .map_err(|e| OcrError::Recognition(format!("Failed to recognize text: {}", e)))?;

        let mut tokens = Vec::new();
        for (line_id, line) in line_texts.iter().enumerate() {
            let Some(line) = line else {
                continue;
            };
            let words: Vec<String> = line.words().map(|word| word.to_string()).collect();
            // ocrs reports no scores; every word shares its line's quality score
            let confidence = line_confidence(&words.join(" "));
            tokens.extend(
                words
                    .into_iter()
                    .map(|word| Token::new(word, line_id as u32, confidence)),
            );
        }

        Ok(tokens)
    }

    fn supported_languages(&self) -> Vec<String> {
        // ocrs currently only supports English/Latin alphabet
        vec!["eng".to_string()]
    }
}

/// Score a recognized line using text quality heuristics.
///
/// Receipt lines are short and digit-heavy, so digits count as regular
/// content alongside letters.
fn line_confidence(text: &str) -> f32 {
    if text.trim().is_empty() {
        return 0.0;
    }

    let char_score = analyze_char_frequency(text);
    let word_score = analyze_word_lengths(text);
    let repetition_score = detect_repetition(text);

    let confidence = 0.5 * char_score + 0.25 * word_score + 0.25 * repetition_score;

    confidence.clamp(0.0, 1.0)
}

/// Analyze character mix for signs of garbled OCR.
///
/// Penalizes text with too many symbols outside letters, digits and
/// ordinary punctuation.
fn analyze_char_frequency(text: &str) -> f32 {
    let visible: Vec<char> = text.chars().filter(|c| !c.is_whitespace()).collect();
    if visible.is_empty() {
        return 0.0;
    }
    let total = visible.len() as f32;

    let alnum = visible.iter().filter(|c| c.is_alphanumeric()).count() as f32;
    let special = visible
        .iter()
        .filter(|c| !c.is_alphanumeric() && !c.is_ascii_punctuation() && !is_currency(**c))
        .count() as f32;

    // Penalize high special char ratio
    let special_penalty = 1.0 - (special / total * 5.0).min(1.0);
    let alnum_score = (alnum / total * 1.25).min(1.0);

    special_penalty * 0.6 + alnum_score * 0.4
}

fn is_currency(c: char) -> bool {
    matches!(c, '₦' | '$' | '€' | '£' | '¥')
}

/// Analyze word length distribution.
///
/// Garbled OCR often produces runs of single-character "words".
fn analyze_word_lengths(text: &str) -> f32 {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return 0.5;
    }

    let single_count = words.iter().filter(|w| w.chars().count() == 1).count();
    let single_ratio = single_count as f32 / words.len() as f32;

    1.0 - (single_ratio * 1.5).min(0.7)
}

/// Detect repeated character sequences.
///
/// Patterns like "aaaa" or "####" often indicate OCR confusion. Digit runs
/// such as "1000000" are normal on receipts and are not penalized.
fn detect_repetition(text: &str) -> f32 {
    let mut max_repeat = 1;
    let mut current = 1;
    let mut prev: Option<char> = None;

    for c in text.chars() {
        if Some(c) == prev && !c.is_whitespace() && !c.is_ascii_digit() {
            current += 1;
            max_repeat = max_repeat.max(current);
        } else {
            current = 1;
        }
        prev = Some(c);
    }

    match max_repeat {
        1..=2 => 1.0,
        3 => 0.8,
        4..=5 => 0.5,
        _ => 0.2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_returns_zero() {
        assert_eq!(line_confidence(""), 0.0);
        assert_eq!(line_confidence("   "), 0.0);
    }

    #[test]
    fn test_clean_receipt_line_high_confidence() {
        let confidence = line_confidence("Total NGN 12,345.67");
        assert!(confidence > 0.9, "Expected > 0.9, got {}", confidence);
    }

    #[test]
    fn test_garbled_text_low_confidence() {
        let confidence = line_confidence("§±®© ¥€£¢¤ ƒ");
        assert!(confidence < 0.6, "Expected < 0.6, got {}", confidence);
    }

    #[test]
    fn test_repeated_chars_lower_confidence() {
        let clean = line_confidence("Hello World");
        let repeated = line_confidence("Hello aaaaaaaa World");
        assert!(repeated < clean, "{} should be below {}", repeated, clean);
    }

    #[test]
    fn test_digit_runs_not_penalized() {
        assert_eq!(detect_repetition("1000000"), 1.0);
    }

    #[test]
    fn test_single_char_words_lower_confidence() {
        let scattered = line_confidence("a b c d e f g h");
        let clean = line_confidence("Total 500");
        assert!(scattered < clean, "{} should be below {}", scattered, clean);
    }
}
