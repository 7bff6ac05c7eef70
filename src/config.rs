use crate::error::OcrError;
use crate::preprocessing::PreprocessOptions;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Confidence at or above which an amount is imported without review
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.80;

/// Tesseract-style mode string used when none is configured
pub const DEFAULT_ENGINE_MODE: &str = "--oem 1 --psm 4 -l eng+osd";

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub engine_mode: String,
    pub confidence_threshold: f32,
    pub recognition_timeout: Duration,
    pub max_file_size: usize,
    pub tessdata_path: Option<String>,
}

impl Config {
    /// Build the per-call extraction settings, rejecting invalid values
    pub fn extraction_config(&self) -> Result<ExtractionConfig, OcrError> {
        let config = ExtractionConfig {
            confidence_threshold: self.confidence_threshold,
            engine_mode: self.engine_mode.parse()?,
            preprocess: PreprocessOptions::default(),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Settings for a single extraction call
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionConfig {
    pub confidence_threshold: f32,
    pub engine_mode: EngineMode,
    pub preprocess: PreprocessOptions,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            engine_mode: EngineMode::default(),
            preprocess: PreprocessOptions::default(),
        }
    }
}

impl ExtractionConfig {
    pub fn validate(&self) -> Result<(), OcrError> {
        validate_threshold(self.confidence_threshold)?;
        self.preprocess.validate()
    }
}

/// Thresholds must be finite and within [0, 1]
pub fn validate_threshold(threshold: f32) -> Result<(), OcrError> {
    if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
        return Err(OcrError::Config(format!(
            "confidence threshold must be within [0, 1], got {}",
            threshold
        )));
    }
    Ok(())
}

/// Recognition engine mode: layout, engine and language list.
///
/// Parsed from and rendered as `--oem <n> --psm <n> -l <lang+lang>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineMode {
    /// Engine mode (0 legacy, 1 neural, 2 legacy + neural, 3 engine default)
    pub oem: u8,
    /// Page segmentation mode (4 = single column of text of variable sizes)
    pub psm: u8,
    pub languages: Vec<String>,
}

impl Default for EngineMode {
    fn default() -> Self {
        Self {
            oem: 1,
            psm: 4,
            languages: vec!["eng".to_string(), "osd".to_string()],
        }
    }
}

impl EngineMode {
    /// Languages joined the way Tesseract expects them
    pub fn language_spec(&self) -> String {
        self.languages.join("+")
    }

    /// Languages used for recognition, without the orientation pseudo-language
    pub fn recognition_languages(&self) -> impl Iterator<Item = &str> {
        self.languages
            .iter()
            .map(String::as_str)
            .filter(|lang| *lang != "osd")
    }
}

impl FromStr for EngineMode {
    type Err = OcrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut mode = EngineMode::default();
        let mut parts = s.split_whitespace();

        while let Some(flag) = parts.next() {
            let value = parts
                .next()
                .ok_or_else(|| OcrError::Config(format!("engine mode flag {} has no value", flag)))?;
            match flag {
                "--oem" => mode.oem = parse_bounded(flag, value, 3)?,
                "--psm" => mode.psm = parse_bounded(flag, value, 13)?,
                "-l" => mode.languages = parse_languages(value)?,
                other => {
                    return Err(OcrError::Config(format!(
                        "unknown engine mode flag: {}",
                        other
                    )))
                }
            }
        }

        Ok(mode)
    }
}

impl fmt::Display for EngineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "--oem {} --psm {} -l {}",
            self.oem,
            self.psm,
            self.language_spec()
        )
    }
}

fn parse_bounded(flag: &str, value: &str, max: u8) -> Result<u8, OcrError> {
    match value.parse::<u8>() {
        Ok(n) if n <= max => Ok(n),
        _ => Err(OcrError::Config(format!(
            "{} expects a number between 0 and {}, got {:?}",
            flag, max, value
        ))),
    }
}

fn parse_languages(value: &str) -> Result<Vec<String>, OcrError> {
    let languages: Vec<String> = value.split('+').map(str::to_string).collect();
    let valid = languages.iter().all(|lang| {
        !lang.is_empty() && lang.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    });
    if !valid {
        return Err(OcrError::Config(format!("invalid language list: {:?}", value)));
    }
    Ok(languages)
}
