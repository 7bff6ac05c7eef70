//! Leptess/Tesseract engine implementation
//!
//! Tesseract-based OCR engine. Better for noisy/messy images like phone photos.
//! Uses tesseract-static crate for static linking (no system dependencies).
//! Downloads tessdata (training data) automatically on first use.

use super::download::{cache_dir, ensure_downloaded};
use super::tsv;
use crate::config::{Config, EngineMode};
use crate::engine::{Recognizer, Token};
use crate::error::OcrError;
use image::GrayImage;
use tesseract_static::tesseract::{OcrEngineMode, Tesseract};

/// Tesseract OCR Engine
pub struct LeptessRecognizer {
    /// Path to tessdata directory
    tessdata_path: String,
    mode: EngineMode,
}

impl LeptessRecognizer {
    /// Create a new Tesseract-based recognizer
    pub fn new(config: &Config, mode: &EngineMode) -> Result<Self, OcrError> {
        let tessdata_path = match &config.tessdata_path {
            Some(path) => path.clone(),
            None => ensure_tessdata_available(&mode.languages)?,
        };

        let recognizer = Self {
            tessdata_path,
            mode: mode.clone(),
        };

        // Validate that tessdata is accessible by doing a test initialization
        drop(recognizer.init()?);

        tracing::info!(
            "Leptess engine initialized (tessdata: {}, mode: {})",
            recognizer.tessdata_path,
            recognizer.mode
        );

        Ok(recognizer)
    }

    fn init(&self) -> Result<Tesseract, OcrError> {
        let tess = Tesseract::new_with_oem(
            Some(&self.tessdata_path),
            Some(&self.mode.language_spec()),
            engine_mode(self.mode.oem),
        )
        .map_err(|e| OcrError::Recognition(format!("Failed to initialize Tesseract: {}", e)))?;

        tess.set_variable("tessedit_pageseg_mode", &self.mode.psm.to_string())
            .map_err(|e| OcrError::Recognition(format!("Failed to set page segmentation: {}", e)))
    }
}

impl Recognizer for LeptessRecognizer {
    fn name(&self) -> &'static str {
        "leptess"
    }

    fn description(&self) -> &'static str {
        "Tesseract OCR engine - better for noisy/messy images like phone photos"
    }

    fn recognize(&self, raster: &GrayImage) -> Result<Vec<Token>, OcrError> {
        let (width, height) = raster.dimensions();

        // Convert to BMP in memory (BMP is always supported by leptonica)
        let mut bmp_data = Vec::new();
        raster
            .write_to(&mut std::io::Cursor::new(&mut bmp_data), image::ImageFormat::Bmp)
            .map_err(|e| OcrError::Recognition(format!("Failed to convert to BMP: {}", e)))?;

        tracing::debug!(
            "Recognizing raster: {}x{}, BMP size: {} bytes",
            width,
            height,
            bmp_data.len()
        );

        let tess = self.init()?;

        let tess = tess.set_image_from_mem(&bmp_data).map_err(|e| {
            OcrError::Recognition(format!(
                "Failed to set image ({}x{}, {} bytes): {}",
                width,
                height,
                bmp_data.len(),
                e
            ))
        })?;

        let mut tess = tess
            .recognize()
            .map_err(|e| OcrError::Recognition(format!("Failed to recognize text: {}", e)))?;

        let tsv_text = tess
            .get_tsv_text(0)
            .map_err(|e| OcrError::Recognition(format!("Failed to get TSV output: {}", e)))?;

        Ok(tsv::parse(&tsv_text))
    }

    fn supported_languages(&self) -> Vec<String> {
        self.mode.languages.clone()
    }
}

/// Map `--oem` numbers onto Tesseract's engine modes
fn engine_mode(oem: u8) -> OcrEngineMode {
    match oem {
        0 => OcrEngineMode::TesseractOnly,
        1 => OcrEngineMode::LstmOnly,
        2 => OcrEngineMode::TesseractLstmCombined,
        _ => OcrEngineMode::Default,
    }
}

/// Ensure tessdata for every language is available, downloading if needed
fn ensure_tessdata_available(languages: &[String]) -> Result<String, OcrError> {
    let dir = cache_dir("tessdata")?;

    for language in languages {
        let filename = format!("{}.traineddata", language);
        ensure_downloaded(&tessdata_url(language), &dir, &filename)?;
    }

    // Tesseract expects the directory, not the file
    dir.to_str()
        .map(|s| s.to_string())
        .ok_or_else(|| OcrError::InitializationError("Invalid tessdata path".to_string()))
}

/// Get tessdata download URL for a language
fn tessdata_url(language: &str) -> String {
    // Use tessdata_fast for smaller, faster downloads
    format!(
        "https://github.com/tesseract-ocr/tessdata_fast/raw/main/{}.traineddata",
        language
    )
}
