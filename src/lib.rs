//! Receipt amount extraction.
//!
//! Raw image bytes are normalized, run through a recognition engine, grouped
//! into lines, scanned for naira amounts and split by confidence into amounts
//! that can be imported directly and amounts that need a human to confirm.

pub mod config;
pub mod engine;
pub mod engines;
pub mod error;
pub mod extraction;
pub mod ocr;
pub mod preprocessing;
pub mod server;

pub use config::{EngineMode, ExtractionConfig, DEFAULT_CONFIDENCE_THRESHOLD};
pub use engine::{Recognizer, Token};
pub use error::OcrError;
pub use extraction::{ExtractedAmount, ExtractionMeta, ExtractionResult, Line};
pub use ocr::{extract_amounts, OcrProcessor};
pub use preprocessing::{normalize, PreprocessOptions, PreprocessingResult};
