use super::amounts::ExtractedAmount;
use super::lines::mean;
use crate::config::validate_threshold;
use crate::error::OcrError;
use serde::Serialize;

/// Aggregate figures over every extracted amount
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionMeta {
    pub count: usize,
    /// Mean confidence of all amounts, exactly 0.0 when there are none
    pub avg_confidence: f32,
}

/// Amounts split into those safe to import and those needing review
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub all: Vec<ExtractedAmount>,
    pub auto_import: Vec<ExtractedAmount>,
    pub needs_confirm: Vec<ExtractedAmount>,
    pub meta: ExtractionMeta,
}

impl ExtractionResult {
    pub fn empty() -> Self {
        Self {
            all: Vec::new(),
            auto_import: Vec::new(),
            needs_confirm: Vec::new(),
            meta: ExtractionMeta {
                count: 0,
                avg_confidence: 0.0,
            },
        }
    }
}

/// Partition amounts by `confidence >= threshold`, keeping input order
/// on both sides
pub fn triage(amounts: Vec<ExtractedAmount>, threshold: f32) -> Result<ExtractionResult, OcrError> {
    validate_threshold(threshold)?;

    let (auto_import, needs_confirm): (Vec<_>, Vec<_>) = amounts
        .iter()
        .cloned()
        .partition(|a| a.confidence >= threshold);

    let meta = ExtractionMeta {
        count: amounts.len(),
        avg_confidence: mean(amounts.iter().map(|a| a.confidence)),
    };

    Ok(ExtractionResult {
        all: amounts,
        auto_import,
        needs_confirm,
        meta,
    })
}
