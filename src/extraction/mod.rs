//! Token stream to triaged amounts: line grouping, amount matching, triage

pub mod amounts;
pub mod lines;
pub mod triage;

pub use amounts::{extract, ExtractedAmount};
pub use lines::{aggregate, Line};
pub use triage::{triage, ExtractionMeta, ExtractionResult};
