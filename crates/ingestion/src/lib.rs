//! Glossify ingestion pipeline
//!
//! Turns raw PDF bytes into a stored [`Paper`](glossify_common::Paper):
//! extraction, analysis, then persistence of the file and the record.

pub mod analyzer;
pub mod errors;
pub mod pdf;
pub mod processor;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

pub use analyzer::DocumentAnalyzer;
pub use errors::IngestionError;
pub use pdf::Extraction;
pub use processor::{IngestionOutcome, IngestionProcessor, Persistence};
