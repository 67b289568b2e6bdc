//! Ingestion error types

use glossify_common::errors::AppError;
use thiserror::Error;

/// Reasons an upload is rejected. Persistence failures are not here: they
/// degrade the outcome instead of failing it.
#[derive(Error, Debug)]
pub enum IngestionError {
    #[error("Could not extract text from PDF")]
    ExtractionEmpty,

    #[error("Document analysis failed: {message}")]
    AnalysisUnavailable { message: String },
}

impl IngestionError {
    /// Label used on the rejection counter
    pub fn reason(&self) -> &'static str {
        match self {
            IngestionError::ExtractionEmpty => "no_text",
            IngestionError::AnalysisUnavailable { .. } => "analysis_failed",
        }
    }
}

impl From<IngestionError> for AppError {
    fn from(e: IngestionError) -> Self {
        match e {
            IngestionError::ExtractionEmpty => AppError::ExtractionEmpty,
            IngestionError::AnalysisUnavailable { message } => {
                AppError::AnalysisUnavailable { message }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glossify_common::errors::ErrorCode;

    #[test]
    fn test_maps_to_app_error() {
        let err: AppError = IngestionError::ExtractionEmpty.into();
        assert_eq!(err.code(), ErrorCode::ExtractionEmpty);
        assert_eq!(err.status_code().as_u16(), 400);

        let err: AppError = IngestionError::AnalysisUnavailable {
            message: "timeout".into(),
        }
        .into();
        assert_eq!(err.status_code().as_u16(), 502);
    }
}
