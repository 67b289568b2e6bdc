//! Document analysis
//!
//! Prepares the model input (bounded text) and turns the model's answer
//! into clean domain tags and a glossary.

use crate::errors::IngestionError;
use glossify_common::llm::{DocumentAnalysis, LanguageModel};
use glossify_common::metrics::ANALYSIS_DURATION_SECONDS;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};

/// Characters of document text sent to the model
pub const MAX_ANALYSIS_CHARS: usize = 8000;

/// Appended when the text was cut
pub const TRUNCATION_MARKER: &str = "...";

#[derive(Clone)]
pub struct DocumentAnalyzer {
    model: Arc<dyn LanguageModel>,
}

impl DocumentAnalyzer {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// One model call per document, no retries
    #[instrument(skip(self, text), fields(model = self.model.model_name(), text_len = text.len()))]
    pub async fn analyze(&self, title: &str, text: &str) -> Result<DocumentAnalysis, IngestionError> {
        let input = truncate_for_analysis(text);
        let start = Instant::now();

        let result = self.model.analyze(title, &input).await;
        metrics::histogram!(ANALYSIS_DURATION_SECONDS).record(start.elapsed().as_secs_f64());

        match result {
            Ok(analysis) => {
                let analysis = analysis.normalized();
                info!(
                    domains = analysis.domain_tags.len(),
                    terms = analysis.glossary.len(),
                    "Document analyzed"
                );
                Ok(analysis)
            }
            Err(e) => {
                warn!(error = %e, "Document analysis failed");
                Err(IngestionError::AnalysisUnavailable {
                    message: e.to_string(),
                })
            }
        }
    }
}

/// First `MAX_ANALYSIS_CHARS` characters, with the marker when cut
pub fn truncate_for_analysis(text: &str) -> String {
    match text.char_indices().nth(MAX_ANALYSIS_CHARS) {
        Some((cut, _)) => format!("{}{}", &text[..cut], TRUNCATION_MARKER),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glossify_common::llm::{MockModel, ModelCall};
    use glossify_common::Glossary;

    #[test]
    fn test_short_text_untouched() {
        assert_eq!(truncate_for_analysis("short"), "short");
        let exact = "a".repeat(MAX_ANALYSIS_CHARS);
        assert_eq!(truncate_for_analysis(&exact), exact);
    }

    #[test]
    fn test_long_text_truncated_with_marker() {
        let long = "é".repeat(MAX_ANALYSIS_CHARS + 10);
        let cut = truncate_for_analysis(&long);
        assert_eq!(cut.chars().count(), MAX_ANALYSIS_CHARS + TRUNCATION_MARKER.len());
        assert!(cut.ends_with(TRUNCATION_MARKER));
    }

    #[tokio::test]
    async fn test_analyze_sends_truncated_text_and_normalizes() {
        let model = Arc::new(MockModel::new().with_analysis(DocumentAnalysis {
            domain_tags: vec![" Machine Learning ".into(), "".into()],
            glossary: Glossary::from([("T2V".to_string(), "text-to-sign-video".to_string())]),
        }));
        let analyzer = DocumentAnalyzer::new(model.clone());

        let text = "w".repeat(MAX_ANALYSIS_CHARS * 2);
        let analysis = analyzer.analyze("Title", &text).await.unwrap();
        assert_eq!(analysis.domain_tags, vec!["Machine Learning"]);
        assert_eq!(analysis.glossary["T2V"], "text-to-sign-video");

        match &model.calls()[0] {
            ModelCall::Analyze { title, text } => {
                assert_eq!(title, "Title");
                assert_eq!(text.len(), MAX_ANALYSIS_CHARS + 3);
            }
            other => panic!("unexpected call {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_model_failure_is_analysis_unavailable() {
        let analyzer = DocumentAnalyzer::new(Arc::new(MockModel::new().failing_analysis()));
        let err = analyzer.analyze("T", "body").await.unwrap_err();
        assert!(matches!(err, IngestionError::AnalysisUnavailable { .. }));
    }
}
