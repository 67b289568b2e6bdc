//! Model-backed term explanations

use glossify_common::LanguageModel;
use std::sync::Arc;
use tracing::{instrument, warn};

/// Characters of paper text passed to the model as context
pub const CONTEXT_CHARS: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplainerAnswer {
    pub definition: String,
    /// True when the model call failed and the placeholder was returned
    pub fallback: bool,
}

/// Text returned when the model cannot answer
pub fn placeholder(term: &str) -> String {
    format!("Unable to explain '{term}' at this time.")
}

#[derive(Clone)]
pub struct TermExplainer {
    model: Arc<dyn LanguageModel>,
}

impl TermExplainer {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Never fails: model errors become the placeholder answer
    #[instrument(skip(self, paper_text), fields(model = self.model.model_name()))]
    pub async fn explain(&self, term: &str, paper_text: &str) -> ExplainerAnswer {
        let context = context_excerpt(paper_text);

        match self.model.explain(term, context).await {
            Ok(definition) => ExplainerAnswer {
                definition,
                fallback: false,
            },
            Err(e) => {
                warn!(error = %e, "Term explanation failed, using placeholder");
                ExplainerAnswer {
                    definition: placeholder(term),
                    fallback: true,
                }
            }
        }
    }
}

fn context_excerpt(text: &str) -> &str {
    match text.char_indices().nth(CONTEXT_CHARS) {
        Some((cut, _)) => &text[..cut],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glossify_common::llm::{MockModel, ModelCall};

    #[tokio::test]
    async fn test_context_is_first_thousand_chars() {
        let model = Arc::new(MockModel::new().with_explanation("A definition."));
        let explainer = TermExplainer::new(model.clone());

        let text = "t".repeat(CONTEXT_CHARS + 500);
        let answer = explainer.explain("T2V", &text).await;
        assert_eq!(answer.definition, "A definition.");
        assert!(!answer.fallback);

        match &model.calls()[0] {
            ModelCall::Explain { term, context } => {
                assert_eq!(term, "T2V");
                assert_eq!(context.chars().count(), CONTEXT_CHARS);
            }
            other => panic!("unexpected call {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_failure_returns_placeholder() {
        let explainer = TermExplainer::new(Arc::new(MockModel::new().failing_explain()));
        let answer = explainer.explain("CiCo", "context").await;
        assert!(answer.fallback);
        assert_eq!(answer.definition, "Unable to explain 'CiCo' at this time.");
    }

    #[test]
    fn test_short_text_is_whole_context() {
        assert_eq!(context_excerpt("short"), "short");
    }
}
