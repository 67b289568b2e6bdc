//! Term resolution
//!
//! Decision order for one request:
//! 1. over-long selections get a fixed advisory unless the caller forces the model
//! 2. exact glossary hit (skipped when forced)
//! 3. the model, through [`TermExplainer`]
//!
//! The paper's primary domain is attached whichever path answers.

use crate::explainer::TermExplainer;
use glossify_common::metrics::record_explanation;
use glossify_common::Paper;
use serde::Serialize;
use tracing::{debug, instrument};

/// Longest trimmed selection treated as a term
pub const MAX_TERM_CHARS: usize = 120;

/// Returned for selections longer than [`MAX_TERM_CHARS`]
pub const LONG_SELECTION_ADVISORY: &str = "This selection is too long to explain as a single term. \
Select a shorter word or phrase, or ask the model to explain it anyway.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExplanationSource {
    DocumentGlossary,
    Model,
    System,
}

impl ExplanationSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExplanationSource::DocumentGlossary => "document-glossary",
            ExplanationSource::Model => "model",
            ExplanationSource::System => "system",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Explanation {
    pub definition: String,
    pub source: ExplanationSource,
    pub domain: Option<String>,
    /// Set when the model failed and `definition` is the placeholder
    pub fallback: bool,
}

#[derive(Clone)]
pub struct TermResolver {
    explainer: TermExplainer,
}

impl TermResolver {
    pub fn new(explainer: TermExplainer) -> Self {
        Self { explainer }
    }

    #[instrument(skip(self, paper, term), fields(paper_id = %paper.id, term_len = term.len()))]
    pub async fn resolve(&self, paper: &Paper, term: &str, force_model: bool) -> Explanation {
        let domain = paper.primary_domain().map(str::to_string);
        let trimmed = term.trim();

        let (definition, source, fallback) = if !force_model
            && trimmed.chars().count() > MAX_TERM_CHARS
        {
            debug!("Selection too long, returning advisory");
            (LONG_SELECTION_ADVISORY.to_string(), ExplanationSource::System, false)
        } else if let Some(definition) = glossary_hit(paper, term, force_model) {
            (definition.to_string(), ExplanationSource::DocumentGlossary, false)
        } else {
            let answer = self.explainer.explain(trimmed, &paper.text).await;
            (answer.definition, ExplanationSource::Model, answer.fallback)
        };

        record_explanation(source.as_str(), fallback);
        debug!(source = source.as_str(), fallback, "Term resolved");

        Explanation {
            definition,
            source,
            domain,
            fallback,
        }
    }
}

/// Exact, case-sensitive lookup; empty definitions do not count
fn glossary_hit<'a>(paper: &'a Paper, term: &str, force_model: bool) -> Option<&'a str> {
    if force_model {
        return None;
    }
    paper
        .glossary
        .get(term)
        .map(String::as_str)
        .filter(|d| !d.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glossify_common::llm::MockModel;
    use glossify_common::Glossary;
    use std::sync::Arc;
    use uuid::Uuid;

    fn survey() -> Paper {
        Paper {
            id: Uuid::new_v4(),
            owner_id: "anonymous".into(),
            title: "Sign Language Retrieval Survey".into(),
            text: "Sign language retrieval consists of T2V and V2T retrieval.".into(),
            domain_tags: vec!["Sign Language Retrieval".into(), "Machine Learning".into()],
            glossary: Glossary::from([
                ("T2V".to_string(), "text-to-sign-video".to_string()),
                ("Empty".to_string(), "   ".to_string()),
            ]),
            file_location: None,
            page_count: Some(1),
            byte_size: None,
            created_at: chrono::Utc::now(),
        }
    }

    fn resolver(model: MockModel) -> (TermResolver, Arc<MockModel>) {
        let model = Arc::new(model);
        (
            TermResolver::new(TermExplainer::new(model.clone())),
            model,
        )
    }

    #[tokio::test]
    async fn test_glossary_hit() {
        let (resolver, model) = resolver(MockModel::new());
        let paper = survey();

        let explanation = resolver.resolve(&paper, "T2V", false).await;
        assert_eq!(explanation.definition, "text-to-sign-video");
        assert_eq!(explanation.source, ExplanationSource::DocumentGlossary);
        assert_eq!(explanation.domain.as_deref(), Some("Sign Language Retrieval"));
        assert!(!explanation.fallback);
        assert_eq!(model.explain_calls(), 0);
    }

    #[tokio::test]
    async fn test_lookup_is_case_sensitive() {
        let (resolver, model) = resolver(MockModel::new().with_explanation("from model"));
        let explanation = resolver.resolve(&survey(), "t2v", false).await;
        assert_eq!(explanation.source, ExplanationSource::Model);
        assert_eq!(explanation.definition, "from model");
        assert_eq!(model.explain_calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_definition_falls_through() {
        let (resolver, _) = resolver(MockModel::new().with_explanation("from model"));
        let explanation = resolver.resolve(&survey(), "Empty", false).await;
        assert_eq!(explanation.source, ExplanationSource::Model);
    }

    #[tokio::test]
    async fn test_long_selection_returns_advisory() {
        let (resolver, model) = resolver(MockModel::new());
        let mut paper = survey();
        let sentence = "s".repeat(200);
        paper.glossary.insert(sentence.clone(), "even a glossary hit".into());

        let explanation = resolver.resolve(&paper, &sentence, false).await;
        assert_eq!(explanation.definition, LONG_SELECTION_ADVISORY);
        assert_eq!(explanation.source, ExplanationSource::System);
        assert_eq!(explanation.domain.as_deref(), Some("Sign Language Retrieval"));
        assert_eq!(model.explain_calls(), 0);
    }

    #[tokio::test]
    async fn test_length_is_measured_after_trimming() {
        let (resolver, _) = resolver(MockModel::new());
        let padded = format!("   {}   ", "x".repeat(MAX_TERM_CHARS));
        let explanation = resolver.resolve(&survey(), &padded, false).await;
        assert_eq!(explanation.source, ExplanationSource::Model);
    }

    #[tokio::test]
    async fn test_force_model_skips_glossary_and_advisory() {
        let (resolver, model) = resolver(MockModel::new().with_explanation("fresh"));
        let paper = survey();

        let explanation = resolver.resolve(&paper, "T2V", true).await;
        assert_eq!(explanation.source, ExplanationSource::Model);
        assert_eq!(explanation.definition, "fresh");

        let long = resolver.resolve(&paper, &"y".repeat(300), true).await;
        assert_eq!(long.source, ExplanationSource::Model);
        assert_eq!(model.explain_calls(), 2);
    }

    #[tokio::test]
    async fn test_model_failure_is_flagged_fallback() {
        let (resolver, _) = resolver(MockModel::new().failing_explain());
        let explanation = resolver.resolve(&survey(), "a term not in glossary", false).await;
        assert_eq!(explanation.source, ExplanationSource::Model);
        assert!(explanation.fallback);
        assert_eq!(
            explanation.definition,
            "Unable to explain 'a term not in glossary' at this time."
        );
    }

    #[tokio::test]
    async fn test_no_domain_tags() {
        let (resolver, _) = resolver(MockModel::new());
        let mut paper = survey();
        paper.domain_tags.clear();
        let explanation = resolver.resolve(&paper, "T2V", false).await;
        assert!(explanation.domain.is_none());
    }

    #[test]
    fn test_source_serializes_kebab_case() {
        assert_eq!(
            serde_json::to_string(&ExplanationSource::DocumentGlossary).unwrap(),
            "\"document-glossary\""
        );
        assert_eq!(ExplanationSource::System.as_str(), "system");
    }
}
