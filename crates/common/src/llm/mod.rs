//! Language model abstraction
//!
//! One capability with two operations:
//! - `analyze`: domain tags and glossary for a document, in a single call
//! - `explain`: a short definition of a term given a context excerpt
//!
//! Providers:
//! - OpenAI-compatible chat completions
//! - In-process mock for tests and offline runs

use crate::config::LlmConfig;
use crate::errors::{AppError, Result};
use crate::paper::Glossary;
use crate::prompts;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// Result of the document analysis call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentAnalysis {
    pub domain_tags: Vec<String>,
    pub glossary: Glossary,
}

impl DocumentAnalysis {
    /// Trim tags and terms; drop the ones that end up empty
    pub fn normalized(self) -> Self {
        let domain_tags = self
            .domain_tags
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();

        let glossary = self
            .glossary
            .into_iter()
            .filter_map(|(term, definition)| {
                let term = term.trim();
                (!term.is_empty()).then(|| (term.to_string(), definition.trim().to_string()))
            })
            .collect();

        Self {
            domain_tags,
            glossary,
        }
    }
}

/// Trait for language model providers
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Derive domain tags and a glossary from a (possibly truncated) document
    async fn analyze(&self, title: &str, text: &str) -> Result<DocumentAnalysis>;

    /// Explain a term; `context` may be empty
    async fn explain(&self, term: &str, context: &str) -> Result<String>;

    /// Get the model name
    fn model_name(&self) -> &str;
}

/// Wire shape the analyzer prompt asks for
#[derive(Deserialize)]
struct RawAnalysis {
    domains: Vec<String>,
    glossary: Glossary,
}

/// Parse the analyzer's reply. Markdown code fences around the object are
/// tolerated; anything else that is not the expected JSON shape is an error.
pub fn parse_analysis(reply: &str) -> Result<DocumentAnalysis> {
    let body = strip_code_fences(reply);
    let raw: RawAnalysis = serde_json::from_str(body).map_err(|e| AppError::Model {
        message: format!("Malformed analysis reply: {}", e),
    })?;

    Ok(DocumentAnalysis {
        domain_tags: raw.domains,
        glossary: raw.glossary,
    })
}

fn strip_code_fences(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop an optional language tag on the opening fence
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

// ============================================================================
// OpenAI-compatible client
// ============================================================================

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

/// OpenAI chat-completions client
pub struct OpenAiModel {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
    model: String,
    temperature: f32,
    analysis_max_tokens: u32,
    explain_max_tokens: u32,
}

impl OpenAiModel {
    pub fn new(config: &LlmConfig, api_key: String) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| AppError::Configuration {
            message: format!("Failed to create HTTP client: {}", e),
        })?;

        Ok(Self {
            client,
            api_key,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            analysis_max_tokens: config.analysis_max_tokens,
            explain_max_tokens: config.explain_max_tokens,
        })
    }

    async fn chat(&self, system: String, user: String, max_tokens: u32) -> Result<String> {
        let url = format!("{}/chat/completions", self.api_base);

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            max_tokens,
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Model {
                message: format!("Request failed: {}", e),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Model {
                message: format!("API error {}: {}", status, body),
            });
        }

        let chat: ChatResponse = response.json().await.map_err(|e| AppError::Model {
            message: format!("Failed to parse response: {}", e),
        })?;

        chat.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .ok_or_else(|| AppError::Model {
                message: "Empty response".to_string(),
            })
    }
}

#[async_trait]
impl LanguageModel for OpenAiModel {
    async fn analyze(&self, title: &str, text: &str) -> Result<DocumentAnalysis> {
        let reply = self
            .chat(
                prompts::DOCUMENT_ANALYZER_SYSTEM_PROMPT.to_string(),
                prompts::analyzer_user_message(title, text),
                self.analysis_max_tokens,
            )
            .await?;

        parse_analysis(&reply).inspect_err(|e| {
            tracing::warn!(error = %e, raw = %reply, "Analysis reply did not parse");
        })
    }

    async fn explain(&self, term: &str, context: &str) -> Result<String> {
        self.chat(
            prompts::explainer_system_prompt(context),
            prompts::explainer_user_message(term),
            self.explain_max_tokens,
        )
        .await
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

// ============================================================================
// Mock
// ============================================================================

/// A call received by [`MockModel`]
#[derive(Debug, Clone, PartialEq)]
pub enum ModelCall {
    Analyze { title: String, text: String },
    Explain { term: String, context: String },
}

/// Mock model for testing
#[derive(Default)]
pub struct MockModel {
    analysis: DocumentAnalysis,
    explanation: Option<String>,
    fail_analysis: bool,
    fail_explain: bool,
    calls: Mutex<Vec<ModelCall>>,
}

impl MockModel {
    pub fn new() -> Self {
        Self {
            analysis: DocumentAnalysis {
                domain_tags: vec!["General".to_string()],
                glossary: Glossary::new(),
            },
            ..Self::default()
        }
    }

    pub fn with_analysis(mut self, analysis: DocumentAnalysis) -> Self {
        self.analysis = analysis;
        self
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    pub fn failing_analysis(mut self) -> Self {
        self.fail_analysis = true;
        self
    }

    pub fn failing_explain(mut self) -> Self {
        self.fail_explain = true;
        self
    }

    /// Every call received so far, in order
    pub fn calls(&self) -> Vec<ModelCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn explain_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, ModelCall::Explain { .. }))
            .count()
    }

    fn record(&self, call: ModelCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

#[async_trait]
impl LanguageModel for MockModel {
    async fn analyze(&self, title: &str, text: &str) -> Result<DocumentAnalysis> {
        self.record(ModelCall::Analyze {
            title: title.to_string(),
            text: text.to_string(),
        });
        if self.fail_analysis {
            return Err(AppError::Model {
                message: "mock analysis failure".to_string(),
            });
        }
        Ok(self.analysis.clone())
    }

    async fn explain(&self, term: &str, context: &str) -> Result<String> {
        self.record(ModelCall::Explain {
            term: term.to_string(),
            context: context.to_string(),
        });
        if self.fail_explain {
            return Err(AppError::Model {
                message: "mock explain failure".to_string(),
            });
        }
        Ok(self
            .explanation
            .clone()
            .unwrap_or_else(|| format!("{term} is a technical term.")))
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

/// Create a language model based on configuration
pub fn create_language_model(config: &LlmConfig) -> Result<Arc<dyn LanguageModel>> {
    match config.provider.as_str() {
        "openai" => {
            let key = config.resolved_api_key().ok_or_else(|| AppError::Configuration {
                message: "llm.api_key or OPENAI_API_KEY is required for the openai provider"
                    .to_string(),
            })?;
            Ok(Arc::new(OpenAiModel::new(config, key)?))
        }
        "mock" => Ok(Arc::new(MockModel::new())),
        other => Err(AppError::Configuration {
            message: format!("Unknown llm provider: {}", other),
        }),
    }
}
