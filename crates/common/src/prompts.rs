//! Prompt templates for language-model calls

/// System prompt for the joint domain-tagging and glossary-extraction call
pub const DOCUMENT_ANALYZER_SYSTEM_PROMPT: &str = r#"You are an expert document analyzer. Analyze the given document and perform the following tasks:

1. DOMAIN TAGGING
- Identify 2-3 main domains of the document.
- Base your decision on both the title and the content.

2. GLOSSARY EXTRACTION
- Extract new technical terms or specialized vocabulary explicitly created or defined in this document.
- For each term, provide its clear definition in the document.
- Include: Acronyms and abbreviations, key theoretical concepts, domain-specific methodologies or jargon.

OUTPUT FORMAT
Return your response in this exact JSON structure:
{
  "domains": ["domain1", "domain2", "domain3"],
  "glossary": {
      "term": "definition"
  }
}

FOCUS
- Technical terms, jargon, and specialized vocabulary
- Domain-specific concepts and methodologies
- Important acronyms and abbreviations
- Key theoretical or methodological contributions

ONE-SHOT EXAMPLE

Example Article
CiCo: Domain-Aware Sign Language Retrieval via Cross-Lingual Contrastive Learning

This work focuses on sign language retrieval, a recently proposed task for sign language understanding.
Sign language retrieval consists of two sub-tasks: text-to-sign-video (T2V) retrieval and sign-video-to-text (V2T) retrieval.
Our framework, termed as domain-aware sign language retrieval via Cross-lingual Contrastive learning or CiCo for short, outperforms the pioneering method by large margins on various datasets.

Expected Output
{
  "domains": ["Machine Learning", "Contrastive Learning", "Sign Language Retrieval"],
  "glossary": {
      "T2V": "text-to-sign-video",
      "V2T": "sign-video-to-text",
      "CiCo": "domain-aware sign language retrieval via Cross-lingual Contrastive learning"
  }
}
"#;

pub fn analyzer_user_message(title: &str, text: &str) -> String {
    format!(
        "Title: {title}\n\nDocument Content:\n{text}\n\nAnalyze this document and extract domains and glossary as specified."
    )
}

/// System prompt for a single term explanation. An empty context drops
/// the "in the context of" clause.
pub fn explainer_system_prompt(context: &str) -> String {
    let context_clause = if context.trim().is_empty() {
        String::new()
    } else {
        format!(" in the context of: {context}")
    };
    format!(
        "You are an expert at explaining technical terms{context_clause}. Provide a clear, 2-3 sentence explanation."
    )
}

pub fn explainer_user_message(term: &str) -> String {
    format!("Explain the term: {term}")
}
