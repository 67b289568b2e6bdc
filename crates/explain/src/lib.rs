//! Glossify term resolution
//!
//! Answers "explain this term" against a stored paper: the paper's own
//! glossary first, the language model otherwise.

pub mod explainer;
pub mod resolver;

pub use explainer::{ExplainerAnswer, TermExplainer};
pub use resolver::{Explanation, ExplanationSource, TermResolver, MAX_TERM_CHARS};
