//! Glossify Common Library
//!
//! Shared code for the Glossify services including:
//! - Paper domain type
//! - Database models and repository
//! - On-disk upload storage
//! - Language model client abstraction and prompts
//! - Error types and handling
//! - Configuration management
//! - Metrics

pub mod config;
pub mod db;
pub mod errors;
pub mod llm;
pub mod metrics;
pub mod paper;
pub mod prompts;
pub mod storage;

// Re-export commonly used types
pub use config::AppConfig;
pub use db::{DbPool, Repository};
pub use errors::{AppError, Result};
pub use llm::{DocumentAnalysis, LanguageModel};
pub use paper::{Glossary, Paper};
pub use storage::FileStore;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Owner id recorded when an upload names no user
pub const ANONYMOUS_OWNER: &str = "anonymous";

/// Title used when neither metadata nor text yields one
pub const UNTITLED: &str = "Untitled Document";
