//! Error types for Glossify services
//!
//! Provides a single error taxonomy with:
//! - Distinct variants for each failure mode of the pipeline
//! - HTTP status code mapping
//! - Structured error responses with machine-readable codes

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors
    ValidationError,
    MissingField,
    InvalidFormat,
    PayloadTooLarge,
    ExtractionEmpty,

    // Resource errors
    NotFound,
    PaperNotFound,
    UserNotFound,

    // Database and storage errors
    DatabaseError,
    StorageError,

    // External service errors
    AnalysisUnavailable,
    ModelError,

    // Internal errors
    InternalError,
    ConfigurationError,
    SerializationError,
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("{message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    #[error("{message}")]
    MissingField { field: String, message: String },

    #[error("{message}")]
    InvalidFormat { message: String },

    #[error("Payload too large: limit is {limit} bytes")]
    PayloadTooLarge { limit: usize },

    // Pipeline errors
    #[error("Could not extract text from PDF")]
    ExtractionEmpty,

    #[error("Document analysis failed")]
    AnalysisUnavailable { message: String },

    #[error("Language model error: {message}")]
    Model { message: String },

    // Resource errors
    #[error("Resource not found: {resource_type} with id {id}")]
    NotFound { resource_type: String, id: String },

    #[error("Paper not found: {id}")]
    PaperNotFound { id: String },

    #[error("User not found: {id}")]
    UserNotFound { id: String },

    // Database and storage errors
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Storage error: {message}")]
    Storage { message: String },

    // Internal errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Missing multipart/JSON field with a caller-facing message
    pub fn missing_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::MissingField {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation {
            message: message.into(),
            field: None,
        }
    }

    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { .. } => ErrorCode::ValidationError,
            AppError::MissingField { .. } => ErrorCode::MissingField,
            AppError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
            AppError::PayloadTooLarge { .. } => ErrorCode::PayloadTooLarge,
            AppError::ExtractionEmpty => ErrorCode::ExtractionEmpty,
            AppError::AnalysisUnavailable { .. } => ErrorCode::AnalysisUnavailable,
            AppError::Model { .. } => ErrorCode::ModelError,
            AppError::NotFound { .. } => ErrorCode::NotFound,
            AppError::PaperNotFound { .. } => ErrorCode::PaperNotFound,
            AppError::UserNotFound { .. } => ErrorCode::UserNotFound,
            AppError::Database(_) => ErrorCode::DatabaseError,
            AppError::Storage { .. } => ErrorCode::StorageError,
            AppError::Configuration { .. } => ErrorCode::ConfigurationError,
            AppError::Serialization(_) => ErrorCode::SerializationError,
            AppError::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::Validation { .. }
            | AppError::MissingField { .. }
            | AppError::InvalidFormat { .. }
            | AppError::ExtractionEmpty => StatusCode::BAD_REQUEST,

            // 404 Not Found
            AppError::NotFound { .. }
            | AppError::PaperNotFound { .. }
            | AppError::UserNotFound { .. } => StatusCode::NOT_FOUND,

            // 413 Payload Too Large
            AppError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,

            // 500 Internal Server Error
            AppError::Database(_)
            | AppError::Storage { .. }
            | AppError::Configuration { .. }
            | AppError::Serialization(_)
            | AppError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,

            // 502 Bad Gateway
            AppError::AnalysisUnavailable { .. } | AppError::Model { .. } => {
                StatusCode::BAD_GATEWAY
            }
        }
    }

    /// Check if this error should be logged at error level
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Check if this error is a client error
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

/// Structured error response for API
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetails,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();
        let message = self.to_string();

        // The upstream reason stays in the log, not in the response body
        let detail = match &self {
            AppError::AnalysisUnavailable { message } => Some(message.as_str()),
            _ => None,
        };

        if self.is_server_error() {
            tracing::error!(
                error = %message,
                detail = ?detail,
                code = ?code,
                status = status.as_u16(),
                "Server error"
            );
        } else if self.is_client_error() {
            tracing::warn!(
                error = %message,
                code = ?code,
                status = status.as_u16(),
                "Client error"
            );
        }

        let field = match &self {
            AppError::Validation { field, .. } => field.clone(),
            AppError::MissingField { field, .. } => Some(field.clone()),
            _ => None,
        };

        let body = ErrorResponse {
            error: ErrorDetails {
                code,
                message,
                field,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Model {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_mapping() {
        let err = AppError::PaperNotFound { id: "test".into() };
        assert_eq!(err.code(), ErrorCode::PaperNotFound);
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_pipeline_errors() {
        let err = AppError::ExtractionEmpty;
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Could not extract text from PDF");

        let err = AppError::AnalysisUnavailable {
            message: "upstream 500".into(),
        };
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.to_string(), "Document analysis failed");
        assert!(err.is_server_error());
    }

    #[test]
    fn test_missing_field_message_is_verbatim() {
        let err = AppError::missing_field("file", "No file provided");
        assert_eq!(err.to_string(), "No file provided");
        assert!(err.is_client_error());
    }

    #[test]
    fn test_validation_helper_has_no_field() {
        let err = AppError::validation("paper_id and term are required");
        assert_eq!(err.code(), ErrorCode::ValidationError);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(matches!(err, AppError::Validation { field: None, .. }));
    }

    #[test]
    fn test_io_error_is_storage() {
        let err: AppError = std::io::Error::new(std::io::ErrorKind::Other, "disk full").into();
        assert_eq!(err.code(), ErrorCode::StorageError);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_code_serializes_screaming_snake() {
        let json = serde_json::to_string(&ErrorCode::ExtractionEmpty).unwrap();
        assert_eq!(json, "\"EXTRACTION_EMPTY\"");
    }
}
