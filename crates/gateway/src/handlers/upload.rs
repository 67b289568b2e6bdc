//! PDF upload handler

use crate::AppState;
use axum::extract::multipart::{Multipart, MultipartError};
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use glossify_common::errors::{AppError, Result};
use glossify_common::metrics::record_rejection;
use glossify_common::Glossary;
use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub paper_id: Uuid,
    pub title_guess: String,
    pub domain_tags: Vec<String>,
    pub glossary: Glossary,
}

/// An uploaded `file` part
struct FilePart {
    name: Option<String>,
    bytes: Vec<u8>,
}

/// Accept a PDF, run the ingestion pipeline and return its glossary
#[instrument(skip_all)]
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let limit = state.config.server.max_upload_bytes;
    let mut file: Option<FilePart> = None;
    let mut user_id: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some("file") => {
                let name = field.file_name().map(str::to_string);
                let bytes = field.bytes().await.map_err(|e| multipart_error(e, limit))?;
                file = Some(FilePart {
                    name,
                    bytes: bytes.to_vec(),
                });
            }
            Some("user_id") => {
                let value = field.text().await.map_err(|e| multipart_error(e, limit))?;
                user_id = Some(value);
            }
            _ => {}
        }
    }

    let file = file.ok_or_else(|| {
        record_rejection("no_file");
        AppError::missing_field("file", "No file provided")
    })?;

    let file_name = file.name.unwrap_or_default();
    if file_name.is_empty() {
        record_rejection("no_file");
        return Err(AppError::missing_field("file", "No file selected"));
    }
    if !is_pdf_name(&file_name) {
        record_rejection("not_pdf");
        warn!(file_name = %file_name, "Rejected non-PDF upload");
        return Err(AppError::InvalidFormat {
            message: "Only PDF files are allowed".to_string(),
        });
    }

    let outcome = state.processor.ingest(file.bytes, user_id).await?;
    let paper = outcome.paper;

    info!(
        paper_id = %paper.id,
        file_name = %file_name,
        degraded = outcome.persistence.is_degraded(),
        "Upload complete"
    );

    Ok(Json(UploadResponse {
        paper_id: paper.id,
        title_guess: paper.title,
        domain_tags: paper.domain_tags,
        glossary: paper.glossary,
    }))
}

fn is_pdf_name(name: &str) -> bool {
    name.rsplit_once('.')
        .map(|(_, ext)| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

fn multipart_error(err: MultipartError, limit: usize) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        record_rejection("too_large");
        AppError::PayloadTooLarge { limit }
    } else {
        AppError::InvalidFormat {
            message: err.body_text(),
        }
    }
}
