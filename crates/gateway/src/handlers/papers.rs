//! Paper management handlers

use super::parse_paper_id;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use glossify_common::{
    errors::{AppError, Result},
    Glossary, Paper,
};
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Serialize)]
pub struct GlossaryResponse {
    pub glossary: Glossary,
    pub total_terms: usize,
}

/// Metadata projection of a paper; the text itself is not returned
#[derive(Serialize)]
pub struct PaperResponse {
    pub paper_id: Uuid,
    pub user_id: String,
    pub title: String,
    pub domain_tags: Vec<String>,
    pub total_terms: usize,
    pub pages: Option<usize>,
    pub file_size: Option<u64>,
    pub has_file: bool,
    pub created_at: String,
}

impl From<&Paper> for PaperResponse {
    fn from(paper: &Paper) -> Self {
        Self {
            paper_id: paper.id,
            user_id: paper.owner_id.clone(),
            title: paper.title.clone(),
            domain_tags: paper.domain_tags.clone(),
            total_terms: paper.glossary.len(),
            pages: paper.page_count,
            file_size: paper.byte_size,
            has_file: paper.file_location.is_some(),
            created_at: paper.created_at.to_rfc3339(),
        }
    }
}

async fn load_paper(state: &AppState, raw_id: &str) -> Result<Paper> {
    let id = parse_paper_id(raw_id)?;
    state
        .repo
        .find_paper(id)
        .await?
        .ok_or_else(|| AppError::PaperNotFound {
            id: raw_id.to_string(),
        })
}

/// Get the glossary computed at upload time
pub async fn get_glossary(
    State(state): State<AppState>,
    Path(paper_id): Path<String>,
) -> Result<Json<GlossaryResponse>> {
    let paper = load_paper(&state, &paper_id).await?;

    Ok(Json(GlossaryResponse {
        total_terms: paper.glossary.len(),
        glossary: paper.glossary,
    }))
}

/// Get a paper by ID
pub async fn get_paper(
    State(state): State<AppState>,
    Path(paper_id): Path<String>,
) -> Result<Json<PaperResponse>> {
    let paper = load_paper(&state, &paper_id).await?;
    Ok(Json(PaperResponse::from(&paper)))
}

/// Stream the stored PDF back
pub async fn get_file(
    State(state): State<AppState>,
    Path(paper_id): Path<String>,
) -> Result<Response> {
    let paper = load_paper(&state, &paper_id).await?;

    let missing = || AppError::NotFound {
        resource_type: "file".to_string(),
        id: paper_id.clone(),
    };

    let location = paper.file_location.as_deref().ok_or_else(missing)?;
    let bytes = state.files.read(location).await?.ok_or_else(missing)?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{}.pdf\"", paper.id),
            ),
        ],
        bytes,
    )
        .into_response())
}

/// Delete the record, then the stored file
#[instrument(skip(state))]
pub async fn delete_paper(
    State(state): State<AppState>,
    Path(paper_id): Path<String>,
) -> Result<StatusCode> {
    let paper = load_paper(&state, &paper_id).await?;

    if !state.repo.delete_paper(paper.id).await? {
        return Err(AppError::PaperNotFound { id: paper_id });
    }

    if let Some(location) = paper.file_location.as_deref() {
        state.files.remove_best_effort(location).await;
    }

    info!(paper_id = %paper.id, "Paper deleted");
    Ok(StatusCode::NO_CONTENT)
}
