//! Term explanation handler

use super::parse_paper_id;
use crate::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use glossify_common::errors::{AppError, Result};
use glossify_explain::Explanation;
use serde::Deserialize;
use tracing::instrument;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct ExplainRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "paper_id and term are required"))]
    pub paper_id: String,

    #[serde(default)]
    #[validate(
        length(min = 1, message = "paper_id and term are required"),
        custom(function = "not_blank")
    )]
    pub term: String,

    /// Skip the glossary and the long-selection advisory
    #[serde(default)]
    pub force_model: bool,
}

fn not_blank(value: &str) -> std::result::Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        let mut err = validator::ValidationError::new("blank");
        err.message = Some("paper_id and term are required".into());
        return Err(err);
    }
    Ok(())
}

/// Explain a term against a stored paper
#[instrument(skip_all)]
pub async fn explain(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ExplainRequest>, JsonRejection>,
) -> Result<Json<Explanation>> {
    let Json(request) = payload.map_err(|e| AppError::InvalidFormat {
        message: e.body_text(),
    })?;

    request
        .validate()
        .map_err(|_| AppError::validation("paper_id and term are required"))?;

    let paper_id = parse_paper_id(&request.paper_id)?;
    let paper = state
        .repo
        .find_paper(paper_id)
        .await?
        .ok_or_else(|| AppError::PaperNotFound {
            id: request.paper_id.clone(),
        })?;

    let explanation = state
        .resolver
        .resolve(&paper, &request.term, request.force_model)
        .await;

    Ok(Json(explanation))
}
