//! User management handlers

use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use glossify_common::{
    db::models::User,
    errors::{AppError, Result},
    ANONYMOUS_OWNER,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,

    #[validate(url)]
    pub avatar_url: Option<String>,
}

#[derive(Serialize)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub avatar_url: Option<String>,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            avatar_url: user.avatar_url,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
pub struct UsersResponse {
    pub users: Vec<UserResponse>,
}

#[derive(Serialize)]
pub struct PaperSummary {
    pub paper_id: Uuid,
    pub title: String,
    pub file_size: Option<u64>,
    pub pages: Option<usize>,
    pub created_at: String,
}

#[derive(Serialize)]
pub struct UserPapersResponse {
    pub papers: Vec<PaperSummary>,
}

pub async fn list_users(State(state): State<AppState>) -> Result<Json<UsersResponse>> {
    let users = state.repo.list_users().await?;
    Ok(Json(UsersResponse {
        users: users.into_iter().map(UserResponse::from).collect(),
    }))
}

#[instrument(skip_all)]
pub async fn create_user(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    let Json(request) = payload.map_err(|e| AppError::InvalidFormat {
        message: e.body_text(),
    })?;

    let name = request.name.trim().to_string();
    let request = CreateUserRequest { name, ..request };
    request
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let user = state
        .repo
        .create_user(request.name, request.avatar_url)
        .await?;

    info!(user_id = %user.id, "User created");
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// A user's papers, newest first. The anonymous owner has no user row.
pub async fn list_user_papers(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserPapersResponse>> {
    if user_id != ANONYMOUS_OWNER && state.repo.find_user(&user_id).await?.is_none() {
        return Err(AppError::UserNotFound { id: user_id });
    }

    let papers = state.repo.list_papers_for_user(&user_id).await?;
    Ok(Json(UserPapersResponse {
        papers: papers
            .into_iter()
            .map(|p| PaperSummary {
                paper_id: p.id,
                title: p.title,
                file_size: p.byte_size,
                pages: p.page_count,
                created_at: p.created_at.to_rfc3339(),
            })
            .collect(),
    }))
}

/// Remove the user and their papers, then their stored files
#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<StatusCode> {
    let files = state
        .repo
        .delete_user_cascade(&user_id)
        .await?
        .ok_or_else(|| AppError::UserNotFound { id: user_id.clone() })?;

    let mut removed = 0usize;
    for path in &files {
        if state.files.remove_best_effort(path).await {
            removed += 1;
        }
    }

    info!(user_id = %user_id, papers = files.len(), files_removed = removed, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}
