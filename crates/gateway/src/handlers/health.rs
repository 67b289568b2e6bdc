//! Health check and metrics handlers

use crate::AppState;
use axum::{extract::State, Json};
use glossify_common::errors::Result;
use serde::Serialize;
use std::time::Instant;
use tracing::warn;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Serialize)]
pub struct ReadyResponse {
    pub status: String,
    pub checks: HealthChecks,
}

#[derive(Serialize)]
pub struct HealthChecks {
    pub database: CheckResult,
    pub storage: CheckResult,
}

#[derive(Serialize)]
pub struct CheckResult {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckResult {
    fn from_outcome(outcome: Result<()>, start: Instant) -> Self {
        match outcome {
            Ok(()) => Self {
                status: "up".to_string(),
                latency_ms: Some(start.elapsed().as_millis() as u64),
                error: None,
            },
            Err(e) => Self {
                status: "down".to_string(),
                latency_ms: None,
                error: Some(e.to_string()),
            },
        }
    }

    fn is_up(&self) -> bool {
        self.status == "up"
    }
}

/// Liveness check - always healthy while the server is running
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}

/// Readiness: the database answers and the upload directory takes writes
pub async fn ready(State(state): State<AppState>) -> Json<ReadyResponse> {
    let start = Instant::now();
    let database = CheckResult::from_outcome(state.repo.ping().await, start);

    let start = Instant::now();
    let storage = CheckResult::from_outcome(state.files.check_writable().await, start);
    if !storage.is_up() {
        warn!(
            upload_dir = %state.files.root().display(),
            error = storage.error.as_deref().unwrap_or_default(),
            "Upload directory is not writable"
        );
    }

    let ready = database.is_up() && storage.is_up();

    Json(ReadyResponse {
        status: if ready { "ready" } else { "not_ready" }.to_string(),
        checks: HealthChecks { database, storage },
    })
}

/// Prometheus exposition; empty when no recorder is installed
pub async fn metrics(State(state): State<AppState>) -> String {
    state
        .metrics
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default()
}
