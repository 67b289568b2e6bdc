//! API handlers module

pub mod explain;
pub mod health;
pub mod papers;
pub mod upload;
pub mod users;

use glossify_common::errors::{AppError, Result};
use uuid::Uuid;

/// Paper ids that do not parse cannot exist, so they are reported as missing
pub(crate) fn parse_paper_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::PaperNotFound { id: raw.to_string() })
}
