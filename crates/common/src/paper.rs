//! Paper domain type
//!
//! The persisted record of one ingested document. Rows in the `papers`
//! table convert to and from this type; handlers and the pipeline never
//! see the raw JSON columns.

use crate::db::models::{PaperActiveModel, PaperRow};
use crate::errors::Result;
use chrono::{DateTime, Utc};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use uuid::Uuid;

/// Term -> in-document definition. Keys are exact and case-sensitive.
pub type Glossary = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paper {
    pub id: Uuid,
    pub owner_id: String,
    pub title: String,
    pub text: String,
    pub domain_tags: Vec<String>,
    pub glossary: Glossary,
    pub file_location: Option<PathBuf>,
    pub page_count: Option<usize>,
    pub byte_size: Option<u64>,
    pub created_at: DateTime<Utc>,
}

impl Paper {
    /// First domain tag, if any
    pub fn primary_domain(&self) -> Option<&str> {
        self.domain_tags.first().map(String::as_str)
    }

    pub(crate) fn into_active_model(self) -> Result<PaperActiveModel> {
        Ok(PaperActiveModel {
            id: Set(self.id),
            user_id: Set(self.owner_id),
            title: Set(self.title),
            domain_tags: Set(serde_json::to_value(&self.domain_tags)?),
            glossary: Set(serde_json::to_value(&self.glossary)?),
            text: Set(self.text),
            file_path: Set(self.file_location.map(|p| p.to_string_lossy().into_owned())),
            pages: Set(self.page_count.and_then(|n| i32::try_from(n).ok())),
            file_size: Set(self.byte_size.and_then(|n| i64::try_from(n).ok())),
            created_at: Set(self.created_at),
        })
    }
}

impl TryFrom<PaperRow> for Paper {
    type Error = crate::errors::AppError;

    fn try_from(row: PaperRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            owner_id: row.user_id,
            title: row.title,
            text: row.text,
            domain_tags: serde_json::from_value(row.domain_tags)?,
            glossary: serde_json::from_value(row.glossary)?,
            file_location: row.file_path.map(PathBuf::from),
            page_count: row.pages.and_then(|n| usize::try_from(n).ok()),
            byte_size: row.file_size.and_then(|n| u64::try_from(n).ok()),
            created_at: row.created_at,
        })
    }
}
