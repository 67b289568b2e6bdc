//! Paper entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "papers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Owner id; "anonymous" has no users row, so there is no foreign key
    #[sea_orm(column_type = "Text", indexed)]
    pub user_id: String,

    #[sea_orm(column_type = "Text")]
    pub title: String,

    /// Ordered list of domain tags
    #[sea_orm(column_type = "Json")]
    pub domain_tags: Json,

    /// Term -> definition object
    #[sea_orm(column_type = "Json")]
    pub glossary: Json,

    #[sea_orm(column_type = "Text")]
    pub text: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub file_path: Option<String>,

    pub pages: Option<i32>,

    pub file_size: Option<i64>,

    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
