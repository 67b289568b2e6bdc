//! Repository pattern for database operations
//!
//! Provides a clean interface for all data access operations
//! with proper error handling and transaction support.

use crate::db::models::*;
use crate::db::DbPool;
use crate::errors::Result;
use crate::paper::Paper;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use std::path::PathBuf;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Repository for data access operations
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> &DatabaseConnection {
        self.pool.conn()
    }

    // ========================================================================
    // Health Check
    // ========================================================================

    /// Ping the database
    pub async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }

    /// Create the schema if it is missing
    pub async fn migrate(&self) -> Result<()> {
        self.pool.migrate().await
    }

    // ========================================================================
    // Paper Operations
    // ========================================================================

    /// Insert a paper, or overwrite every mutable column of an existing one.
    /// `created_at` and the owner keep their first values.
    #[instrument(skip(self, paper), fields(paper_id = %paper.id))]
    pub async fn upsert_paper(&self, paper: &Paper) -> Result<()> {
        let am = paper.clone().into_active_model()?;

        PaperEntity::insert(am)
            .on_conflict(
                OnConflict::column(PaperColumn::Id)
                    .update_columns([
                        PaperColumn::Title,
                        PaperColumn::DomainTags,
                        PaperColumn::Glossary,
                        PaperColumn::Text,
                        PaperColumn::FilePath,
                        PaperColumn::Pages,
                        PaperColumn::FileSize,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(self.conn())
            .await?;

        debug!("Paper upserted");
        Ok(())
    }

    /// Find paper by ID
    pub async fn find_paper(&self, id: Uuid) -> Result<Option<Paper>> {
        PaperEntity::find_by_id(id)
            .one(self.conn())
            .await?
            .map(Paper::try_from)
            .transpose()
    }

    /// List a user's papers, newest first
    pub async fn list_papers_for_user(&self, user_id: &str) -> Result<Vec<Paper>> {
        PaperEntity::find()
            .filter(PaperColumn::UserId.eq(user_id))
            .order_by_desc(PaperColumn::CreatedAt)
            .all(self.conn())
            .await?
            .into_iter()
            .map(Paper::try_from)
            .collect()
    }

    /// Delete paper by ID
    pub async fn delete_paper(&self, id: Uuid) -> Result<bool> {
        let result = PaperEntity::delete_by_id(id).exec(self.conn()).await?;

        Ok(result.rows_affected > 0)
    }

    // ========================================================================
    // User Operations
    // ========================================================================

    pub async fn create_user(&self, name: String, avatar_url: Option<String>) -> Result<User> {
        let user = UserActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            name: Set(name),
            avatar_url: Set(avatar_url),
            created_at: Set(chrono::Utc::now()),
        };

        user.insert(self.conn()).await.map_err(Into::into)
    }

    pub async fn find_user(&self, id: &str) -> Result<Option<User>> {
        UserEntity::find_by_id(id.to_string())
            .one(self.conn())
            .await
            .map_err(Into::into)
    }

    /// All users, oldest first
    pub async fn list_users(&self) -> Result<Vec<User>> {
        UserEntity::find()
            .order_by_asc(UserColumn::CreatedAt)
            .all(self.conn())
            .await
            .map_err(Into::into)
    }

    /// Delete a user and all of their papers in one transaction.
    ///
    /// Returns `None` when the user does not exist, otherwise the file
    /// locations of the removed papers so the caller can clean them up.
    #[instrument(skip(self))]
    pub async fn delete_user_cascade(&self, user_id: &str) -> Result<Option<Vec<PathBuf>>> {
        let txn = self.conn().begin().await?;

        if UserEntity::find_by_id(user_id.to_string())
            .one(&txn)
            .await?
            .is_none()
        {
            txn.rollback().await?;
            return Ok(None);
        }

        let files: Vec<PathBuf> = PaperEntity::find()
            .filter(PaperColumn::UserId.eq(user_id))
            .all(&txn)
            .await?
            .into_iter()
            .filter_map(|row| row.file_path.map(PathBuf::from))
            .collect();

        let papers = PaperEntity::delete_many()
            .filter(PaperColumn::UserId.eq(user_id))
            .exec(&txn)
            .await?;

        UserEntity::delete_by_id(user_id.to_string())
            .exec(&txn)
            .await?;

        txn.commit().await?;

        debug!(papers_removed = papers.rows_affected, "User deleted");
        Ok(Some(files))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use crate::paper::Glossary;
    use chrono::{Duration, Utc};

    async fn repo() -> Repository {
        let pool = DbPool::new(&DatabaseConfig::in_memory()).await.unwrap();
        let repo = Repository::new(pool);
        repo.migrate().await.unwrap();
        repo
    }

    fn paper(owner: &str, title: &str) -> Paper {
        Paper {
            id: Uuid::new_v4(),
            owner_id: owner.into(),
            title: title.into(),
            text: "normalized text".into(),
            domain_tags: vec!["Machine Learning".into()],
            glossary: Glossary::from([("SGD".to_string(), "Stochastic gradient descent".to_string())]),
            file_location: Some(PathBuf::from(format!("/tmp/uploads/{title}.pdf"))),
            page_count: Some(2),
            byte_size: Some(2048),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_upsert_and_find_paper() {
        let repo = repo().await;
        let p = paper("anonymous", "first");
        repo.upsert_paper(&p).await.unwrap();

        let found = repo.find_paper(p.id).await.unwrap().unwrap();
        assert_eq!(found.title, "first");
        assert_eq!(found.glossary, p.glossary);
        assert_eq!(found.domain_tags, p.domain_tags);
        assert_eq!(found.page_count, Some(2));
    }

    #[tokio::test]
    async fn test_upsert_is_last_writer_wins() {
        let repo = repo().await;
        let mut p = paper("anonymous", "first");
        repo.upsert_paper(&p).await.unwrap();

        p.title = "second".into();
        p.glossary.clear();
        repo.upsert_paper(&p).await.unwrap();

        let found = repo.find_paper(p.id).await.unwrap().unwrap();
        assert_eq!(found.title, "second");
        assert!(found.glossary.is_empty());
    }

    #[tokio::test]
    async fn test_missing_paper_is_none() {
        let repo = repo().await;
        assert!(repo.find_paper(Uuid::new_v4()).await.unwrap().is_none());
        assert!(!repo.delete_paper(Uuid::new_v4()).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_papers_newest_first() {
        let repo = repo().await;
        let mut older = paper("u1", "older");
        older.created_at = Utc::now() - Duration::minutes(5);
        let newer = paper("u1", "newer");
        let other = paper("u2", "other");
        for p in [&older, &newer, &other] {
            repo.upsert_paper(p).await.unwrap();
        }

        let titles: Vec<String> = repo
            .list_papers_for_user("u1")
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, vec!["newer", "older"]);
    }

    #[tokio::test]
    async fn test_delete_user_cascades_to_papers() {
        let repo = repo().await;
        let user = repo.create_user("Ada".into(), None).await.unwrap();
        let a = paper(&user.id, "a");
        let b = paper(&user.id, "b");
        let kept = paper("anonymous", "kept");
        for p in [&a, &b, &kept] {
            repo.upsert_paper(p).await.unwrap();
        }

        let files = repo.delete_user_cascade(&user.id).await.unwrap().unwrap();
        assert_eq!(files.len(), 2);
        assert!(repo.find_user(&user.id).await.unwrap().is_none());
        assert!(repo.find_paper(a.id).await.unwrap().is_none());
        assert!(repo.find_paper(kept.id).await.unwrap().is_some());

        assert!(repo.delete_user_cascade(&user.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_users_oldest_first() {
        let repo = repo().await;
        repo.create_user("first".into(), None).await.unwrap();
        repo.create_user("second".into(), Some("https://example.com/a.png".into()))
            .await
            .unwrap();

        let users = repo.list_users().await.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].name, "first");
        assert_eq!(users[1].avatar_url.as_deref(), Some("https://example.com/a.png"));
    }
}
