//! Database layer for Glossify
//!
//! Provides:
//! - SeaORM entity models
//! - Repository pattern for data access
//! - Connection pool management
//! - Schema creation from entities

pub mod models;
mod repository;

pub use repository::Repository;

use crate::config::DatabaseConfig;
use crate::errors::{AppError, Result};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Schema};
use std::time::Duration;
use tracing::info;

/// Database connection pool wrapper
#[derive(Clone)]
pub struct DbPool {
    conn: DatabaseConnection,
}

impl DbPool {
    /// Create a new database pool from configuration
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        info!(url = %config.url, "Connecting to database...");

        let mut opts = ConnectOptions::new(&config.url);
        opts.max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .sqlx_logging(false);

        let conn = Database::connect(opts).await.map_err(|e| AppError::Configuration {
            message: format!("Failed to connect to database: {}", e),
        })?;

        info!("Database connection established");

        Ok(Self { conn })
    }

    pub fn conn(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Ping the database to check connectivity
    pub async fn ping(&self) -> Result<()> {
        self.conn.execute_unprepared("SELECT 1").await?;
        Ok(())
    }

    /// Create tables and indexes that do not exist yet
    pub async fn migrate(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        let schema = Schema::new(backend);

        let mut users = schema.create_table_from_entity(models::UserEntity);
        users.if_not_exists();
        self.conn.execute(backend.build(&users)).await?;

        let mut papers = schema.create_table_from_entity(models::PaperEntity);
        papers.if_not_exists();
        self.conn.execute(backend.build(&papers)).await?;

        for mut index in schema.create_index_from_entity(models::PaperEntity) {
            index.if_not_exists();
            self.conn.execute(backend.build(&index)).await?;
        }

        info!("Database schema ready");
        Ok(())
    }
}
