use std::sync::Arc;
use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{info, warn};

use crate::config::DatabaseConfig;

use super::memory::MemoryDocumentStore;
use super::postgres::PgDocumentStore;
use super::store::{DocumentStore, StoreError};

/// Schema for the document table. Executed one statement at a time.
const MIGRATIONS: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS documents (
        collection TEXT NOT NULL,
        id UUID NOT NULL,
        body JSONB NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        PRIMARY KEY (collection, id)
    )"#,
    "CREATE INDEX IF NOT EXISTS documents_collection_created_idx ON documents (collection, created_at)",
    "CREATE INDEX IF NOT EXISTS documents_body_idx ON documents USING GIN (body jsonb_path_ops)",
    "CREATE UNIQUE INDEX IF NOT EXISTS documents_users_email_idx ON documents ((body->>'email')) WHERE collection = 'users'",
];

/// Builds the connection pool and the store backend selected by configuration
pub struct DatabaseManager;

impl DatabaseManager {
    /// Open the configured backend. Without a database URL the in-memory store is used.
    pub async fn open(config: &DatabaseConfig) -> Result<Arc<dyn DocumentStore>, StoreError> {
        match config.url.as_deref() {
            Some(url) => {
                let pool = Self::connect(url, config).await?;
                if config.run_migrations {
                    Self::migrate(&pool).await?;
                }
                Ok(Arc::new(PgDocumentStore::new(pool)))
            }
            None => {
                warn!("DATABASE_URL not set; using in-memory document store (data is not persisted)");
                Ok(Arc::new(MemoryDocumentStore::new()))
            }
        }
    }

    pub async fn connect(url: &str, config: &DatabaseConfig) -> Result<PgPool, StoreError> {
        Self::validate_url(url)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await
            .map_err(|e| StoreError::ConnectionError(e.to_string()))?;

        info!(
            "Created database pool (max_connections={})",
            config.max_connections
        );
        Ok(pool)
    }

    pub async fn migrate(pool: &PgPool) -> Result<(), StoreError> {
        for statement in MIGRATIONS {
            sqlx::query(statement)
                .execute(pool)
                .await
                .map_err(|e| StoreError::MigrationError(e.to_string()))?;
        }
        info!("Document schema is up to date");
        Ok(())
    }

    fn validate_url(raw: &str) -> Result<(), StoreError> {
        let url = url::Url::parse(raw)
            .map_err(|e| StoreError::ConnectionError(format!("invalid DATABASE_URL: {}", e)))?;
        match url.scheme() {
            "postgres" | "postgresql" => Ok(()),
            other => Err(StoreError::ConnectionError(format!(
                "unsupported database scheme '{}'",
                other
            ))),
        }
    }
}
