use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use super::document::{Body, Document, Filter, FindQuery};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Migration error: {0}")]
    MigrationError(String),

    #[error("Document in '{collection}' could not be mapped: {source}")]
    Serialization {
        collection: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("A document in '{collection}' already has this '{field}'")]
    Duplicate {
        collection: &'static str,
        field: &'static str,
    },

    #[error("Document body for '{0}' must be a JSON object")]
    NotAnObject(&'static str),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Collection-keyed JSON document persistence.
///
/// Implementations must treat `update` and `delete` as single atomic
/// operations on one document and must keep `find` ordering stable for
/// documents that share a `created_at`.
#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    /// Short backend name for health output and logs
    fn backend(&self) -> &'static str;

    async fn insert(&self, collection: &str, body: Body) -> StoreResult<Document>;

    /// Insert unless another document in the collection has the same value
    /// for `field`. The check and the insert happen as one step.
    async fn insert_unique(
        &self,
        collection: &'static str,
        field: &'static str,
        body: Body,
    ) -> StoreResult<Document>;

    async fn get(&self, collection: &str, id: Uuid) -> StoreResult<Option<Document>>;

    async fn find(&self, collection: &str, query: &FindQuery) -> StoreResult<Vec<Document>>;

    async fn count(&self, collection: &str, filter: &Filter) -> StoreResult<u64>;

    /// Replace the body of an existing document and bump `updated_at`
    async fn update(&self, collection: &str, id: Uuid, body: Body) -> StoreResult<Option<Document>>;

    /// Remove a document, returning it if it existed
    async fn delete(&self, collection: &str, id: Uuid) -> StoreResult<Option<Document>>;

    async fn health_check(&self) -> StoreResult<()>;
}
