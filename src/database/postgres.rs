use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use super::document::{Body, Document, DocumentRow, Filter, FindQuery};
use super::store::{DocumentStore, StoreError, StoreResult};

const COLUMNS: &str = "id, body, created_at, updated_at";

/// Documents stored as JSONB rows keyed by `(collection, id)`.
/// Filters use JSONB containment, so only top-level equality is expressible.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn to_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

fn unique_violation(err: sqlx::Error, collection: &'static str, field: &'static str) -> StoreError {
    let duplicate = err
        .as_database_error()
        .is_some_and(|db| db.is_unique_violation());
    if duplicate {
        StoreError::Duplicate { collection, field }
    } else {
        err.into()
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn insert(&self, collection: &str, body: Body) -> StoreResult<Document> {
        let doc = Document::new(body);
        let sql = format!(
            "INSERT INTO documents (collection, id, body, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $4) RETURNING {}",
            COLUMNS
        );
        let row = sqlx::query_as::<_, DocumentRow>(&sql)
            .bind(collection)
            .bind(doc.id)
            .bind(Value::Object(doc.body))
            .bind(doc.created_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn insert_unique(
        &self,
        collection: &'static str,
        field: &'static str,
        body: Body,
    ) -> StoreResult<Document> {
        let Some(value) = body.get(field).cloned() else {
            return self.insert(collection, body).await;
        };

        // Concurrent inserts of the same value queue on the advisory lock
        let mut tx = self.pool.begin().await?;
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(format!("{}:{}:{}", collection, field, value))
            .execute(&mut *tx)
            .await?;

        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM documents WHERE collection = $1 AND body -> $2 = $3)",
        )
        .bind(collection)
        .bind(field)
        .bind(&value)
        .fetch_one(&mut *tx)
        .await?;
        if taken {
            return Err(StoreError::Duplicate { collection, field });
        }

        let doc = Document::new(body);
        let sql = format!(
            "INSERT INTO documents (collection, id, body, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $4) RETURNING {}",
            COLUMNS
        );
        let row = sqlx::query_as::<_, DocumentRow>(&sql)
            .bind(collection)
            .bind(doc.id)
            .bind(Value::Object(doc.body))
            .bind(doc.created_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| unique_violation(e, collection, field))?;
        tx.commit().await?;
        Ok(row.into())
    }

    async fn get(&self, collection: &str, id: Uuid) -> StoreResult<Option<Document>> {
        let sql = format!(
            "SELECT {} FROM documents WHERE collection = $1 AND id = $2",
            COLUMNS
        );
        let row = sqlx::query_as::<_, DocumentRow>(&sql)
            .bind(collection)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn find(&self, collection: &str, query: &FindQuery) -> StoreResult<Vec<Document>> {
        let sql = format!(
            "SELECT {} FROM documents WHERE collection = $1 AND body @> $2 \
             ORDER BY created_at {order}, id {order} OFFSET $3 LIMIT $4",
            COLUMNS,
            order = query.sort.as_sql()
        );
        let rows = sqlx::query_as::<_, DocumentRow>(&sql)
            .bind(collection)
            .bind(Value::Object(query.filter.clone()))
            .bind(to_i64(query.skip))
            .bind(query.limit.map(to_i64))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count(&self, collection: &str, filter: &Filter) -> StoreResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM documents WHERE collection = $1 AND body @> $2",
        )
        .bind(collection)
        .bind(Value::Object(filter.clone()))
        .fetch_one(&self.pool)
        .await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn update(&self, collection: &str, id: Uuid, body: Body) -> StoreResult<Option<Document>> {
        let sql = format!(
            "UPDATE documents SET body = $3, updated_at = now() \
             WHERE collection = $1 AND id = $2 RETURNING {}",
            COLUMNS
        );
        let row = sqlx::query_as::<_, DocumentRow>(&sql)
            .bind(collection)
            .bind(id)
            .bind(Value::Object(body))
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn delete(&self, collection: &str, id: Uuid) -> StoreResult<Option<Document>> {
        let sql = format!(
            "DELETE FROM documents WHERE collection = $1 AND id = $2 RETURNING {}",
            COLUMNS
        );
        let row = sqlx::query_as::<_, DocumentRow>(&sql)
            .bind(collection)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
