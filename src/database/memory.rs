use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::document::{Body, Document, Filter, FindQuery, SortOrder};
use super::store::{DocumentStore, StoreError, StoreResult};

/// Process-local store used when no database is configured, and by tests.
/// Documents are kept in insertion order per collection.
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn insert(&self, collection: &str, body: Body) -> StoreResult<Document> {
        let doc = Document::new(body);
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .push(doc.clone());
        Ok(doc)
    }

    async fn insert_unique(
        &self,
        collection: &'static str,
        field: &'static str,
        body: Body,
    ) -> StoreResult<Document> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();
        if let Some(value) = body.get(field) {
            if docs.iter().any(|d| d.body.get(field) == Some(value)) {
                return Err(StoreError::Duplicate { collection, field });
            }
        }

        let doc = Document::new(body);
        docs.push(doc.clone());
        Ok(doc)
    }

    async fn get(&self, collection: &str, id: Uuid) -> StoreResult<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| d.id == id))
            .cloned())
    }

    async fn find(&self, collection: &str, query: &FindQuery) -> StoreResult<Vec<Document>> {
        let collections = self.collections.read().await;
        let Some(docs) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let matching = docs.iter().filter(|d| d.matches(&query.filter));
        let ordered: Vec<&Document> = match query.sort {
            SortOrder::Oldest => matching.collect(),
            SortOrder::Newest => matching.rev().collect(),
        };

        let skip = usize::try_from(query.skip).unwrap_or(usize::MAX);
        let limit = query
            .limit
            .map(|l| usize::try_from(l).unwrap_or(usize::MAX))
            .unwrap_or(usize::MAX);

        Ok(ordered.into_iter().skip(skip).take(limit).cloned().collect())
    }

    async fn count(&self, collection: &str, filter: &Filter) -> StoreResult<u64> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| docs.iter().filter(|d| d.matches(filter)).count() as u64)
            .unwrap_or(0))
    }

    async fn update(&self, collection: &str, id: Uuid, body: Body) -> StoreResult<Option<Document>> {
        let mut collections = self.collections.write().await;
        let Some(doc) = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
        else {
            return Ok(None);
        };

        doc.body = body;
        doc.updated_at = Utc::now();
        Ok(Some(doc.clone()))
    }

    async fn delete(&self, collection: &str, id: Uuid) -> StoreResult<Option<Document>> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(None);
        };
        Ok(docs
            .iter()
            .position(|d| d.id == id)
            .map(|idx| docs.remove(idx)))
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn body(v: Value) -> Body {
        match v {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn insert_get_update_delete() {
        let store = MemoryDocumentStore::new();
        let doc = store.insert("quotes", body(json!({"text": "a"}))).await.unwrap();

        let fetched = store.get("quotes", doc.id).await.unwrap().unwrap();
        assert_eq!(fetched.body["text"], "a");
        assert!(store.get("comments", doc.id).await.unwrap().is_none());

        let updated = store
            .update("quotes", doc.id, body(json!({"text": "b"})))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.body["text"], "b");
        assert_eq!(updated.created_at, doc.created_at);
        assert!(updated.updated_at >= doc.updated_at);

        let removed = store.delete("quotes", doc.id).await.unwrap();
        assert!(removed.is_some());
        assert!(store.get("quotes", doc.id).await.unwrap().is_none());
        assert!(store.delete("quotes", doc.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn find_sorts_filters_and_pages() {
        let store = MemoryDocumentStore::new();
        for (n, membership) in [(1, "free"), (2, "premium"), (3, "free"), (4, "free")] {
            store
                .insert("users", body(json!({"n": n, "membership": membership})))
                .await
                .unwrap();
        }

        let newest = store.find("users", &FindQuery::newest_first()).await.unwrap();
        let order: Vec<i64> = newest.iter().map(|d| d.body["n"].as_i64().unwrap()).collect();
        assert_eq!(order, vec![4, 3, 2, 1]);

        let free = FindQuery::all().filter("membership", "free").page(1, 1);
        let page = store.find("users", &free).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].body["n"], 3);

        assert_eq!(store.count("users", &free.filter).await.unwrap(), 3);
        assert_eq!(store.count("missing", &Filter::new()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn insert_unique_rejects_taken_value() {
        let store = Arc::new(MemoryDocumentStore::new());
        let attempts = (0..8).map(|_| {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                store
                    .insert_unique("users", "email", body(json!({"email": "same@example.com"})))
                    .await
            })
        });

        let mut inserted = 0;
        for handle in attempts {
            match handle.await.unwrap() {
                Ok(_) => inserted += 1,
                Err(err) => assert!(matches!(err, StoreError::Duplicate { field: "email", .. })),
            }
        }
        assert_eq!(inserted, 1);

        store
            .insert_unique("users", "email", body(json!({"email": "other@example.com"})))
            .await
            .unwrap();
        assert_eq!(store.count("users", &Filter::new()).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn update_missing_document_returns_none() {
        let store = MemoryDocumentStore::new();
        let result = store
            .update("quotes", Uuid::new_v4(), Body::new())
            .await
            .unwrap();
        assert!(result.is_none());
    }
}
