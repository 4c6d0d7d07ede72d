use std::marker::PhantomData;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use super::document::{Body, Document, Filter, FindQuery};
use super::store::{DocumentStore, StoreError, StoreResult};

/// A struct persisted as one document per instance in a named collection
pub trait Model: Serialize + DeserializeOwned + Send + Sync + 'static {
    const COLLECTION: &'static str;
}

/// A model instance with its system fields, serialized flat:
/// `{ "id", "createdAt", "updatedAt", ...model fields }`
#[derive(Debug, Clone, Serialize)]
pub struct Record<M> {
    pub id: Uuid,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub data: M,
}

impl<M: Model> Record<M> {
    fn from_document(doc: Document) -> StoreResult<Self> {
        let data = serde_json::from_value(Value::Object(doc.body)).map_err(|source| {
            StoreError::Serialization {
                collection: M::COLLECTION,
                source,
            }
        })?;
        Ok(Self {
            id: doc.id,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
            data,
        })
    }
}

/// Typed access to one collection of a `DocumentStore`
pub struct Repository<M> {
    store: Arc<dyn DocumentStore>,
    _model: PhantomData<fn() -> M>,
}

impl<M> Clone for Repository<M> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _model: PhantomData,
        }
    }
}

impl<M: Model> Repository<M> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _model: PhantomData,
        }
    }

    fn to_body(data: &M) -> StoreResult<Body> {
        match serde_json::to_value(data) {
            Ok(Value::Object(body)) => Ok(body),
            Ok(_) => Err(StoreError::NotAnObject(M::COLLECTION)),
            Err(source) => Err(StoreError::Serialization {
                collection: M::COLLECTION,
                source,
            }),
        }
    }

    fn collect(docs: Vec<Document>) -> StoreResult<Vec<Record<M>>> {
        docs.into_iter().map(Record::from_document).collect()
    }

    pub async fn create(&self, data: &M) -> StoreResult<Record<M>> {
        let doc = self.store.insert(M::COLLECTION, Self::to_body(data)?).await?;
        Record::from_document(doc)
    }

    /// Create unless another record already holds the same `field` value
    pub async fn create_unique(&self, field: &'static str, data: &M) -> StoreResult<Record<M>> {
        let doc = self
            .store
            .insert_unique(M::COLLECTION, field, Self::to_body(data)?)
            .await?;
        Record::from_document(doc)
    }

    pub async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Record<M>>> {
        self.store
            .get(M::COLLECTION, id)
            .await?
            .map(Record::from_document)
            .transpose()
    }

    pub async fn find(&self, query: &FindQuery) -> StoreResult<Vec<Record<M>>> {
        Self::collect(self.store.find(M::COLLECTION, query).await?)
    }

    pub async fn find_one(&self, filter: Filter) -> StoreResult<Option<Record<M>>> {
        let query = FindQuery {
            filter,
            limit: Some(1),
            ..FindQuery::default()
        };
        Ok(self.find(&query).await?.into_iter().next())
    }

    pub async fn count(&self, filter: &Filter) -> StoreResult<u64> {
        self.store.count(M::COLLECTION, filter).await
    }

    /// Replace the stored model; `None` when the id does not exist
    pub async fn update(&self, id: Uuid, data: &M) -> StoreResult<Option<Record<M>>> {
        self.store
            .update(M::COLLECTION, id, Self::to_body(data)?)
            .await?
            .map(Record::from_document)
            .transpose()
    }

    pub async fn delete(&self, id: Uuid) -> StoreResult<Option<Record<M>>> {
        self.store
            .delete(M::COLLECTION, id)
            .await?
            .map(Record::from_document)
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryDocumentStore;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        text: String,
        #[serde(rename = "isPinned", default)]
        is_pinned: bool,
    }

    impl Model for Note {
        const COLLECTION: &'static str = "notes";
    }

    fn repo() -> Repository<Note> {
        Repository::new(Arc::new(MemoryDocumentStore::new()))
    }

    #[tokio::test]
    async fn round_trips_through_store() {
        let notes = repo();
        let created = notes
            .create(&Note { text: "hello".into(), is_pinned: true })
            .await
            .unwrap();

        let found = notes.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(found.data, created.data);

        let by_field = notes
            .find_one(FindQuery::all().filter("isPinned", true).filter)
            .await
            .unwrap();
        assert_eq!(by_field.map(|r| r.id), Some(created.id));
    }

    #[tokio::test]
    async fn record_serializes_flat() {
        let notes = repo();
        let created = notes
            .create(&Note { text: "flat".into(), is_pinned: false })
            .await
            .unwrap();

        let value = serde_json::to_value(&created).unwrap();
        assert_eq!(value["id"], created.id.to_string());
        assert_eq!(value["text"], "flat");
        assert!(value.get("createdAt").is_some());
        assert!(value.get("updatedAt").is_some());
        assert!(value.get("data").is_none());
    }

    #[tokio::test]
    async fn update_and_delete_unknown_ids() {
        let notes = repo();
        let missing = Uuid::new_v4();
        let note = Note { text: "x".into(), is_pinned: false };
        assert!(notes.update(missing, &note).await.unwrap().is_none());
        assert!(notes.delete(missing).await.unwrap().is_none());
    }
}
