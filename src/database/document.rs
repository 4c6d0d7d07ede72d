use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::FromRow;
use uuid::Uuid;

/// JSON object stored under a collection
pub type Body = Map<String, Value>;

/// Top-level field equality filter. An empty filter matches every document.
pub type Filter = Map<String, Value>;

/// A stored document: system fields plus the model body
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub body: Body,
}

impl Document {
    pub fn new(body: Body) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            body,
        }
    }

    pub fn matches(&self, filter: &Filter) -> bool {
        filter
            .iter()
            .all(|(field, expected)| self.body.get(field) == Some(expected))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Insertion order (`createdAt` ascending)
    #[default]
    Oldest,
    /// `createdAt` descending
    Newest,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Oldest => "ASC",
            SortOrder::Newest => "DESC",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FindQuery {
    pub filter: Filter,
    pub sort: SortOrder,
    pub skip: u64,
    pub limit: Option<u64>,
}

impl FindQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn newest_first() -> Self {
        Self {
            sort: SortOrder::Newest,
            ..Self::default()
        }
    }

    pub fn filter(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter.insert(field.into(), value.into());
        self
    }

    pub fn page(mut self, skip: u64, limit: u64) -> Self {
        self.skip = skip;
        self.limit = Some(limit);
        self
    }
}

/// Row shape of the `documents` table
#[derive(Debug, FromRow)]
pub(crate) struct DocumentRow {
    pub id: Uuid,
    pub body: sqlx::types::Json<Body>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        Self {
            id: row.id,
            created_at: row.created_at,
            updated_at: row.updated_at,
            body: row.body.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(v: Value) -> Body {
        match v {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        let doc = Document::new(body(json!({"text": "hi"})));
        assert!(doc.matches(&Filter::new()));
    }

    #[test]
    fn filter_requires_every_field_to_match() {
        let doc = Document::new(body(json!({"email": "a@b.c", "membership": "free"})));
        let query = FindQuery::all().filter("email", "a@b.c");
        assert!(doc.matches(&query.filter));

        let query = query.filter("membership", "premium");
        assert!(!doc.matches(&query.filter));

        let missing = FindQuery::all().filter("role", "ADMIN");
        assert!(!doc.matches(&missing.filter));
    }
}
