pub mod document;
pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod store;

pub use document::{Body, Document, Filter, FindQuery, SortOrder};
pub use manager::DatabaseManager;
pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;
pub use repository::{Model, Record, Repository};
pub use store::{DocumentStore, StoreError, StoreResult};
