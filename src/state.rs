use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::AppConfig;
use crate::database::{DocumentStore, Model, Repository};
use crate::services::{UploadService, UserService};

/// Shared router state, cloned into every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn DocumentStore>,
    /// Held for the duration of a stock request
    pub transactions: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            config: Arc::new(config),
            store,
            transactions: Arc::new(Mutex::new(())),
        }
    }

    pub fn repo<M: Model>(&self) -> Repository<M> {
        Repository::new(Arc::clone(&self.store))
    }

    pub fn users(&self) -> UserService {
        UserService::new(self.repo(), self.config.security.clone())
    }

    pub fn uploads(&self) -> UploadService {
        UploadService::new(&self.config.uploads)
    }
}
