use std::sync::Arc;

use service::storage::Storage;
use service::ResourceService;
use tokio::sync::RwLock;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub resources: Arc<ResourceService>,
    pub storage: Arc<dyn Storage>,
    /// Session gate: shared for reads, exclusive for writes.
    pub sessions: Arc<RwLock<()>>,
}

impl AppState {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            resources: Arc::new(ResourceService::new(Arc::clone(&storage))),
            storage,
            sessions: Arc::new(RwLock::new(())),
        }
    }
}
