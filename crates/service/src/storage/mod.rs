//! Storage engine for all entity kinds.
//!
//! Entities are indexed by composite key (`"<ClassName>.<id>"`). Handlers
//! talk to the engine through the [`Storage`] trait; [`file_storage::FileStorage`]
//! persists the index as a single JSON document.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use models::{Entity, EntityKind, ModelError};
use thiserror::Error;

pub mod file_storage;

pub use file_storage::FileStorage;

/// In-place change applied to a stored entity.
pub type Mutation = Box<dyn FnOnce(&mut Entity) -> Result<(), ModelError> + Send>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("storage serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("corrupt storage file {}: {reason}", .path.display())]
    Corrupt { path: PathBuf, reason: String },
}

/// Keyed object store shared by every resource.
///
/// `new`, `modify` and `delete` change the in-memory index only; `save`
/// makes those changes durable. `close` ends a session and discards
/// anything that was never saved.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Every stored entity keyed by composite key, optionally of one kind.
    async fn all(&self, kind: Option<EntityKind>) -> HashMap<String, Entity>;
    async fn get(&self, kind: EntityKind, id: &str) -> Option<Entity>;
    async fn count(&self, kind: Option<EntityKind>) -> usize;
    /// Register a freshly constructed entity under its composite key.
    async fn new(&self, entity: Entity);
    /// Atomically apply `mutation` to the stored entity. `Ok(None)` when it
    /// does not exist; on error the stored entity is left untouched.
    async fn modify(
        &self,
        kind: EntityKind,
        id: &str,
        mutation: Mutation,
    ) -> Result<Option<Entity>, ModelError>;
    /// Returns whether the entity was present.
    async fn delete(&self, entity: &Entity) -> bool;
    async fn save(&self) -> Result<(), StorageError>;
    async fn reload(&self) -> Result<(), StorageError>;
    async fn close(&self) -> Result<(), StorageError>;
}
