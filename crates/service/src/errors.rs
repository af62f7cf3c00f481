use thiserror::Error;

use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Request body is not a JSON object.
    #[error("Not a JSON")]
    NotJson,
    #[error("Missing {0}")]
    MissingField(String),
    /// A request key holds a value of the wrong shape.
    #[error("Invalid {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("model error: {0}")]
    Model(#[from] models::errors::ModelError),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self {
        Self::NotFound(format!("{} not found", entity))
    }
}
