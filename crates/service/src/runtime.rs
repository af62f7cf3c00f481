//! Runtime environment helpers
//!
//! Thin wrapper around `common::env` so binary crates can prepare the
//! storage location without depending directly on `common`.

use std::path::Path;

/// Ensure the directory holding the storage file exists.
pub async fn ensure_env(storage_path: &Path) -> anyhow::Result<()> {
    common::env::ensure_env(storage_path).await
}
