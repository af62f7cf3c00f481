use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use common::metrics::{STORAGE_FLUSH_ERRORS_TOTAL, STORAGE_FLUSH_TOTAL};
use models::{composite_key, split_key, Entity, EntityKind, ModelError};
use tokio::{
    fs,
    sync::{Mutex, RwLock},
};
use tracing::{debug, info, warn};

use super::{Mutation, Storage, StorageError};

/// JSON file-backed storage engine.
///
/// The whole index lives in memory and is written to `file_path` on every
/// [`Storage::save`], through a temporary file renamed over the target.
pub struct FileStorage {
    index: RwLock<HashMap<String, Entity>>,
    /// Set by unsaved mutations, cleared by `save` and `reload`.
    dirty: AtomicBool,
    flush: Mutex<()>,
    file_path: PathBuf,
}

impl FileStorage {
    /// Open the store at `path` and load it. A missing file is an empty store.
    pub async fn open<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, StorageError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| StorageError::Io { path: parent.to_path_buf(), source })?;
        }

        let storage = Self {
            index: RwLock::new(HashMap::new()),
            dirty: AtomicBool::new(false),
            flush: Mutex::new(()),
            file_path,
        };
        storage.reload().await?;
        Ok(Arc::new(storage))
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    async fn read_file(&self) -> Result<HashMap<String, Entity>, StorageError> {
        let bytes = match fs::read(&self.file_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(source) => return Err(StorageError::Io { path: self.file_path.clone(), source }),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(HashMap::new());
        }

        let records: HashMap<String, Entity> =
            serde_json::from_slice(&bytes).map_err(|e| self.corrupt(e.to_string()))?;
        for (key, entity) in &records {
            let (kind, id) = split_key(key).map_err(|e| self.corrupt(e.to_string()))?;
            if kind != entity.kind() || id != entity.id() {
                let reason = format!("record under {key} does not match its class and id");
                return Err(self.corrupt(reason));
            }
        }
        Ok(records)
    }

    fn corrupt(&self, reason: String) -> StorageError {
        StorageError::Corrupt { path: self.file_path.clone(), reason }
    }

    async fn write_file(&self, data: Vec<u8>) -> Result<(), StorageError> {
        let file_name = self
            .file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "storage.json".to_string());
        let tmp = self.file_path.with_file_name(format!(".{file_name}.tmp"));

        fs::write(&tmp, data)
            .await
            .map_err(|source| StorageError::Io { path: tmp.clone(), source })?;
        fs::rename(&tmp, &self.file_path)
            .await
            .map_err(|source| StorageError::Io { path: self.file_path.clone(), source })
    }

    fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn all(&self, kind: Option<EntityKind>) -> HashMap<String, Entity> {
        let index = self.index.read().await;
        index
            .iter()
            .filter(|(_, e)| kind.map_or(true, |k| e.kind() == k))
            .map(|(key, e)| (key.clone(), e.clone()))
            .collect()
    }

    async fn get(&self, kind: EntityKind, id: &str) -> Option<Entity> {
        let index = self.index.read().await;
        index.get(&composite_key(kind, id)).cloned()
    }

    async fn count(&self, kind: Option<EntityKind>) -> usize {
        let index = self.index.read().await;
        match kind {
            Some(k) => index.values().filter(|e| e.kind() == k).count(),
            None => index.len(),
        }
    }

    async fn new(&self, entity: Entity) {
        let mut index = self.index.write().await;
        index.insert(entity.key(), entity);
        self.mark_dirty();
    }

    async fn modify(
        &self,
        kind: EntityKind,
        id: &str,
        mutation: Mutation,
    ) -> Result<Option<Entity>, ModelError> {
        let mut index = self.index.write().await;
        let Some(stored) = index.get_mut(&composite_key(kind, id)) else {
            return Ok(None);
        };
        let mut draft = stored.clone();
        mutation(&mut draft)?;
        *stored = draft.clone();
        self.mark_dirty();
        Ok(Some(draft))
    }

    async fn delete(&self, entity: &Entity) -> bool {
        let mut index = self.index.write().await;
        let existed = index.remove(&entity.key()).is_some();
        if existed {
            self.mark_dirty();
        }
        existed
    }

    async fn save(&self) -> Result<(), StorageError> {
        let _flush = self.flush.lock().await;
        // Held across the write so no mutation slips in between the snapshot
        // and clearing the dirty flag.
        let index = self.index.read().await;
        let sorted: BTreeMap<&String, &Entity> = index.iter().collect();
        let result = match serde_json::to_vec(&sorted) {
            Ok(data) => self.write_file(data).await,
            Err(e) => Err(e.into()),
        };
        match result {
            Ok(()) => {
                self.dirty.store(false, Ordering::SeqCst);
                STORAGE_FLUSH_TOTAL.inc();
                debug!(path = %self.file_path.display(), records = index.len(), "storage flushed");
                Ok(())
            }
            Err(e) => {
                STORAGE_FLUSH_ERRORS_TOTAL.inc();
                Err(e)
            }
        }
    }

    async fn reload(&self) -> Result<(), StorageError> {
        let records = self.read_file().await?;
        let mut index = self.index.write().await;
        info!(path = %self.file_path.display(), records = records.len(), "storage loaded");
        *index = records;
        self.dirty.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn close(&self) -> Result<(), StorageError> {
        if self.dirty.load(Ordering::SeqCst) {
            warn!(path = %self.file_path.display(), "discarding unsaved storage changes");
            self.reload().await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn tmp_path() -> PathBuf {
        std::env::temp_dir().join(format!("hbnb_storage_{}.json", uuid::Uuid::new_v4()))
    }

    fn state(name: &str) -> Entity {
        let mut e = Entity::blank(EntityKind::State, Utc::now());
        e.assign("name", json!(name)).unwrap();
        e
    }

    #[tokio::test]
    async fn file_storage_crud_persists() -> Result<(), anyhow::Error> {
        let tmp = tmp_path();
        let store = FileStorage::open(&tmp).await?;
        assert_eq!(store.count(None).await, 0);

        let ca = state("California");
        let nv = state("Nevada");
        let amenity = Entity::blank(EntityKind::Amenity, Utc::now());
        store.new(ca.clone()).await;
        store.new(nv.clone()).await;
        store.new(amenity.clone()).await;
        store.save().await?;

        assert_eq!(store.count(None).await, 3);
        assert_eq!(store.count(Some(EntityKind::State)).await, 2);
        let states = store.all(Some(EntityKind::State)).await;
        assert!(states.contains_key(&format!("State.{}", ca.id())));
        assert_eq!(store.get(EntityKind::State, ca.id()).await, Some(ca.clone()));
        assert_eq!(store.get(EntityKind::City, ca.id()).await, None);

        assert!(store.delete(&nv).await);
        assert!(!store.delete(&nv).await);
        store.save().await?;
        // idempotent
        store.save().await?;

        let reopened = FileStorage::open(&tmp).await?;
        assert_eq!(reopened.count(None).await, 2);
        assert_eq!(reopened.get(EntityKind::State, ca.id()).await, Some(ca));
        assert_eq!(reopened.get(EntityKind::State, nv.id()).await, None);

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn modify_is_atomic_on_error() -> Result<(), anyhow::Error> {
        let tmp = tmp_path();
        let store = FileStorage::open(&tmp).await?;
        let ca = state("California");
        store.new(ca.clone()).await;

        let renamed = store
            .modify(
                EntityKind::State,
                ca.id(),
                Box::new(|e: &mut Entity| e.assign("name", json!("CA"))),
            )
            .await?
            .expect("present");
        assert!(matches!(&renamed, Entity::State(s) if s.name == "CA"));

        let failed = store
            .modify(
                EntityKind::State,
                ca.id(),
                Box::new(|e: &mut Entity| {
                    e.assign("name", json!("half-applied"))?;
                    e.assign("name", json!(42))
                }),
            )
            .await;
        assert_eq!(failed, Err(ModelError::InvalidField("name".into())));
        assert_eq!(store.get(EntityKind::State, ca.id()).await, Some(renamed));

        let missing = store
            .modify(EntityKind::State, "nope", Box::new(|_: &mut Entity| Ok(())))
            .await?;
        assert!(missing.is_none());

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn close_discards_unsaved_changes() -> Result<(), anyhow::Error> {
        let tmp = tmp_path();
        let store = FileStorage::open(&tmp).await?;
        let kept = state("Kept");
        store.new(kept.clone()).await;
        store.save().await?;

        store.new(state("Lost")).await;
        assert_eq!(store.count(None).await, 2);
        store.close().await?;
        assert_eq!(store.count(None).await, 1);
        assert!(store.get(EntityKind::State, kept.id()).await.is_some());

        // clean session: nothing to do
        store.close().await?;
        assert_eq!(store.count(None).await, 1);

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn reload_rejects_corrupt_file() -> Result<(), anyhow::Error> {
        let tmp = tmp_path();
        tokio::fs::write(&tmp, b"{not json").await?;
        assert!(matches!(FileStorage::open(&tmp).await, Err(StorageError::Corrupt { .. })));

        let ca = state("California");
        let mismatched = json!({ "State.other-id": ca });
        tokio::fs::write(&tmp, serde_json::to_vec(&mismatched)?).await?;
        assert!(matches!(FileStorage::open(&tmp).await, Err(StorageError::Corrupt { .. })));

        tokio::fs::write(&tmp, b"").await?;
        assert_eq!(FileStorage::open(&tmp).await?.count(None).await, 0);

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn stored_records_carry_class_discriminator() -> Result<(), anyhow::Error> {
        let tmp = tmp_path();
        let store = FileStorage::open(&tmp).await?;
        let ca = state("California");
        store.new(ca.clone()).await;
        store.save().await?;

        let raw: serde_json::Value = serde_json::from_slice(&tokio::fs::read(&tmp).await?)?;
        let record = &raw[format!("State.{}", ca.id())];
        assert_eq!(record["__class__"], "State");
        assert_eq!(record["name"], "California");

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }
}
