//! Resource operations shared by all entity kinds.
//!
//! [`ResourceService`] validates request payloads against the kind's
//! [`Schema`](models::Schema), applies them through the storage engine and
//! flushes before returning. Parent scoping, body references and cascading
//! deletes are all driven by the schema table, so handlers stay generic.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use common::metrics::record_mutation;
use models::{Entity, EntityKind, Schema};
use serde_json::{Map, Value};
use tracing::{info, instrument};

use crate::errors::ServiceError;
use crate::password::hash_password;
use crate::storage::Storage;

mod links;
mod search;

pub use search::PlaceFilter;

/// Generic CRUD over every [`EntityKind`].
///
/// # Examples
/// ```
/// use models::EntityKind;
/// use service::{storage::FileStorage, ResourceService};
///
/// let path = std::env::temp_dir().join(format!("hbnb_doc_{}.json", uuid::Uuid::new_v4()));
/// let storage = tokio_test::block_on(FileStorage::open(&path)).unwrap();
/// let svc = ResourceService::new(storage);
/// let body = br#"{"name": "Oregon"}"#;
/// let state = tokio_test::block_on(svc.create(EntityKind::State, None, body)).unwrap();
/// let cities = tokio_test::block_on(svc.list_children(EntityKind::City, state.id())).unwrap();
/// assert!(cities.is_empty());
/// # let _ = std::fs::remove_file(&path);
/// ```
pub struct ResourceService {
    storage: Arc<dyn Storage>,
}

impl ResourceService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Every entity of `kind`, oldest first.
    pub async fn list(&self, kind: EntityKind) -> Vec<Entity> {
        sorted(self.storage.all(Some(kind)).await.into_values().collect())
    }

    /// Children of `kind` nested under `parent_id`. Fails when the parent is absent.
    pub async fn list_children(
        &self,
        kind: EntityKind,
        parent_id: &str,
    ) -> Result<Vec<Entity>, ServiceError> {
        let link = kind
            .schema()
            .parent
            .ok_or_else(|| ServiceError::not_found(kind.collection()))?;
        self.get(link.kind, parent_id).await?;
        let children = self
            .storage
            .all(Some(kind))
            .await
            .into_values()
            .filter(|e| e.relation(link.field) == Some(parent_id))
            .collect();
        Ok(sorted(children))
    }

    pub async fn get(&self, kind: EntityKind, id: &str) -> Result<Entity, ServiceError> {
        self.storage
            .get(kind, id)
            .await
            .ok_or_else(|| ServiceError::not_found(kind.class_name()))
    }

    /// Create an entity of `kind` from a JSON body, nested under `parent_id`
    /// for kinds that have a parent.
    ///
    /// Checks run in order: JSON object, required fields, existence of the
    /// parent and body references, then field types.
    #[instrument(skip(self, body), fields(kind = %kind))]
    pub async fn create(
        &self,
        kind: EntityKind,
        parent_id: Option<&str>,
        body: &[u8],
    ) -> Result<Entity, ServiceError> {
        let schema = kind.schema();
        let payload = parse_object(body)?;
        if let Some(missing) = schema.required.iter().find(|f| !payload.contains_key(**f)) {
            return Err(ServiceError::MissingField(missing.to_string()));
        }

        let parent = match (schema.parent, parent_id) {
            (Some(link), Some(id)) => {
                self.get(link.kind, id).await?;
                Some((link.field, id))
            }
            (Some(link), None) => return Err(ServiceError::not_found(link.kind.class_name())),
            (None, _) => None,
        };
        for reference in schema.references {
            let id = payload
                .get(reference.field)
                .and_then(Value::as_str)
                .ok_or_else(|| ServiceError::Validation(reference.field.to_string()))?;
            self.get(reference.target, id).await?;
        }

        let mut entity = Entity::blank(kind, Utc::now());
        if let Some((field, id)) = parent {
            entity.assign(field, Value::String(id.to_string()))?;
        }
        for (key, value) in payload {
            if !writable_on_create(schema, &key) {
                continue;
            }
            let value = prepare_value(kind, &key, value)?;
            entity.assign(&key, value)?;
        }

        self.storage.new(entity.clone()).await;
        self.storage.save().await?;
        record_mutation(kind.class_name(), "create");
        info!(kind = %kind, id = %entity.id(), "entity_created");
        Ok(entity)
    }

    /// Apply a JSON body to an existing entity. Immutable keys are ignored;
    /// on a type error nothing is changed.
    #[instrument(skip(self, body), fields(kind = %kind, id = %id))]
    pub async fn update(
        &self,
        kind: EntityKind,
        id: &str,
        body: &[u8],
    ) -> Result<Entity, ServiceError> {
        self.get(kind, id).await?;
        let schema = kind.schema();
        let mut changes = Vec::new();
        for (key, value) in parse_object(body)? {
            if schema.is_immutable(&key) {
                continue;
            }
            let value = prepare_value(kind, &key, value)?;
            changes.push((key, value));
        }

        let now = Utc::now();
        let updated = self
            .storage
            .modify(
                kind,
                id,
                Box::new(move |e: &mut Entity| {
                    for (key, value) in changes {
                        e.assign(&key, value)?;
                    }
                    e.base_mut().touch(now);
                    Ok(())
                }),
            )
            .await?
            .ok_or_else(|| ServiceError::not_found(kind.class_name()))?;
        self.storage.save().await?;
        record_mutation(kind.class_name(), "update");
        info!(kind = %kind, id = %id, "entity_updated");
        Ok(updated)
    }

    /// Delete an entity together with everything that belongs to it.
    #[instrument(skip(self), fields(kind = %kind, id = %id))]
    pub async fn delete(&self, kind: EntityKind, id: &str) -> Result<(), ServiceError> {
        let root = self.get(kind, id).await?;
        let all = self.storage.all(None).await;

        let mut doomed = vec![root];
        let mut seen: HashSet<String> = doomed.iter().map(Entity::key).collect();
        let mut next = 0;
        while next < doomed.len() {
            let owner = doomed[next].clone();
            next += 1;
            for candidate in all.values() {
                if belongs_to(candidate, &owner) && seen.insert(candidate.key()) {
                    doomed.push(candidate.clone());
                }
            }
        }

        if kind == EntityKind::Amenity {
            self.detach_amenity(id, &seen).await?;
        }
        for entity in &doomed {
            self.storage.delete(entity).await;
        }
        self.storage.save().await?;
        for entity in &doomed {
            record_mutation(entity.kind().class_name(), "delete");
        }
        info!(kind = %kind, id = %id, cascaded = doomed.len() - 1, "entity_deleted");
        Ok(())
    }

    /// Count of stored entities per collection name.
    pub async fn stats(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for kind in EntityKind::ALL {
            counts.insert(kind.collection(), self.storage.count(Some(kind)).await);
        }
        counts
    }
}

pub(crate) fn parse_object(body: &[u8]) -> Result<Map<String, Value>, ServiceError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(ServiceError::NotJson),
    }
}

pub(crate) fn sorted(mut entities: Vec<Entity>) -> Vec<Entity> {
    entities.sort_by(|a, b| {
        a.base()
            .created_at
            .cmp(&b.base().created_at)
            .then_with(|| a.id().cmp(b.id()))
    });
    entities
}

/// Body references such as `user_id` are set once, at creation.
fn writable_on_create(schema: &Schema, key: &str) -> bool {
    !schema.is_immutable(key) || schema.references.iter().any(|r| r.field == key)
}

/// Passwords are stored hashed.
fn prepare_value(kind: EntityKind, key: &str, value: Value) -> Result<Value, ServiceError> {
    if kind != EntityKind::User || key != "password" {
        return Ok(value);
    }
    let plain = value
        .as_str()
        .ok_or_else(|| ServiceError::Validation(key.to_string()))?;
    Ok(Value::String(hash_password(plain)?))
}

/// Whether `child` is nested under `owner` or references it from its body.
fn belongs_to(child: &Entity, owner: &Entity) -> bool {
    let schema = child.kind().schema();
    let nested = schema
        .parent
        .filter(|link| link.kind == owner.kind())
        .map(|link| link.field);
    let referenced = schema
        .references
        .iter()
        .filter(|r| r.target == owner.kind())
        .map(|r| r.field);
    nested
        .into_iter()
        .chain(referenced)
        .any(|field| child.relation(field) == Some(owner.id()))
}
