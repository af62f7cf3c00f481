use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::errors::ModelError;

/// Attributes shared by every entity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Base {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Attributes set by clients that the entity has no typed field for.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Base {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { id: Uuid::new_v4().to_string(), created_at: now, updated_at: now, extra: Map::new() }
    }

    /// Refresh `updated_at`, keeping it strictly increasing even when the
    /// clock has not advanced since the last mutation.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        let floor = self.updated_at + Duration::microseconds(1);
        self.updated_at = if now > self.updated_at { now } else { floor };
    }

    pub(crate) fn set_extra(&mut self, key: &str, value: Value) {
        self.extra.insert(key.to_string(), value);
    }
}

/// Decode a client-supplied value for a typed field.
pub(crate) fn field<T: DeserializeOwned>(key: &str, value: Value) -> Result<T, ModelError> {
    serde_json::from_value(value).map_err(|_| ModelError::InvalidField(key.to_string()))
}
