use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::base::{field, Base};
use crate::errors::ModelError;

/// Attributes persisted but never returned to clients.
pub const SECRET_FIELDS: &[&str] = &["password"];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(flatten)]
    pub base: Base,
    #[serde(default)]
    pub email: String,
    /// Password hash in PHC string format.
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl User {
    pub fn new(base: Base) -> Self {
        Self {
            base,
            email: String::new(),
            password: String::new(),
            first_name: String::new(),
            last_name: String::new(),
        }
    }

    /// `password` is stored as given; callers hash it beforehand.
    pub fn assign(&mut self, key: &str, value: Value) -> Result<(), ModelError> {
        match key {
            "email" => self.email = field(key, value)?,
            "password" => self.password = field(key, value)?,
            "first_name" => self.first_name = field(key, value)?,
            "last_name" => self.last_name = field(key, value)?,
            _ => self.base.set_extra(key, value),
        }
        Ok(())
    }
}
