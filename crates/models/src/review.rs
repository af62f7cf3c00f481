use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::base::{field, Base};
use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Review {
    #[serde(flatten)]
    pub base: Base,
    #[serde(default)]
    pub place_id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub text: String,
}

impl Review {
    pub fn new(base: Base) -> Self {
        Self { base, place_id: String::new(), user_id: String::new(), text: String::new() }
    }

    pub fn assign(&mut self, key: &str, value: Value) -> Result<(), ModelError> {
        match key {
            "place_id" => self.place_id = field(key, value)?,
            "user_id" => self.user_id = field(key, value)?,
            "text" => self.text = field(key, value)?,
            _ => self.base.set_extra(key, value),
        }
        Ok(())
    }
}
