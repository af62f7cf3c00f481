use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::base::{field, Base};
use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct City {
    #[serde(flatten)]
    pub base: Base,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub state_id: String,
}

impl City {
    pub fn new(base: Base) -> Self {
        Self { base, name: String::new(), state_id: String::new() }
    }

    pub fn assign(&mut self, key: &str, value: Value) -> Result<(), ModelError> {
        match key {
            "name" => self.name = field(key, value)?,
            "state_id" => self.state_id = field(key, value)?,
            _ => self.base.set_extra(key, value),
        }
        Ok(())
    }
}
