use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::base::{field, Base};
use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Place {
    #[serde(flatten)]
    pub base: Base,
    #[serde(default)]
    pub city_id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub number_rooms: u32,
    #[serde(default)]
    pub number_bathrooms: u32,
    #[serde(default)]
    pub max_guest: u32,
    #[serde(default)]
    pub price_by_night: u32,
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
    #[serde(default)]
    pub amenity_ids: Vec<String>,
}

impl Place {
    pub fn new(base: Base) -> Self {
        Self {
            base,
            city_id: String::new(),
            user_id: String::new(),
            name: String::new(),
            description: String::new(),
            number_rooms: 0,
            number_bathrooms: 0,
            max_guest: 0,
            price_by_night: 0,
            latitude: 0.0,
            longitude: 0.0,
            amenity_ids: Vec::new(),
        }
    }

    pub fn assign(&mut self, key: &str, value: Value) -> Result<(), ModelError> {
        match key {
            "city_id" => self.city_id = field(key, value)?,
            "user_id" => self.user_id = field(key, value)?,
            "name" => self.name = field(key, value)?,
            "description" => self.description = field(key, value)?,
            "number_rooms" => self.number_rooms = field(key, value)?,
            "number_bathrooms" => self.number_bathrooms = field(key, value)?,
            "max_guest" => self.max_guest = field(key, value)?,
            "price_by_night" => self.price_by_night = field(key, value)?,
            "latitude" => self.latitude = field(key, value)?,
            "longitude" => self.longitude = field(key, value)?,
            "amenity_ids" => {
                let mut ids: Vec<String> = field(key, value)?;
                let mut seen = std::collections::HashSet::new();
                ids.retain(|id| seen.insert(id.clone()));
                self.amenity_ids = ids;
            }
            _ => self.base.set_extra(key, value),
        }
        Ok(())
    }

    pub fn has_amenity(&self, amenity_id: &str) -> bool {
        self.amenity_ids.iter().any(|id| id == amenity_id)
    }

    /// Returns false when the amenity was already linked.
    pub fn link_amenity(&mut self, amenity_id: &str) -> bool {
        if self.has_amenity(amenity_id) {
            return false;
        }
        self.amenity_ids.push(amenity_id.to_string());
        true
    }

    /// Returns false when the amenity was not linked.
    pub fn unlink_amenity(&mut self, amenity_id: &str) -> bool {
        let before = self.amenity_ids.len();
        self.amenity_ids.retain(|id| id != amenity_id);
        self.amenity_ids.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn assign_types_numeric_fields() {
        let mut place = Place::new(Base::new(Utc::now()));
        place.assign("number_rooms", json!(3)).unwrap();
        place.assign("latitude", json!(37.77)).unwrap();
        place.assign("latitude", json!(12)).unwrap();
        assert_eq!(place.number_rooms, 3);
        assert_eq!(place.latitude, 12.0);
        assert_eq!(
            place.assign("price_by_night", json!("cheap")),
            Err(ModelError::InvalidField("price_by_night".into()))
        );
        assert_eq!(place.price_by_night, 0);
    }

    #[test]
    fn amenity_links_are_a_set() {
        let mut place = Place::new(Base::new(Utc::now()));
        assert!(place.link_amenity("wifi"));
        assert!(!place.link_amenity("wifi"));
        assert!(place.has_amenity("wifi"));
        assert!(place.unlink_amenity("wifi"));
        assert!(!place.unlink_amenity("wifi"));

        place.assign("amenity_ids", json!(["a", "b", "a"])).unwrap();
        assert_eq!(place.amenity_ids, vec!["a", "b"]);
    }
}
