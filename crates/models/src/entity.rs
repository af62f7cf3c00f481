use chrono::{DateTime, Utc};
use serde::{ser::Error as _, Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::amenity::Amenity;
use crate::base::Base;
use crate::city::City;
use crate::errors::ModelError;
use crate::kind::{composite_key, EntityKind};
use crate::place::Place;
use crate::review::Review;
use crate::state::State;
use crate::user::{User, SECRET_FIELDS};

/// Any stored record, tagged with its class name.
///
/// The serialized form is the storage representation: a flat object with a
/// `__class__` discriminator. Use [`Entity::public`] for client output.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "__class__")]
pub enum Entity {
    Amenity(Amenity),
    City(City),
    Place(Place),
    Review(Review),
    State(State),
    User(User),
}

impl Entity {
    /// A fresh entity of `kind` with a new id and both timestamps at `now`.
    pub fn blank(kind: EntityKind, now: DateTime<Utc>) -> Self {
        let base = Base::new(now);
        match kind {
            EntityKind::Amenity => Entity::Amenity(Amenity::new(base)),
            EntityKind::City => Entity::City(City::new(base)),
            EntityKind::Place => Entity::Place(Place::new(base)),
            EntityKind::Review => Entity::Review(Review::new(base)),
            EntityKind::State => Entity::State(State::new(base)),
            EntityKind::User => Entity::User(User::new(base)),
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Amenity(_) => EntityKind::Amenity,
            Entity::City(_) => EntityKind::City,
            Entity::Place(_) => EntityKind::Place,
            Entity::Review(_) => EntityKind::Review,
            Entity::State(_) => EntityKind::State,
            Entity::User(_) => EntityKind::User,
        }
    }

    pub fn base(&self) -> &Base {
        match self {
            Entity::Amenity(e) => &e.base,
            Entity::City(e) => &e.base,
            Entity::Place(e) => &e.base,
            Entity::Review(e) => &e.base,
            Entity::State(e) => &e.base,
            Entity::User(e) => &e.base,
        }
    }

    pub fn base_mut(&mut self) -> &mut Base {
        match self {
            Entity::Amenity(e) => &mut e.base,
            Entity::City(e) => &mut e.base,
            Entity::Place(e) => &mut e.base,
            Entity::Review(e) => &mut e.base,
            Entity::State(e) => &mut e.base,
            Entity::User(e) => &mut e.base,
        }
    }

    pub fn id(&self) -> &str {
        &self.base().id
    }

    /// Composite storage key.
    pub fn key(&self) -> String {
        composite_key(self.kind(), self.id())
    }

    /// Set one attribute through the kind's typed setter. Keys the kind has
    /// no field for land in the extra attributes.
    pub fn assign(&mut self, key: &str, value: Value) -> Result<(), ModelError> {
        match self {
            Entity::Amenity(e) => e.assign(key, value),
            Entity::City(e) => e.assign(key, value),
            Entity::Place(e) => e.assign(key, value),
            Entity::Review(e) => e.assign(key, value),
            Entity::State(e) => e.assign(key, value),
            Entity::User(e) => e.assign(key, value),
        }
    }

    /// Value of a relationship key such as `state_id` or `user_id`.
    pub fn relation(&self, field: &str) -> Option<&str> {
        let value = match (self, field) {
            (Entity::City(c), "state_id") => &c.state_id,
            (Entity::Place(p), "city_id") => &p.city_id,
            (Entity::Place(p), "user_id") => &p.user_id,
            (Entity::Review(r), "place_id") => &r.place_id,
            (Entity::Review(r), "user_id") => &r.user_id,
            _ => return None,
        };
        Some(value.as_str())
    }

    pub fn as_place(&self) -> Option<&Place> {
        match self {
            Entity::Place(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_place_mut(&mut self) -> Option<&mut Place> {
        match self {
            Entity::Place(p) => Some(p),
            _ => None,
        }
    }

    /// Client-facing view, without secret attributes.
    pub fn public(&self) -> Public<'_> {
        Public(self)
    }
}

/// Serializes an entity the way the API returns it.
#[derive(Debug, Clone, Copy)]
pub struct Public<'a>(pub &'a Entity);

impl Serialize for Public<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut value = serde_json::to_value(self.0).map_err(S::Error::custom)?;
        if let (Entity::User(_), Value::Object(map)) = (self.0, &mut value) {
            for secret in SECRET_FIELDS {
                map.remove(*secret);
            }
        }
        value.serialize(serializer)
    }
}
