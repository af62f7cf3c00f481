//! Entity kinds and the per-kind capability table.
//!
//! Everything that differs between the six resources (class name, route
//! segment, required fields, parent scoping, body references and keys that
//! clients may not write) is described here so the service layer can stay
//! generic over [`EntityKind`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// Separator between class name and id in a composite key.
pub const KEY_SEPARATOR: char = '.';

/// Attributes owned by the storage layer on every entity.
pub const BASE_IMMUTABLE: &[&str] = &["id", "created_at", "updated_at", "__class__"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    Amenity,
    City,
    Place,
    Review,
    State,
    User,
}

/// A child kind's link to the parent collection it is nested under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentLink {
    pub kind: EntityKind,
    /// Attribute on the child holding the parent id.
    pub field: &'static str,
}

/// A foreign key supplied in the request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    pub field: &'static str,
    pub target: EntityKind,
}

#[derive(Debug, Clone, Copy)]
pub struct Schema {
    /// Checked in order; the first missing one is reported.
    pub required: &'static [&'static str],
    pub parent: Option<ParentLink>,
    pub references: &'static [Reference],
    /// Relationship keys that updates must not touch, on top of [`BASE_IMMUTABLE`].
    pub relations: &'static [&'static str],
}

impl Schema {
    pub fn is_immutable(&self, key: &str) -> bool {
        BASE_IMMUTABLE.contains(&key) || self.relations.contains(&key)
    }
}

const STATE_SCHEMA: Schema = Schema {
    required: &["name"],
    parent: None,
    references: &[],
    relations: &[],
};

const AMENITY_SCHEMA: Schema = Schema {
    required: &["name"],
    parent: None,
    references: &[],
    relations: &[],
};

const USER_SCHEMA: Schema = Schema {
    required: &["email", "password"],
    parent: None,
    references: &[],
    relations: &[],
};

const CITY_SCHEMA: Schema = Schema {
    required: &["name"],
    parent: Some(ParentLink { kind: EntityKind::State, field: "state_id" }),
    references: &[],
    relations: &["state_id"],
};

const PLACE_SCHEMA: Schema = Schema {
    required: &["user_id", "name"],
    parent: Some(ParentLink { kind: EntityKind::City, field: "city_id" }),
    references: &[Reference { field: "user_id", target: EntityKind::User }],
    relations: &["city_id", "user_id", "amenity_ids"],
};

const REVIEW_SCHEMA: Schema = Schema {
    required: &["user_id", "text"],
    parent: Some(ParentLink { kind: EntityKind::Place, field: "place_id" }),
    references: &[Reference { field: "user_id", target: EntityKind::User }],
    relations: &["place_id", "user_id"],
};

impl EntityKind {
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Amenity,
        EntityKind::City,
        EntityKind::Place,
        EntityKind::Review,
        EntityKind::State,
        EntityKind::User,
    ];

    /// Class name used in composite keys and the `__class__` discriminator.
    pub fn class_name(self) -> &'static str {
        match self {
            EntityKind::Amenity => "Amenity",
            EntityKind::City => "City",
            EntityKind::Place => "Place",
            EntityKind::Review => "Review",
            EntityKind::State => "State",
            EntityKind::User => "User",
        }
    }

    /// Plural route segment, also the key in the stats summary.
    pub fn collection(self) -> &'static str {
        match self {
            EntityKind::Amenity => "amenities",
            EntityKind::City => "cities",
            EntityKind::Place => "places",
            EntityKind::Review => "reviews",
            EntityKind::State => "states",
            EntityKind::User => "users",
        }
    }

    pub fn schema(self) -> &'static Schema {
        match self {
            EntityKind::Amenity => &AMENITY_SCHEMA,
            EntityKind::City => &CITY_SCHEMA,
            EntityKind::Place => &PLACE_SCHEMA,
            EntityKind::Review => &REVIEW_SCHEMA,
            EntityKind::State => &STATE_SCHEMA,
            EntityKind::User => &USER_SCHEMA,
        }
    }

    pub fn from_class_name(name: &str) -> Result<Self, ModelError> {
        Self::ALL
            .into_iter()
            .find(|k| k.class_name() == name)
            .ok_or_else(|| ModelError::UnknownClass(name.to_string()))
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class_name())
    }
}

/// `"<ClassName>.<id>"`
pub fn composite_key(kind: EntityKind, id: &str) -> String {
    format!("{}{}{}", kind.class_name(), KEY_SEPARATOR, id)
}

/// Split a composite key back into kind and id.
pub fn split_key(key: &str) -> Result<(EntityKind, &str), ModelError> {
    let (class, id) = key
        .split_once(KEY_SEPARATOR)
        .ok_or_else(|| ModelError::UnknownClass(key.to_string()))?;
    Ok((EntityKind::from_class_name(class)?, id))
}
