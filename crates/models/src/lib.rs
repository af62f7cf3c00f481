//! Entity model for the HBNB API: the six record types, their shared base
//! attributes and the per-kind capability table.

pub mod errors;
pub mod kind;
pub mod base;
pub mod entity;
pub mod amenity;
pub mod city;
pub mod place;
pub mod review;
pub mod state;
pub mod user;

pub use base::Base;
pub use entity::{Entity, Public};
pub use errors::ModelError;
pub use kind::{composite_key, split_key, EntityKind, Schema};
