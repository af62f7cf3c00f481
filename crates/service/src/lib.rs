//! Service layer for the HBNB API.
//! - `storage`: the keyed entity store and its JSON file engine.
//! - `resources`: validation, nesting, cascades and search over every kind.
//! - `password`: hashing of user passwords before they are stored.

pub mod errors;
pub mod password;
pub mod resources;
pub mod runtime;
pub mod storage;

pub use errors::ServiceError;
pub use resources::ResourceService;
