use serde::{Deserialize, Serialize};

/// Body of the liveness endpoint.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Status {
    pub status: String,
}

impl Status {
    pub fn ok() -> Self {
        Self { status: "OK".to_string() }
    }
}

/// Body of every error response.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}
