use std::collections::BTreeMap;

use axum::{extract::State, response::IntoResponse, Json};
use common::{metrics::encode_metrics, types::Status};

use crate::state::AppState;

pub async fn status() -> Json<Status> {
    Json(Status::ok())
}

/// Number of stored entities per collection.
pub async fn stats(State(state): State<AppState>) -> Json<BTreeMap<&'static str, usize>> {
    Json(state.resources.stats().await)
}

pub async fn metrics() -> impl IntoResponse {
    encode_metrics()
}
