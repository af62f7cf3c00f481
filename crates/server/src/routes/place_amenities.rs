use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::json;

use super::resources::{EntityJson, EntityList};
use crate::errors::JsonApiError;
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    Path(place_id): Path<String>,
) -> Result<EntityList, JsonApiError> {
    Ok(EntityList(state.resources.place_amenities(&place_id).await?))
}

/// 201 when the link is new, 200 when it already existed.
pub async fn link(
    State(state): State<AppState>,
    Path((place_id, amenity_id)): Path<(String, String)>,
) -> Result<(StatusCode, EntityJson), JsonApiError> {
    let (amenity, created) = state.resources.link_amenity(&place_id, &amenity_id).await?;
    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, EntityJson(amenity)))
}

pub async fn unlink(
    State(state): State<AppState>,
    Path((place_id, amenity_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, JsonApiError> {
    state.resources.unlink_amenity(&place_id, &amenity_id).await?;
    Ok(Json(json!({})))
}
