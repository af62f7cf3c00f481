use axum::{body::Bytes, extract::State};

use super::resources::EntityList;
use crate::errors::JsonApiError;
use crate::state::AppState;

pub async fn places_search(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<EntityList, JsonApiError> {
    Ok(EntityList(state.resources.search_places(&body).await?))
}
