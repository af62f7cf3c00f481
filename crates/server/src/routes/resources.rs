//! CRUD handlers shared by every entity kind.
//!
//! Routes are generated per [`EntityKind`]: kinds without a parent are
//! created at their collection root, nested kinds under their parent.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use models::{Entity, EntityKind};
use serde_json::json;

use crate::errors::JsonApiError;
use crate::state::AppState;

/// One entity in its client-facing form.
pub struct EntityJson(pub Entity);

impl IntoResponse for EntityJson {
    fn into_response(self) -> Response {
        Json(self.0.public()).into_response()
    }
}

pub struct EntityList(pub Vec<Entity>);

impl IntoResponse for EntityList {
    fn into_response(self) -> Response {
        let items: Vec<_> = self.0.iter().map(Entity::public).collect();
        Json(items).into_response()
    }
}

pub fn routes(kind: EntityKind) -> Router<AppState> {
    let collection = format!("/{}", kind.collection());
    let item = format!("/{}/:id", kind.collection());

    let list_all = get(move |State(state): State<AppState>| list(state, kind));
    let collection_routes = match kind.schema().parent {
        None => list_all.post(move |State(state): State<AppState>, body: Bytes| {
            create(state, kind, None, body)
        }),
        Some(_) => list_all,
    };

    let router = Router::new().route(&collection, collection_routes).route(
        &item,
        get(move |State(state): State<AppState>, Path(id): Path<String>| show(state, kind, id))
            .put(move |State(state): State<AppState>, Path(id): Path<String>, body: Bytes| {
                update(state, kind, id, body)
            })
            .delete(move |State(state): State<AppState>, Path(id): Path<String>| {
                destroy(state, kind, id)
            }),
    );

    match kind.schema().parent {
        Some(link) => router.route(
            &format!("/{}/:id/{}", link.kind.collection(), kind.collection()),
            get(move |State(state): State<AppState>, Path(parent_id): Path<String>| {
                list_children(state, kind, parent_id)
            })
            .post(move |State(state): State<AppState>, Path(parent_id): Path<String>, body: Bytes| {
                create(state, kind, Some(parent_id), body)
            }),
        ),
        None => router,
    }
}

async fn list(state: AppState, kind: EntityKind) -> EntityList {
    EntityList(state.resources.list(kind).await)
}

async fn list_children(
    state: AppState,
    kind: EntityKind,
    parent_id: String,
) -> Result<EntityList, JsonApiError> {
    Ok(EntityList(state.resources.list_children(kind, &parent_id).await?))
}

async fn show(state: AppState, kind: EntityKind, id: String) -> Result<EntityJson, JsonApiError> {
    Ok(EntityJson(state.resources.get(kind, &id).await?))
}

async fn create(
    state: AppState,
    kind: EntityKind,
    parent_id: Option<String>,
    body: Bytes,
) -> Result<(StatusCode, EntityJson), JsonApiError> {
    let entity = state.resources.create(kind, parent_id.as_deref(), &body).await?;
    Ok((StatusCode::CREATED, EntityJson(entity)))
}

async fn update(
    state: AppState,
    kind: EntityKind,
    id: String,
    body: Bytes,
) -> Result<EntityJson, JsonApiError> {
    Ok(EntityJson(state.resources.update(kind, &id, &body).await?))
}

async fn destroy(
    state: AppState,
    kind: EntityKind,
    id: String,
) -> Result<Json<serde_json::Value>, JsonApiError> {
    state.resources.delete(kind, &id).await?;
    Ok(Json(json!({})))
}
