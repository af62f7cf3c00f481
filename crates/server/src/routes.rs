use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use models::EntityKind;
use tower::Layer;
use tower_http::{
    cors::CorsLayer,
    normalize_path::{NormalizePath, NormalizePathLayer},
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::errors::JsonApiError;
use crate::session::storage_session;
use crate::state::AppState;

pub mod index;
pub mod place_amenities;
pub mod resources;
pub mod search;

/// Prefix of every API route.
pub const API_PREFIX: &str = "/api/v1";

async fn not_found() -> JsonApiError {
    JsonApiError::not_found()
}

/// Versioned API routes, each request running inside a storage session.
fn api_router(state: &AppState) -> Router<AppState> {
    let mut api = Router::new()
        .route("/status", get(index::status))
        .route("/stats", get(index::stats));
    for kind in EntityKind::ALL {
        api = api.merge(resources::routes(kind));
    }
    api.route("/places/:id/amenities", get(place_amenities::list))
        .route(
            "/places/:id/amenities/:amenity_id",
            post(place_amenities::link).delete(place_amenities::unlink),
        )
        .route("/places_search", post(search::places_search))
        .route_layer(middleware::from_fn_with_state(state.clone(), storage_session))
}

/// Build the application router: the API under [`API_PREFIX`], `/metrics`
/// and a JSON 404 for everything else.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .nest(API_PREFIX, api_router(&state))
        .route("/metrics", get(index::metrics))
        .fallback(not_found)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}

/// [`build_router`] behind trailing-slash normalisation, which has to run
/// before routing.
pub fn build_app(state: AppState, cors: CorsLayer) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(build_router(state, cors))
}
