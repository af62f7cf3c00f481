//! Per-request storage sessions.
//!
//! Safe methods share a read session; every other request gets the store
//! to itself. The session ends with `Storage::close`, which drops whatever
//! the handler changed but did not save.

use axum::extract::{Request, State};
use axum::http::Method;
use axum::middleware::Next;
use axum::response::Response;
use tracing::error;

use crate::state::AppState;

fn is_read_only(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

pub async fn storage_session(State(state): State<AppState>, req: Request, next: Next) -> Response {
    if is_read_only(req.method()) {
        let _session = state.sessions.read().await;
        let response = next.run(req).await;
        close(&state).await;
        response
    } else {
        let _session = state.sessions.write().await;
        let response = next.run(req).await;
        close(&state).await;
        response
    }
}

async fn close(state: &AppState) {
    if let Err(e) = state.storage.close().await {
        error!(error = %e, "failed to close storage session");
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{middleware, Router};
    use chrono::Utc;
    use models::{Entity, EntityKind};
    use serde_json::json;
    use service::storage::{FileStorage, Storage};
    use tower::ServiceExt;

    use super::*;

    #[test]
    fn only_safe_methods_share_sessions() {
        assert!(is_read_only(&Method::GET));
        assert!(is_read_only(&Method::HEAD));
        assert!(is_read_only(&Method::OPTIONS));
        for method in [Method::POST, Method::PUT, Method::DELETE, Method::PATCH] {
            assert!(!is_read_only(&method), "{method}");
        }
    }

    #[tokio::test]
    async fn failed_writes_are_rolled_back_when_the_session_ends() -> anyhow::Result<()> {
        let path = std::env::temp_dir().join(format!("hbnb_session_{}.json", uuid::Uuid::new_v4()));
        let state = AppState::new(FileStorage::open(&path).await?);

        let mut kept = Entity::blank(EntityKind::State, Utc::now());
        kept.assign("name", json!("Kept"))?;
        let kept_id = kept.id().to_owned();
        state.storage.new(kept).await;
        state.storage.save().await?;

        let storage = state.storage.clone();
        let target = kept_id.clone();
        let app = Router::new()
            .route(
                "/broken",
                post(move || {
                    let storage = storage.clone();
                    let target = target.clone();
                    async move {
                        storage.new(Entity::blank(EntityKind::State, Utc::now())).await;
                        let _ = storage
                            .modify(
                                EntityKind::State,
                                &target,
                                Box::new(|e: &mut Entity| e.assign("name", json!("Renamed"))),
                            )
                            .await;
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                }),
            )
            .route_layer(middleware::from_fn_with_state(state.clone(), storage_session))
            .with_state(state.clone());

        let req = Request::builder().method("POST").uri("/broken").body(Body::empty())?;
        let resp = app.oneshot(req).await?;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        assert_eq!(state.storage.count(None).await, 1);
        match state.storage.get(EntityKind::State, &kept_id).await {
            Some(Entity::State(s)) => assert_eq!(s.name, "Kept"),
            other => panic!("kept state changed: {other:?}"),
        }

        let _ = tokio::fs::remove_file(&path).await;
        Ok(())
    }
}
