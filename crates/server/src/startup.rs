use std::future::Future;

use axum::{extract::Request, ServiceExt};
use common::utils::logging::init_logging_from_env;
use configs::AppConfig;
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::routes;
use crate::state::AppState;
use service::{runtime, storage::FileStorage};

/// Load `.env` and install the tracing subscriber. Call once, before anything logs.
pub fn init_env() {
    dotenv().ok();
    init_logging_from_env();
}

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Open storage from `cfg` and serve until Ctrl+C.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    runtime::ensure_env(&cfg.storage.path).await?;

    // Loads the whole store once; later sessions only reload to discard unsaved changes.
    let storage = FileStorage::open(&cfg.storage.path).await?;
    info!(storage = %storage.path().display(), "storage opened");
    let state = AppState::new(storage);

    // Host names such as `localhost` resolve here.
    let listener = TcpListener::bind(cfg.bind_addr()).await?;
    serve(listener, state, shutdown_signal()).await
}

/// Serve the API on `listener` until `shutdown` resolves.
///
/// In-flight requests run to completion, so every open storage session
/// still ends with `Storage::close` before this returns.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    let app = routes::build_app(state, build_cors());
    info!(%addr, "starting hbnb api");
    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown)
        .await?;
    info!(%addr, "hbnb api drained");
    Ok(())
}

/// Resolves on Ctrl+C. Without a signal handler it never resolves.
pub async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!(event = "shutdown_signal", "received Ctrl+C, draining in-flight requests"),
        Err(e) => {
            error!(event = "signal_handler_failed", error = %e, "cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    }
}
