use std::process::ExitCode;

use configs::AppConfig;
use tracing::{error, info};
use uuid::Uuid;

fn main() -> ExitCode {
    server::startup::init_env();

    let service_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    std::panic::set_hook(Box::new(move |info| {
        error!(
            service = "hbnb",
            event = "panic",
            %service_id,
            pid,
            message = %info,
            "unhandled panic occurred"
        );
    }));

    let cfg = match AppConfig::load_and_validate() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(
                service = "hbnb",
                event = "config_invalid",
                error = %e,
                "cannot load configuration"
            );
            return ExitCode::FAILURE;
        }
    };

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(threads) = cfg.server.worker_threads {
        builder.worker_threads(threads);
    }
    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(
                service = "hbnb",
                event = "runtime_build_failed",
                error = %e,
                "failed to build tokio runtime"
            );
            return ExitCode::FAILURE;
        }
    };

    info!(
        service = "hbnb",
        event = "start",
        %service_id,
        pid,
        version,
        threads = cfg.server.worker_threads.unwrap_or_default(),
        bind = %cfg.bind_addr(),
        "hbnb api starting"
    );

    // Returns once the shutdown signal fired and open sessions have closed.
    match rt.block_on(server::run(cfg)) {
        Ok(()) => {
            info!(service = "hbnb", event = "stop", %service_id, pid, "hbnb api stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(service = "hbnb", event = "run_failed", error = %e, "hbnb api failed");
            ExitCode::FAILURE
        }
    }
}
