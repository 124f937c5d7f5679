//! tally server
//!
//! Visit counter over HTTP:
//! - GET  /api/counter            -> {"count": n}
//! - POST /api/counter/increment  -> {"count": n + 1}
//! - GET  /api/health             -> {"status": "ok"}
//!
//! Usage: `tally-server [config.yaml]`

use tally_core::error::{Result, TallyError};
use tally_server::{app_state, config, obs, router};

#[tokio::main]
async fn main() -> Result<()> {
    let cfg_path = std::env::args().nth(1);
    let cfg = config::load(cfg_path.as_deref())?;

    obs::init_tracing(&cfg.log);

    let listen = cfg.server.listen_addr()?;
    let state = app_state::AppState::new(cfg)?;

    // Failure here is not fatal: increments recreate missing storage.
    let store = state.store();
    if let Err(e) = tokio::task::spawn_blocking(move || store.init())
        .await
        .map_err(|e| TallyError::Internal(format!("init task failed: {e}")))
        .and_then(|r| r)
    {
        tracing::warn!(error = %e, "counter storage init failed; continuing");
    }

    let counter_path = state.store().path().display().to_string();
    let app = router::build_router(state);

    tracing::info!(%listen, counter = %counter_path, "tally-server starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| TallyError::Internal(format!("bind {listen} failed: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| TallyError::Internal(format!("server failed: {e}")))?;

    tracing::info!("tally-server stopped");
    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
