//! HTTP backend for the intake form.
//!
//! Two JSON endpoints sit in front of the submission store; everything
//! else is the built frontend bundle.
//!
//! | Route | Result |
//! |-------|--------|
//! | `GET /api/check/:token` | `200 {exists, submittedAt?}` |
//! | `POST /api/submit` | `200 {success: true}`, `400` missing token or bad body, `409` duplicate |
//! | anything else | file from the bundle, else `index.html`, else `503` |
//!
//! Every response carries the configured Content-Security-Policy.

use axum::{
    handler::Handler,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use tokio::{net::TcpListener, signal};
use tower_http::services::ServeDir;
use tracing::{error, info};

pub mod config;
pub mod error;
pub mod frontend;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use error::{AppError, ServerError};
pub use state::AppState;

use frontend::{csp_middleware, request_log_middleware, spa_entry};
use routes::{check_handler, submit_handler};

pub fn build_router(state: AppState) -> Router {
    let frontend = ServeDir::new(&state.dist_dir).fallback(spa_entry.with_state(state.clone()));

    Router::new()
        .route("/api/check/:token", get(check_handler))
        .route("/api/submit", post(submit_handler))
        .fallback_service(frontend)
        .layer(from_fn_with_state(state.clone(), csp_middleware))
        .layer(from_fn(request_log_middleware))
        .with_state(state)
}

/// Opens the store, binds the listener and serves until Ctrl+C or SIGTERM.
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    info!("Initializing state...");
    let state = AppState::from_config(&config)?;
    let app = build_router(state);

    let address = config.address();
    info!("Binding to {address}");
    let listener = TcpListener::bind(address)
        .await
        .map_err(|source| ServerError::Bind { address, source })?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!(error = %e, "failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!(error = %e, "failed to install terminate handler");
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
}
