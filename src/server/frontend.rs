//! Static bundle serving and response headers shared by every route.

use std::time::Instant;

use axum::{
    extract::{Request, State},
    http::{header::CONTENT_SECURITY_POLICY, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Response},
};
use tracing::{debug, warn};

use super::state::AppState;

const MISSING_BUNDLE_PAGE: &str = "<!doctype html>\
<html lang=\"de\"><head><meta charset=\"utf-8\"><title>Anfrage</title></head>\
<body><h1>Formular nicht verfügbar</h1>\
<p>Das Frontend wurde noch nicht gebaut (dist/index.html fehlt).</p></body></html>";

/// Entry point for every path the bundle has no file for, so client-side
/// routes like `/<token>` load the app.
pub async fn spa_entry(State(state): State<AppState>) -> Response {
    let index = state.dist_dir.join("index.html");
    match tokio::fs::read_to_string(&index).await {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            warn!(path = %index.display(), error = %e, "frontend bundle missing");
            (StatusCode::SERVICE_UNAVAILABLE, Html(MISSING_BUNDLE_PAGE)).into_response()
        }
    }
}

/// Adds the configured Content-Security-Policy to every response.
pub async fn csp_middleware(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let mut resp = next.run(req).await;
    resp.headers_mut()
        .insert(CONTENT_SECURITY_POLICY, state.csp.clone());
    resp
}

pub async fn request_log_middleware(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();

    let resp = next.run(req).await;
    debug!(
        %method,
        path,
        status = resp.status().as_u16(),
        elapsed = ?started.elapsed(),
        "request handled"
    );
    resp
}
