//! Intake form server.
//!
//! Serves the built frontend bundle plus `GET /api/check/:token` and
//! `POST /api/submit`. Settings come from flags or their environment
//! variables; see `intake-server --help`.

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use intake::server::{start_server, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(false).init();

    let config = ServerConfig::parse();
    start_server(config)
        .await
        .context("intake server stopped with an error")
}
