mod auth;
mod config;
mod db;
mod errors;
mod evaluation;
mod models;
mod resumes;
mod routes;
mod state;

use std::net::SocketAddr;

use anyhow::Result;
use axum::extract::DefaultBodyLimit;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.rust_log)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting screening API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config).await?;

    // Temp-file landing area for uploads
    tokio::fs::create_dir_all(&config.upload_dir).await?;
    info!("Upload directory ready at {}", config.upload_dir.display());

    let max_body = config.max_upload_bytes;
    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;

    // Build app state + router
    let state = AppState { db, config };
    let app = build_router(state)
        .layer(DefaultBodyLimit::max(max_body))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    info!("Listening on {addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
