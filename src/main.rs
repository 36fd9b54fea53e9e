mod config;
mod db;
mod routes;
mod services;
mod state;
mod storage;

use std::sync::Arc;

use crate::services::catalog::PgCatalog;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!(error = %e, "no .env file loaded");
    }

    let config = config::AppConfig::from_env().expect("invalid configuration");

    db::ensure_database_exists(&config)
        .await
        .expect("database bootstrap failed");
    let pool = db::init_pool(&config).await.expect("database init failed");

    let storage = storage::from_config(&config).expect("storage backend init failed");
    if let Some(local) = storage.as_local() {
        local.ensure_root().await.expect("failed to create uploads dir");
        tracing::info!(root = %local.root().display(), "local storage ready");
    }

    let state = state::AppState::new(Arc::new(PgCatalog::new(pool)), storage, config.upload_policy.clone());

    let app = routes::app(state);
    let port = config.port;
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, mode = config.storage_mode.as_str(), "planroom listening");
    axum::serve(listener, app).await.expect("server failed");
}
