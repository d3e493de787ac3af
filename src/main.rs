mod app;
mod auth;
mod config;
mod db;
mod errors;
mod extract;
mod logging;
mod mappers;
mod models;
mod routes;
mod services;
mod state;
mod store;

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use crate::config::{Config, StoreBackend};
use crate::db::PgStore;
use crate::logging::LoggingConfig;
use crate::services::token_service::TokenService;
use crate::state::AppState;
use crate::store::MemoryStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging FIRST
    logging::init_logging(LoggingConfig::from_env()).map_err(|e| anyhow::anyhow!(e))?;

    let config = Config::from_env()?;
    let tokens = TokenService::new(&config.jwt_secret, config.jwt_expiry_hours);

    let state = match config.store_backend {
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set")?;
            let pool = db::create_pool(&config, database_url)
                .await
                .context("Failed to connect to Postgres")?;
            db::run_migrations(&pool)
                .await
                .context("Failed to run migrations")?;
            tracing::info!("Using store backend: postgres");
            AppState::new(Arc::new(PgStore::new(pool)), tokens, config.max_page_size)
        }
        StoreBackend::Memory => {
            tracing::warn!("Using store backend: memory (data is lost on restart)");
            AppState::new(Arc::new(MemoryStore::new()), tokens, config.max_page_size)
        }
    };

    let app = app::create_app(state);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("stock-api listening on http://{}/", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
