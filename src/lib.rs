use std::path::Path;

use crate::model::{DbConnection, ModelManager, StoreError};
use crate::utils::signal::shutdown_signal;
use crate::{error::AppResult, web::AppState};
use axum::Router;
use sqlx::migrate::Migrator;
use tokio::net::TcpListener;

pub mod config;
pub use config::{Config, ConfigError, ConfigResult};

pub mod auth;
pub mod error;
pub mod model;
pub mod policy;
pub mod service;
pub mod utils;
pub mod web;

static APPLICATION_NAME: &str = "corso";

/// Opens whichever storage backend the config selects.
async fn open_storage(config: &Config) -> AppResult<ModelManager> {
    match config.storage().backend() {
        config::StorageBackend::Postgres => {
            let uri = match config.storage().database_uri() {
                Some(uri) => uri,
                None => {
                    tracing::error!("storage.backend is \"postgres\" but storage.database_uri is not set");
                    std::process::exit(1);
                }
            };
            let db = DbConnection::connect(uri)?;

            let migrator = Migrator::new(Path::new("./migrations"))
                .await
                .map_err(StoreError::from)?;
            tracing::debug!("applying migrations...");
            migrator.run(db.pool()).await.map_err(StoreError::from)?;

            Ok(ModelManager::postgres(db))
        }
        config::StorageBackend::Json => {
            let data_dir = config.storage().data_dir().unwrap_or("./data");
            Ok(ModelManager::json(data_dir).await?)
        }
    }
}

pub async fn build_server() -> AppResult<(AppState, Router)> {
    let use_local = cfg!(debug_assertions);
    let config = config::Config::get_or_init(use_local).await;

    let mm = open_storage(config).await?;
    let state = AppState::new(mm, config.app().public_url());
    let app = web::routes::build_app(state.clone(), config);
    Ok((state, app))
}

/// Same wiring as `build_server`, but over a caller-provided manager.
/// Tests use this to point the server at a scratch backend.
pub async fn build_server_with_mm(mm: ModelManager) -> AppResult<(AppState, Router)> {
    let config = config::Config::get_or_init(true).await;

    let state = AppState::new(mm, config.app().public_url());
    let app = web::routes::build_app(state.clone(), config);
    Ok((state, app))
}

#[tracing::instrument]
pub async fn setup_workers() -> AppResult<()> {
    let (_, app) = build_server().await?;
    let config = Config::get_or_init(false).await;
    let listener = TcpListener::bind(config.host().bindto()).await?;

    tracing::info!("axum is starting at: {}", config.host().bindto());
    let axum_handle = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());

    axum_handle.await?;
    Ok(())
}

fn setup_trace() {
    use tracing_error::ErrorLayer;
    use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

    // load .env file for RUST_LOG etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .with(ErrorLayer::default())
        .init();

    tracing::debug!("tracing initialized.");
}

#[tracing::instrument]
pub async fn run() -> AppResult<()> {
    setup_trace();
    setup_workers().await?;
    Ok(())
}
