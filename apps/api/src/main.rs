//! ConsorciaTech CRM API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod api_services;
mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

use consorciatech_core::AppError;
use tracing::info;

use crate::api_config::{ApiConfig, ProfileStoreConfig};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    api_config::init_tracing();

    let config = ApiConfig::load()?;

    let postgres_pool = match &config.profile_store {
        ProfileStoreConfig::Postgres { database_url } => {
            Some(api_services::connect_and_migrate(database_url).await?)
        }
        ProfileStoreConfig::Memory => None,
    };

    if config.migrate_only {
        info!("database migrations applied successfully");
        return Ok(());
    }

    if postgres_pool.is_none() {
        info!("using in-memory profile store; profiles are lost on restart");
    }

    let http_client = api_services::build_http_client(config.outbound_http_timeout)?;
    let app_state = api_services::build_app_state(&config, postgres_pool, http_client)?;
    let app = api_router::build_router(app_state, config.frontend_url.as_str())?;

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "consorciatech-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}
