//! RateVault Server Binary
//!
//! Serves daily exchange rates over HTTP, caching fetched days in
//! memory for the lifetime of the process.

use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ratevault_core::{HttpRateSource, MemoryStore, RateCacheService, RateStore};
use ratevault_server::routes::{self, AppState};
use ratevault_server::ServerConfig;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env();

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.log_level.clone()),
        ))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("Starting RateVault server");

    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(anyhow::anyhow!("Configuration error: {}", e));
    }

    let store: Arc<dyn RateStore> = Arc::new(MemoryStore::new());
    let source = Arc::new(HttpRateSource::new(config.source.clone())?);
    let service = Arc::new(RateCacheService::new(store.clone(), source));
    let state = web::Data::new(AppState { service, store });

    info!(
        listen_addr = %config.listen_addr,
        listen_port = config.listen_port,
        source_url = %config.source.base_url,
        "RateVault server running"
    );

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(routes::configure)
    })
    .bind((config.listen_addr.as_str(), config.listen_port))?
    .run()
    .await?;

    Ok(())
}
