mod assistant;
mod catalog;
mod config;
mod db;
mod directory;
mod errors;
mod interpreter;
mod llm_client;
mod matching;
mod models;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::catalog::queries::PgCatalogReader;
use crate::catalog::CatalogCache;
use crate::config::Config;
use crate::db::create_pool;
use crate::directory::PgProfileDirectory;
use crate::llm_client::ModelClient;
use crate::matching::store::PgMatchStore;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting DevMatch API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize model client
    let model = ModelClient::from_config(&config)?;
    info!(
        "Model client initialized (model: {}, transports: {:?}, timeout: {}s)",
        model.model(),
        model.transport_names(),
        model.timeout().as_secs()
    );

    // Warm the technology catalog; requests retry the load if this fails
    let catalog = Arc::new(CatalogCache::new(
        Arc::new(PgCatalogReader::new(db.clone())),
        config.catalog_ttl,
    ));
    match catalog.current().await {
        Ok(loaded) if loaded.is_empty() => warn!("Technology catalog is empty"),
        Ok(_) => {}
        Err(e) => warn!("Technology catalog not loaded at startup: {e:#}"),
    }

    // Build app state
    let state = AppState {
        config: config.clone(),
        model,
        catalog,
        directory: Arc::new(PgProfileDirectory::new(db.clone())),
        matches: Arc::new(PgMatchStore::new(db)),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
