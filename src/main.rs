use anyhow::{Context, Result};
use axum::Router;
use portrait::api::{
    create_config_router, create_ingestion_router, create_portrait_router, create_ws_router,
    ConfigAppState, IngestionAppState, PortraitAppState, WsAppState,
};
use portrait::config::{load_config, PortraitConfig};
use portrait::hub::{EventBus, EventHub};
use portrait::portrait::PortraitLoader;
use portrait::store::Database;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "portrait=info".into()),
        )
        .init();

    info!("Portrait starting...");

    let config_path = std::env::var("PORTRAIT_CONFIG").unwrap_or_else(|_| "portrait.toml".to_string());
    let mut config = match load_config(&config_path) {
        Ok(config) => {
            info!(path = %config_path, "Loaded configuration");
            config
        }
        Err(e) => {
            warn!(path = %config_path, error = %e, "Using default configuration");
            PortraitConfig::default()
        }
    };
    config.apply_env();

    let db = Arc::new(Database::open(&config.database.path)?);
    info!(path = %config.database.path.display(), "Database opened");

    let hub = EventHub::new();
    let bus: Arc<dyn EventBus> = Arc::new(hub.clone());
    let config = Arc::new(config);

    let mut app = Router::new()
        .merge(create_config_router(ConfigAppState {
            db: Arc::clone(&db),
            bus: Arc::clone(&bus),
        }))
        .merge(create_ingestion_router(IngestionAppState {
            bus: Arc::clone(&bus),
        }))
        .merge(create_portrait_router(PortraitAppState {
            loader: PortraitLoader::new(Arc::clone(&db), config.portrait.clone()),
            hub: hub.clone(),
            config: Arc::clone(&config),
        }))
        .merge(create_ws_router(WsAppState { hub }));

    if config.server.cors_allow_any {
        app = app.layer(CorsLayer::permissive());
    }

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind_addr))?;
    info!(addr = %config.server.bind_addr, "Listening");

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
