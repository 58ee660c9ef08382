use std::sync::Arc;

use hustle_booking::{
    clock::SystemClock,
    handlers, startup,
    store::{CachedDirectory, PgStore},
    AppConfig, AppState,
};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables before reading LOG_FORMAT or RUST_LOG
    dotenvy::dotenv().ok();

    let use_json = std::env::var("LOG_FORMAT")
        .unwrap_or_else(|_| "text".to_string()) == "json";

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,hustle_booking=debug,tower_http=debug".into());

    if use_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    let config = AppConfig::from_env().map_err(|e| {
        tracing::error!("Configuration error: {}", e);
        e
    })?;

    let store = PgStore::connect(&config.database_url).await.map_err(|e| {
        tracing::error!("Failed to create database pool: {}", e);
        e
    })?;
    tracing::info!("Database pool created successfully");

    sqlx::migrate!("./migrations").run(store.pool()).await.map_err(|e| {
        tracing::error!("Failed to apply migrations: {}", e);
        e
    })?;
    tracing::info!("Migrations applied");

    let metrics_state = Arc::new(handlers::setup_metrics_recorder());
    tracing::info!("Metrics recorder initialized");

    let store = Arc::new(store);
    let directory = Arc::new(CachedDirectory::new(store.clone(), config.directory_cache_ttl));
    let bind_addr = config.bind_addr;

    let state = Arc::new(AppState {
        bookings: store,
        directory,
        clock: Arc::new(SystemClock),
        config,
        metrics: metrics_state,
    });

    let app = startup::build_router(state);

    let listener = TcpListener::bind(bind_addr).await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
