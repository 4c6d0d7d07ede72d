use anyhow::Context;
use tracing_subscriber::EnvFilter;

use chini_api::config::AppConfig;
use chini_api::database::DatabaseManager;
use chini_api::{app, is_production, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET_KEY, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("chini_api=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::load().context("invalid configuration")?;
    tracing::info!("Starting Chini API in {:?} mode", config.environment);

    if is_production!() && config.database.url.is_none() {
        anyhow::bail!("DATABASE_URL is required in production");
    }

    let store = DatabaseManager::open(&config.database)
        .await
        .context("failed to open document store")?;
    tracing::info!("Using {} document store", store.backend());

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config, store);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Chini API listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await.context("server error")?;
    Ok(())
}
