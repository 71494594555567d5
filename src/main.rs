use std::sync::Arc;

use anyhow::Result;
use forecast_service::{
    AppState, InMemoryOverrideStore, KeyspaceOverrideStore, OverrideStore, ServiceConfig, WeatherClient, web,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("forecast_service={level},tower_http={level}").into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServiceConfig::load()?;
    init_tracing(&config.logging.level);

    let weather = Arc::new(WeatherClient::new(&config.weather)?);

    let overrides: Arc<dyn OverrideStore> = match &config.store.path {
        Some(path) => {
            tracing::info!("Opening override store at {}", path.display());
            Arc::new(KeyspaceOverrideStore::open(path)?)
        }
        None => {
            tracing::warn!("No store path configured, overrides are kept in memory only");
            Arc::new(InMemoryOverrideStore::new())
        }
    };

    web::run(&config.server.bind_address(), AppState::new(weather, overrides)).await
}
