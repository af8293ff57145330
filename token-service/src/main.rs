use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use token_service::config::load_service_config;
use token_service::{build_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = load_service_config().context("Failed to load token-service configuration")?;
    let state = AppState::from_config(&config)?;
    let app = build_router(state, &config);

    info!(
        addr = %config.bind_addr,
        issuer = config.jwt.issuer(),
        audience = config.jwt.audience(),
        validity_days = config.jwt.validity_days(),
        algorithm = %config.jwt.algorithm(),
        "starting token-service"
    );
    let listener = TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
