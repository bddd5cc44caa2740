use anyhow::Result;
use tracing_subscriber::EnvFilter;

use scrape_rendered::{app, AppState, Config};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    if config.token.is_none() {
        tracing::warn!("BROWSERLESS_TOKEN is not set; scrape requests will fail");
    }

    let state = AppState::new(&config)?;
    tracing::info!("listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app(state)).await?;
    Ok(())
}
