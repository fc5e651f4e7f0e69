//! Storefront - headless storefront service

use anyhow::Result;
use storefront::api::{self, AppState};
use storefront::config::Config;
use storefront::InMemoryBackend;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();

    let config = Config::from_env();
    let backend = InMemoryBackend::load(&config.catalog_path).await?.with_checkout_base_url(&config.checkout_url);
    let app = api::router(AppState { backend, page_size: config.page_size, base_url: config.base_url.clone() });

    tracing::info!(port = config.port, page_size = config.page_size, "storefront listening on 0.0.0.0:{}", config.port);
    axum::serve(tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?, app).await?;
    Ok(())
}
