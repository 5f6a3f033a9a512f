//! Pixelboard - Shared Real-Time Canvas Service
//!
//! Server entry point.

#![forbid(unsafe_code)]

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pixelboard::{config::AppConfig, server};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pixelboard=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load_from_env()?;

    info!("Starting Pixelboard v{}", env!("CARGO_PKG_VERSION"));
    server::run(config).await
}
