//! CLI entry point launching the cart-pole performance monitor.

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = cartpole_monitor::config::CliArgs::parse();
    let config = cartpole_monitor::config::AppConfig::load(cli.clone()).await?;

    tracing::info!("performance monitor started");
    tokio::select! {
        result = cartpole_monitor::run(config) => {
            if let Err(error) = result {
                tracing::error!(error = %error, "monitor execution failed");
                return Err(error.into());
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupted, shutting down");
        }
    }

    Ok(())
}
