//! Reference Controller
//!
//! Reconciles `Controller` CRDs: each one names another object by
//! `{kind, name, apiVersion}` in its own namespace, and the controller marks
//! that object's status with `controller: true` to signal that a controller
//! exists for it.

mod backoff;
mod config;
mod controller;
mod error;
mod metrics;
mod reconciler;
mod server;
mod watcher;
#[cfg(test)]
mod test_utils;

use anyhow::Context as _;
use config::Config;
use controller::Controller;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("a rustls crypto provider is already installed"))?;

    info!("Starting Reference Controller");

    let config = Config::from_env().context("failed to load configuration")?;

    info!("Configuration:");
    info!("  Namespace: {}", config.namespace.as_deref().unwrap_or("all namespaces"));
    info!("  Concurrency: {}", config.concurrency);
    info!("  Debounce: {:?}", config.debounce);
    info!("  Backoff: {}m..{}m", config.backoff_min_minutes, config.backoff_max_minutes);
    info!("  Probes: {}", config.metrics_addr);

    let controller = Controller::new(config)
        .await
        .context("failed to initialize controller")?;
    controller.run().await?;

    Ok(())
}
