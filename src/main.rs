use tracing_subscriber::EnvFilter;

use logistics_registry::config::Config;
use logistics_registry::error::AppError;
use logistics_registry::store::{Seed, Store};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.log_level.clone()))
        .with_target(false)
        .compact()
        .init();

    let store = Store::new(config.max_page_size);

    match &config.seed_path {
        Some(path) => {
            let raw = tokio::fs::read_to_string(path).await.map_err(|err| {
                AppError::Internal(format!("failed to read {}: {err}", path.display()))
            })?;
            let seed = Seed::from_json(&raw)?;
            tracing::info!(path = %path.display(), records = seed.len(), "loading seed");
            store.import(seed)?;
        }
        None => tracing::warn!("SEED_PATH not set; registry is empty"),
    }

    for (kind, count) in store.counts() {
        tracing::info!(table = %kind, count, "table loaded");
    }

    match store.metrics().encode() {
        Ok(text) => tracing::debug!(metrics = %text, "registry metrics"),
        Err(err) => tracing::error!(error = %err, "failed to encode metrics"),
    }

    Ok(())
}
