//! offcache entry point.
//!
//! Warm-and-verify tool: installs the configured precache manifest into
//! the current generation, activates it (dropping prior generations), then
//! exercises the request path for every precached resource and reports
//! the outcome. Logging goes to stderr.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use offcache_core::{AppConfig, CacheDb};
use offcache_worker::{CacheManager, FetchConfig, HttpFetcher, Request};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::load()?;
    tracing::info!(origin = %config.origin, generation = %config.generation, "starting offcache");

    let store = CacheDb::open(&config.db_path).await?;
    let fetcher = HttpFetcher::new(FetchConfig {
        user_agent: config.user_agent.clone(),
        max_bytes: config.max_bytes,
        timeout: config.timeout(),
    })?;
    let manager = CacheManager::new(
        store,
        fetcher,
        config.origin.clone(),
        config.generation.clone(),
        config.offline_fallback.clone(),
    );

    manager.install(&config.precache).await?;
    manager.activate().await?;

    for resource in &config.precache {
        match manager.handle(&Request::sub_resource(resource)).await {
            Ok(response) => {
                tracing::info!(resource = %resource, status = response.status, bytes = response.body.len(), "served");
            }
            Err(err) => tracing::warn!(resource = %resource, error = %err, "request failed"),
        }
    }

    manager.quiesce().await;

    let cached = manager.store().count_entries(manager.generation()).await?;
    tracing::info!(cached, generation = %manager.generation(), "cache warmed");

    Ok(())
}
