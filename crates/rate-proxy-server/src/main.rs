use anyhow::Context;
use clap::Parser;
use rate_proxy_server::{app, upstream_breaker, Config, RateCoordinator};
use rate_proxy_store::{DistributedMutex, RateCache, RedisStore, SharedStore};
use rate_proxy_upstream::RateApiClient;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();

    let store: Arc<dyn SharedStore> = Arc::new(
        RedisStore::connect(&config.redis_url)
            .await
            .context("connecting to shared store")?,
    );
    let cache = RateCache::new(Arc::clone(&store), config.cache());
    let mutex = DistributedMutex::new(Arc::clone(&store), config.lock());
    let source = Arc::new(RateApiClient::new(config.upstream())?);
    let breaker = upstream_breaker(config.breaker_builder());

    let coordinator = Arc::new(RateCoordinator::new(cache, mutex, breaker, source));

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "rate proxy listening");

    axum::serve(listener, app(coordinator).into_make_service()).await?;
    Ok(())
}
