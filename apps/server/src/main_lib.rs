use std::sync::Arc;

use crate::config::Config;
use nisab_core::prices::{
    build_provider_chain, JsonFileSnapshotStore, PriceResolver, RequestCache, SystemClock,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub resolver: Arc<PriceResolver>,
    /// Shared secret for the snapshot refresh endpoint; the route is
    /// disabled when unset.
    pub snapshot_secret: Option<String>,
}

pub fn init_tracing() {
    let log_format = std::env::var("NISAB_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let clock = Arc::new(SystemClock);

    tokio::fs::create_dir_all(&config.snapshot_dir).await?;
    tracing::info!("Snapshot directory in use: {}", config.snapshot_dir.display());
    let snapshots = Arc::new(JsonFileSnapshotStore::new(&config.snapshot_dir, clock.clone()));

    let chain = Arc::new(build_provider_chain(&config.provider_settings()));
    let cache = Arc::new(RequestCache::with_ttl(config.cache_ttl, clock));
    let resolver = Arc::new(PriceResolver::new(chain, cache, snapshots));

    if config.snapshot_secret.is_none() {
        tracing::info!("NISAB_SNAPSHOT_SECRET not set, snapshot refresh endpoint disabled");
    }

    Ok(Arc::new(AppState {
        resolver,
        snapshot_secret: config.snapshot_secret.clone(),
    }))
}
