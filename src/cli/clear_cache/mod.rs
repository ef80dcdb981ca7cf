//! Clear-cache command - forget every stored geocode

use tracing::info;

use crate::config::AppConfig;
use crate::domain::{DomainError, GeocodeCache};
use crate::infrastructure::cache::open_geocode_cache;
use crate::infrastructure::logging::init_logging;

/// Empty the configured geocode cache and delete its file
pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    init_logging(&config.logging);

    let cache = open_geocode_cache(&config.geocoding.cache_config()).await;
    let cleared = clear(cache.as_ref()).await?;

    println!(
        "Cleared {} cached addresses from {}",
        cleared,
        config.geocoding.cache_path.display()
    );
    Ok(())
}

async fn clear(cache: &dyn GeocodeCache) -> Result<usize, DomainError> {
    let cleared = cache.len().await;
    cache.clear().await?;
    info!(cleared, "Geocode cache cleared");

    Ok(cleared)
}
