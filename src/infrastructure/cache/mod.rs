//! Geocode cache implementations

mod in_memory;
mod json_file;

use std::path::PathBuf;
use std::sync::Arc;

use crate::domain::GeocodeCache;

pub use in_memory::InMemoryGeocodeCache;
pub use json_file::JsonFileGeocodeCache;

/// Where geocode results are kept between runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeocodeCacheConfig {
    /// Nothing survives the process
    InMemory,
    /// JSON object file shared by every run
    JsonFile(PathBuf),
}

/// Open the configured cache
pub async fn open_geocode_cache(config: &GeocodeCacheConfig) -> Arc<dyn GeocodeCache> {
    match config {
        GeocodeCacheConfig::InMemory => Arc::new(InMemoryGeocodeCache::new()),
        GeocodeCacheConfig::JsonFile(path) => Arc::new(JsonFileGeocodeCache::open(path).await),
    }
}
