use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::{
    AddressKey, AddressKeyFormat, AddressRecord, Coordinate, GeocodeCache, GeocodingProvider,
};
use crate::infrastructure::observability::record_geocode_lookup;

/// Result of resolving one address
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// Served from the cache, no network call made
    Cached(Coordinate),
    /// Fetched from the provider and written to the cache
    Fetched(Coordinate),
    /// The provider answered with an empty result list
    NoResults,
    /// Transport, status or decoding failure
    Failed(String),
}

impl Lookup {
    pub fn coordinate(&self) -> Option<Coordinate> {
        match self {
            Self::Cached(coordinate) | Self::Fetched(coordinate) => Some(*coordinate),
            Self::NoResults | Self::Failed(_) => None,
        }
    }

    /// Human-readable reason for a miss, used as skip detail
    pub fn failure_detail(&self) -> Option<String> {
        match self {
            Self::Cached(_) | Self::Fetched(_) => None,
            Self::NoResults => Some("No results".to_string()),
            Self::Failed(message) => Some(message.clone()),
        }
    }

    fn outcome_label(&self) -> &'static str {
        match self {
            Self::Cached(_) => "cache_hit",
            Self::Fetched(_) => "fetched",
            Self::NoResults => "no_results",
            Self::Failed(_) => "error",
        }
    }
}

/// Cache-first geocoder
///
/// Never returns an error: every provider failure degrades to an absent
/// coordinate so one bad address cannot abort a batch.
#[derive(Debug, Clone)]
pub struct GeocodingClient {
    provider: Arc<dyn GeocodingProvider>,
    cache: Arc<dyn GeocodeCache>,
    format: AddressKeyFormat,
}

impl GeocodingClient {
    pub fn new(provider: Arc<dyn GeocodingProvider>, cache: Arc<dyn GeocodeCache>) -> Self {
        Self {
            provider,
            cache,
            format: AddressKeyFormat::default(),
        }
    }

    pub fn with_key_format(mut self, format: AddressKeyFormat) -> Self {
        self.format = format;
        self
    }

    pub fn key_format(&self) -> &AddressKeyFormat {
        &self.format
    }

    pub fn provider(&self) -> &Arc<dyn GeocodingProvider> {
        &self.provider
    }

    pub fn cache(&self) -> &Arc<dyn GeocodeCache> {
        &self.cache
    }

    pub fn key_for(&self, record: &AddressRecord) -> AddressKey {
        self.format.key_for(record)
    }

    pub async fn geocode(&self, record: &AddressRecord) -> Option<Coordinate> {
        self.resolve(&self.key_for(record)).await.coordinate()
    }

    /// Resolve a key, reporting where the answer came from
    pub async fn resolve(&self, key: &AddressKey) -> Lookup {
        let lookup = self.resolve_uncounted(key).await;
        record_geocode_lookup(self.provider.provider_name(), lookup.outcome_label());
        lookup
    }

    async fn resolve_uncounted(&self, key: &AddressKey) -> Lookup {
        if let Some(coordinate) = self.cache.lookup(key).await {
            debug!(address = %key, "Geocode cache hit");
            return Lookup::Cached(coordinate);
        }

        let provider = self.provider.provider_name();
        match self.provider.geocode(key.as_str()).await {
            Ok(Some(coordinate)) if coordinate.is_valid() => {
                if let Err(e) = self.cache.store(key, coordinate).await {
                    warn!(address = %key, error = %e, "Failed to persist geocode cache entry");
                }
                Lookup::Fetched(coordinate)
            }
            Ok(Some(coordinate)) => {
                warn!(address = %key, provider, %coordinate, "Provider returned an out-of-range coordinate");
                Lookup::Failed(format!("Invalid coordinate {}", coordinate))
            }
            Ok(None) => {
                warn!(address = %key, provider, "Geocoding returned no results");
                Lookup::NoResults
            }
            Err(e) => {
                warn!(address = %key, provider, error = %e, "Geocoding failed");
                Lookup::Failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::geocoding::MockGeocodingProvider;
    use crate::infrastructure::cache::InMemoryGeocodeCache;

    const KEY: &str = "4512 Panorama Dr, Bakersfield, CA 93306";

    fn record() -> AddressRecord {
        AddressRecord::new(2, "4512 Panorama Dr")
            .with_city("Bakersfield")
            .with_zip("93306")
    }

    fn client_with(provider: MockGeocodingProvider) -> (GeocodingClient, Arc<MockGeocodingProvider>, Arc<InMemoryGeocodeCache>) {
        let provider = Arc::new(provider);
        let cache = Arc::new(InMemoryGeocodeCache::new());
        let client = GeocodingClient::new(provider.clone(), cache.clone());
        (client, provider, cache)
    }

    #[tokio::test]
    async fn test_second_lookup_hits_cache() {
        let coordinate = Coordinate::new(35.3733, -119.0187);
        let (client, provider, _cache) =
            client_with(MockGeocodingProvider::new("mock").with_response(KEY, coordinate));

        let first = client.resolve(&AddressKey::new(KEY)).await;
        let second = client.resolve(&AddressKey::new(KEY)).await;

        assert_eq!(first, Lookup::Fetched(coordinate));
        assert_eq!(second, Lookup::Cached(coordinate));
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_geocode_builds_key_from_record() {
        let coordinate = Coordinate::new(35.3733, -119.0187);
        let (client, provider, cache) =
            client_with(MockGeocodingProvider::new("mock").with_response(KEY, coordinate));

        assert_eq!(client.geocode(&record()).await, Some(coordinate));
        assert_eq!(provider.calls(), vec![KEY.to_string()]);
        assert_eq!(cache.lookup(&AddressKey::new(KEY)).await, Some(coordinate));
    }

    #[tokio::test]
    async fn test_no_results_is_absent_and_not_cached() {
        let (client, provider, cache) = client_with(MockGeocodingProvider::new("mock"));

        assert_eq!(client.resolve(&AddressKey::new(KEY)).await, Lookup::NoResults);
        assert_eq!(client.geocode(&record()).await, None);
        // Misses are retried, never negatively cached
        assert_eq!(provider.call_count(), 2);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_provider_error_is_absent() {
        let (client, _provider, cache) =
            client_with(MockGeocodingProvider::new("mock").with_error(KEY, "timed out"));

        let lookup = client.resolve(&AddressKey::new(KEY)).await;
        assert!(matches!(lookup, Lookup::Failed(ref msg) if msg.contains("timed out")));
        assert_eq!(lookup.coordinate(), None);
        assert!(lookup.failure_detail().unwrap().contains("timed out"));
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_out_of_range_coordinate_rejected() {
        let (client, _provider, cache) = client_with(
            MockGeocodingProvider::new("mock").with_response(KEY, Coordinate::new(-119.0, 35.3)),
        );

        assert!(matches!(
            client.resolve(&AddressKey::new(KEY)).await,
            Lookup::Failed(_)
        ));
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_custom_market_key() {
        let coordinate = Coordinate::new(36.7378, -119.7871);
        let (client, provider, _cache) = client_with(
            MockGeocodingProvider::new("mock")
                .with_response("1 Elm Ave, Fresno, CA 93721", coordinate),
        );
        let client = client.with_key_format(AddressKeyFormat::new("Fresno", "CA"));

        let found = client
            .geocode(&AddressRecord::new(2, "1 Elm Ave").with_zip("93721.0"))
            .await;
        assert_eq!(found, Some(coordinate));
        assert_eq!(provider.call_count(), 1);
    }
}
