use async_trait::async_trait;
use serde::Deserialize;

use super::http_client::HttpClientTrait;
use super::url::join_segments;
use crate::domain::{Coordinate, DomainError, GeocodingProvider};

const DEFAULT_TOMTOM_BASE_URL: &str = "https://api.tomtom.com";
const PROVIDER: &str = "tomtom";

/// TomTom Search API geocoder with Static Image maps
#[derive(Debug)]
pub struct TomTomProvider<C: HttpClientTrait> {
    client: C,
    api_key: String,
    base_url: String,
}

impl<C: HttpClientTrait> TomTomProvider<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_TOMTOM_BASE_URL)
    }

    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub(crate) fn geocode_url(&self, query: &str) -> Result<String, DomainError> {
        let document = format!("{}.json", query);
        let mut url = join_segments(
            PROVIDER,
            &self.base_url,
            &["search", "2", "geocode", &document],
        )?;

        url.query_pairs_mut().append_pair("key", &self.api_key);

        Ok(url.into())
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<Option<Coordinate>, DomainError> {
        let response: TomTomResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider(PROVIDER, format!("Failed to parse response: {}", e))
        })?;

        Ok(response
            .results
            .into_iter()
            .next()
            .map(|result| Coordinate::new(result.position.lat, result.position.lon)))
    }
}

#[async_trait]
impl<C: HttpClientTrait> GeocodingProvider for TomTomProvider<C> {
    async fn geocode(&self, query: &str) -> Result<Option<Coordinate>, DomainError> {
        let url = self.geocode_url(query)?;
        let response = self.client.get_json(&url).await?;
        self.parse_response(response)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }

    /// The v1 static image endpoint takes no overlays, so only the client is shown
    fn static_map_url(&self, center: Coordinate, _markers: &[Coordinate]) -> Option<String> {
        Some(format!(
            "{}/map/1/staticimage?key={}&zoom=15&center={},{}&format=png&layer=basic&style=main&width=440&height=360",
            self.base_url, self.api_key, center.lon, center.lat
        ))
    }
}

#[derive(Debug, Deserialize)]
struct TomTomResponse {
    #[serde(default)]
    results: Vec<TomTomResult>,
}

#[derive(Debug, Deserialize)]
struct TomTomResult {
    position: TomTomPosition,
}

#[derive(Debug, Deserialize)]
struct TomTomPosition {
    lat: f64,
    lon: f64,
}
