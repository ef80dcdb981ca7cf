use async_trait::async_trait;
use serde::Deserialize;

use super::http_client::HttpClientTrait;
use super::url::join_segments;
use crate::domain::{Coordinate, DomainError, GeocodingProvider};

const DEFAULT_MAPBOX_BASE_URL: &str = "https://api.mapbox.com";
const PROVIDER: &str = "mapbox";

const CLIENT_PIN: &str = "pin-l+c0392b";
const SALE_PIN: &str = "pin-s+27ae60";
const MAP_VIEW: &str = "14,0/500x400@2x";

/// Mapbox Geocoding v5 and Static Images provider
#[derive(Debug)]
pub struct MapboxProvider<C: HttpClientTrait> {
    client: C,
    access_token: String,
    base_url: String,
}

impl<C: HttpClientTrait> MapboxProvider<C> {
    pub fn new(client: C, access_token: impl Into<String>) -> Self {
        Self::with_base_url(client, access_token, DEFAULT_MAPBOX_BASE_URL)
    }

    pub fn with_base_url(
        client: C,
        access_token: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            access_token: access_token.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub(crate) fn geocode_url(&self, query: &str) -> Result<String, DomainError> {
        let document = format!("{}.json", query);
        let mut url = join_segments(
            PROVIDER,
            &self.base_url,
            &["geocoding", "v5", "mapbox.places", &document],
        )?;

        url.query_pairs_mut()
            .append_pair("access_token", &self.access_token)
            .append_pair("limit", "1")
            .append_pair("country", "US");

        Ok(url.into())
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<Option<Coordinate>, DomainError> {
        let response: MapboxResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider(PROVIDER, format!("Failed to parse response: {}", e))
        })?;

        // `center` is [lon, lat]
        Ok(response
            .features
            .into_iter()
            .next()
            .map(|feature| Coordinate::from_lon_lat(feature.center[0], feature.center[1])))
    }
}

#[async_trait]
impl<C: HttpClientTrait> GeocodingProvider for MapboxProvider<C> {
    async fn geocode(&self, query: &str) -> Result<Option<Coordinate>, DomainError> {
        let url = self.geocode_url(query)?;
        let response = self.client.get_json(&url).await?;
        self.parse_response(response)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }

    fn static_map_url(&self, center: Coordinate, markers: &[Coordinate]) -> Option<String> {
        let mut overlay = format!("{}({},{})", CLIENT_PIN, center.lon, center.lat);
        for marker in markers {
            overlay.push_str(&format!(",{}({},{})", SALE_PIN, marker.lon, marker.lat));
        }

        Some(format!(
            "{}/styles/v1/mapbox/streets-v12/static/{}/{},{},{}?access_token={}",
            self.base_url, overlay, center.lon, center.lat, MAP_VIEW, self.access_token
        ))
    }
}

#[derive(Debug, Deserialize)]
struct MapboxResponse {
    #[serde(default)]
    features: Vec<MapboxFeature>,
}

#[derive(Debug, Deserialize)]
struct MapboxFeature {
    center: [f64; 2],
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::geocoding::http_client::mock::MockHttpClient;
    use crate::infrastructure::geocoding::HttpClient;
    use wiremock::matchers::{method, path_regex, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const QUERY: &str = "4512 Panorama Dr, Bakersfield, CA 93306";

    fn expected_url() -> String {
        MapboxProvider::new(MockHttpClient::new(), "pk.test")
            .geocode_url(QUERY)
            .unwrap()
    }

    #[test]
    fn test_geocode_url_shape() {
        let url = expected_url();
        assert!(url.starts_with(
            "https://api.mapbox.com/geocoding/v5/mapbox.places/4512%20Panorama%20Dr,%20Bakersfield,%20CA%2093306.json?"
        ));
        assert!(url.contains("access_token=pk.test"));
        assert!(url.contains("limit=1"));
        assert!(url.contains("country=US"));
    }

    #[tokio::test]
    async fn test_center_is_swapped_to_lat_lon() {
        let client = MockHttpClient::new().with_response(
            expected_url(),
            serde_json::json!({
                "type": "FeatureCollection",
                "features": [
                    { "center": [-119.0187, 35.3733], "place_name": "4512 Panorama Dr" },
                    { "center": [-100.0, 30.0] }
                ]
            }),
        );
        let provider = MapboxProvider::new(client, "pk.test");

        let coordinate = provider.geocode(QUERY).await.unwrap().unwrap();
        assert_eq!(coordinate, Coordinate::new(35.3733, -119.0187));
    }

    #[tokio::test]
    async fn test_empty_features_is_no_result() {
        let client = MockHttpClient::new()
            .with_response(expected_url(), serde_json::json!({ "features": [] }));
        let provider = MapboxProvider::new(client, "pk.test");

        assert!(provider.geocode(QUERY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let client = MockHttpClient::new().with_error(expected_url(), "HTTP 401 Unauthorized");
        let provider = MapboxProvider::new(client, "pk.test");

        assert!(matches!(
            provider.geocode(QUERY).await,
            Err(DomainError::Provider { .. })
        ));
    }

    #[tokio::test]
    async fn test_malformed_feature_is_error() {
        let client = MockHttpClient::new()
            .with_response(expected_url(), serde_json::json!({ "features": [{ "center": "x" }] }));
        let provider = MapboxProvider::new(client, "pk.test");

        assert!(provider.geocode(QUERY).await.is_err());
    }

    #[test]
    fn test_static_map_url_pins() {
        let provider = MapboxProvider::new(MockHttpClient::new(), "pk.test");
        let url = provider
            .static_map_url(
                Coordinate::new(35.37, -119.01),
                &[Coordinate::new(35.38, -119.02)],
            )
            .unwrap();

        assert_eq!(
            url,
            "https://api.mapbox.com/styles/v1/mapbox/streets-v12/static/\
             pin-l+c0392b(-119.01,35.37),pin-s+27ae60(-119.02,35.38)/\
             -119.01,35.37,14,0/500x400@2x?access_token=pk.test"
        );
    }

    #[tokio::test]
    async fn test_round_trip_through_reqwest() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/geocoding/v5/mapbox\.places/.+\.json$"))
            .and(query_param("access_token", "pk.test"))
            .and(query_param("limit", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "features": [{ "center": [-119.05, 35.30] }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = MapboxProvider::with_base_url(HttpClient::new(), "pk.test", server.uri());
        let coordinate = provider.geocode(QUERY).await.unwrap().unwrap();

        assert_eq!(coordinate, Coordinate::new(35.30, -119.05));
    }

    #[tokio::test]
    async fn test_http_failure_through_reqwest() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Not Authorized"))
            .mount(&server)
            .await;

        let provider = MapboxProvider::with_base_url(HttpClient::new(), "bad", server.uri());
        let err = provider.geocode(QUERY).await.unwrap_err();

        assert!(err.to_string().contains("401"));
    }
}
