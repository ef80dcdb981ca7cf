use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::address::Coordinate;
use crate::domain::DomainError;

/// Trait for geocoding backends (Mapbox, TomTom, ...)
///
/// Each backend owns its request shaping and its response field mapping,
/// including the coordinate order of the payload.
#[async_trait]
pub trait GeocodingProvider: Send + Sync + Debug {
    /// Resolve a free-form address
    ///
    /// `Ok(None)` means the provider answered but had no result for the query.
    async fn geocode(&self, query: &str) -> Result<Option<Coordinate>, DomainError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;

    /// Static map image showing `center` and the given markers, if the
    /// provider offers one
    fn static_map_url(&self, _center: Coordinate, _markers: &[Coordinate]) -> Option<String> {
        None
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Debug)]
    pub struct MockGeocodingProvider {
        name: &'static str,
        responses: Mutex<HashMap<String, Coordinate>>,
        errors: Mutex<HashMap<String, String>>,
        calls: Mutex<Vec<String>>,
    }

    impl MockGeocodingProvider {
        pub fn new(name: &'static str) -> Self {
            Self {
                name,
                responses: Mutex::new(HashMap::new()),
                errors: Mutex::new(HashMap::new()),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn with_response(self, query: impl Into<String>, coordinate: Coordinate) -> Self {
            self.responses
                .lock()
                .unwrap()
                .insert(query.into(), coordinate);
            self
        }

        pub fn with_error(self, query: impl Into<String>, error: impl Into<String>) -> Self {
            self.errors.lock().unwrap().insert(query.into(), error.into());
            self
        }

        /// Number of provider round-trips made so far
        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl GeocodingProvider for MockGeocodingProvider {
        async fn geocode(&self, query: &str) -> Result<Option<Coordinate>, DomainError> {
            self.calls.lock().unwrap().push(query.to_string());

            if let Some(error) = self.errors.lock().unwrap().get(query) {
                return Err(DomainError::provider(self.name, error));
            }

            Ok(self.responses.lock().unwrap().get(query).copied())
        }

        fn provider_name(&self) -> &'static str {
            self.name
        }

        fn static_map_url(&self, center: Coordinate, markers: &[Coordinate]) -> Option<String> {
            Some(format!(
                "mock://map/{},{}?markers={}",
                center.lat,
                center.lon,
                markers.len()
            ))
        }
    }
}
