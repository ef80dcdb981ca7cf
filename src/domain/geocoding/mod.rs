//! Geocoding domain - provider capability and the address cache contract

mod cache;
mod provider;

pub use cache::GeocodeCache;
pub use provider::GeocodingProvider;

#[cfg(test)]
pub use provider::mock::MockGeocodingProvider;
