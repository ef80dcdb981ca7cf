//! Geocoding infrastructure - HTTP providers and the cache-first client

mod client;
mod factory;
mod http_client;
mod mapbox;
mod tomtom;
mod url;

pub use client::{GeocodingClient, Lookup};
pub use factory::{GeocodingProviderFactory, GeocodingProviderKind, GeocodingProviderSettings};
pub use http_client::{HttpClient, HttpClientTrait};
pub use mapbox::MapboxProvider;
pub use tomtom::TomTomProvider;
