use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::http_client::HttpClient;
use super::{MapboxProvider, TomTomProvider};
use crate::domain::{DomainError, GeocodingProvider};

/// Which geocoding backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GeocodingProviderKind {
    #[default]
    Mapbox,
    #[serde(rename = "tomtom")]
    TomTom,
}

impl GeocodingProviderKind {
    /// Environment variable consulted when no API key is configured
    pub fn credential_env_var(&self) -> &'static str {
        match self {
            Self::Mapbox => "MAPBOX_TOKEN",
            Self::TomTom => "TOMTOM_API_KEY",
        }
    }
}

impl fmt::Display for GeocodingProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mapbox => write!(f, "mapbox"),
            Self::TomTom => write!(f, "tomtom"),
        }
    }
}

impl FromStr for GeocodingProviderKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mapbox" => Ok(Self::Mapbox),
            "tomtom" => Ok(Self::TomTom),
            other => Err(DomainError::configuration(format!(
                "Unknown geocoding provider '{}': expected mapbox or tomtom",
                other
            ))),
        }
    }
}

/// Everything needed to build a provider
#[derive(Debug, Clone)]
pub struct GeocodingProviderSettings {
    pub kind: GeocodingProviderKind,
    pub api_key: Option<String>,
    pub timeout: Duration,
    pub base_url: Option<String>,
}

impl GeocodingProviderSettings {
    pub fn new(kind: GeocodingProviderKind) -> Self {
        Self {
            kind,
            api_key: None,
            timeout: Duration::from_secs(10),
            base_url: None,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Configured key, else the provider's environment variable
    pub fn resolve_api_key(&self) -> Result<String, DomainError> {
        self.resolve_api_key_with(|name| std::env::var(name).ok())
    }

    fn resolve_api_key_with<F>(&self, lookup: F) -> Result<String, DomainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.api_key
            .clone()
            .or_else(|| lookup(self.kind.credential_env_var()))
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                DomainError::credential(format!(
                    "No {} API key configured (set geocoding.api_key or {})",
                    self.kind,
                    self.kind.credential_env_var()
                ))
            })
    }
}

/// Factory for creating geocoding providers
#[derive(Debug)]
pub struct GeocodingProviderFactory;

impl GeocodingProviderFactory {
    /// Create a provider from settings; fails when no credential is available
    pub fn create(
        settings: &GeocodingProviderSettings,
    ) -> Result<Arc<dyn GeocodingProvider>, DomainError> {
        let api_key = settings.resolve_api_key()?;
        Self::create_with_key(settings, api_key)
    }

    fn create_with_key(
        settings: &GeocodingProviderSettings,
        api_key: String,
    ) -> Result<Arc<dyn GeocodingProvider>, DomainError> {
        let http_client = HttpClient::with_timeout(settings.timeout)?;

        match (settings.kind, settings.base_url.as_deref()) {
            (GeocodingProviderKind::Mapbox, None) => {
                Ok(Arc::new(MapboxProvider::new(http_client, api_key)))
            }
            (GeocodingProviderKind::Mapbox, Some(base_url)) => Ok(Arc::new(
                MapboxProvider::with_base_url(http_client, api_key, base_url),
            )),
            (GeocodingProviderKind::TomTom, None) => {
                Ok(Arc::new(TomTomProvider::new(http_client, api_key)))
            }
            (GeocodingProviderKind::TomTom, Some(base_url)) => Ok(Arc::new(
                TomTomProvider::with_base_url(http_client, api_key, base_url),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parsing() {
        assert_eq!(
            "TomTom".parse::<GeocodingProviderKind>().unwrap(),
            GeocodingProviderKind::TomTom
        );
        assert_eq!(
            "mapbox".parse::<GeocodingProviderKind>().unwrap(),
            GeocodingProviderKind::Mapbox
        );
        assert!("google".parse::<GeocodingProviderKind>().is_err());
    }

    #[test]
    fn test_kind_deserializes_lowercase() {
        let kind: GeocodingProviderKind = serde_json::from_str("\"tomtom\"").unwrap();
        assert_eq!(kind, GeocodingProviderKind::TomTom);
    }

    #[test]
    fn test_explicit_key_wins() {
        let settings =
            GeocodingProviderSettings::new(GeocodingProviderKind::Mapbox).with_api_key(" pk.1 ");
        let key = settings
            .resolve_api_key_with(|_| Some("from-env".to_string()))
            .unwrap();
        assert_eq!(key, "pk.1");
    }

    #[test]
    fn test_env_fallback_uses_provider_variable() {
        let settings = GeocodingProviderSettings::new(GeocodingProviderKind::TomTom);
        let key = settings
            .resolve_api_key_with(|name| (name == "TOMTOM_API_KEY").then(|| "tt".to_string()))
            .unwrap();
        assert_eq!(key, "tt");
    }

    #[test]
    fn test_missing_key_is_credential_error() {
        let settings =
            GeocodingProviderSettings::new(GeocodingProviderKind::Mapbox).with_api_key("  ");
        let err = settings.resolve_api_key_with(|_| None).unwrap_err();
        assert!(matches!(err, DomainError::Credential { .. }));
        assert!(err.to_string().contains("MAPBOX_TOKEN"));
    }

    #[test]
    fn test_create_selects_backend() {
        let settings = GeocodingProviderSettings::new(GeocodingProviderKind::TomTom)
            .with_api_key("tt")
            .with_base_url("http://localhost:9999");
        let provider = GeocodingProviderFactory::create(&settings).unwrap();
        assert_eq!(provider.provider_name(), "tomtom");

        let settings =
            GeocodingProviderSettings::new(GeocodingProviderKind::Mapbox).with_api_key("pk");
        let provider = GeocodingProviderFactory::create(&settings).unwrap();
        assert_eq!(provider.provider_name(), "mapbox");
    }
}
