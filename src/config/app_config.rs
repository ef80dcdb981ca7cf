use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::domain::address::{DEFAULT_CITY, DEFAULT_STATE};
use crate::domain::matching::{DEFAULT_MIN_DISTANCE_MILES, DEFAULT_NUM_NEARBY};
use crate::domain::{AddressKeyFormat, BatchOptions};
use crate::infrastructure::cache::GeocodeCacheConfig;
use crate::infrastructure::geocoding::{GeocodingProviderKind, GeocodingProviderSettings};
use crate::infrastructure::render::DEFAULT_BRAND;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub geocoding: GeocodingConfig,
    pub mailer: MailerConfig,
    pub jobs: JobsConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    pub provider: GeocodingProviderKind,
    /// Falls back to `MAPBOX_TOKEN` / `TOMTOM_API_KEY` when unset
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub cache_path: PathBuf,
    pub default_city: String,
    pub state: String,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MailerConfig {
    pub output_dir: PathBuf,
    pub num_nearby: usize,
    pub min_distance_miles: f64,
    pub brand: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JobsConfig {
    pub retention_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_upload_bytes: 50 * 1024 * 1024,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            provider: GeocodingProviderKind::default(),
            api_key: None,
            timeout_secs: 10,
            cache_path: PathBuf::from("geocoding_cache.json"),
            default_city: DEFAULT_CITY.to_string(),
            state: DEFAULT_STATE.to_string(),
            base_url: None,
        }
    }
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            num_nearby: DEFAULT_NUM_NEARBY,
            min_distance_miles: DEFAULT_MIN_DISTANCE_MILES,
            brand: DEFAULT_BRAND.to_string(),
        }
    }
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            retention_secs: 3600,
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/metrics".to_string(),
        }
    }
}

impl GeocodingConfig {
    /// Provider settings, with `api_key` taking precedence over the configured one
    pub fn provider_settings(&self, api_key: Option<&str>) -> GeocodingProviderSettings {
        let mut settings = GeocodingProviderSettings::new(self.provider)
            .with_timeout(Duration::from_secs(self.timeout_secs));

        if let Some(key) = api_key.map(str::to_string).or_else(|| self.api_key.clone()) {
            settings = settings.with_api_key(key);
        }
        if let Some(base_url) = &self.base_url {
            settings = settings.with_base_url(base_url.clone());
        }

        settings
    }

    pub fn key_format(&self) -> AddressKeyFormat {
        AddressKeyFormat::new(&self.default_city, &self.state)
    }

    pub fn cache_config(&self) -> GeocodeCacheConfig {
        GeocodeCacheConfig::JsonFile(self.cache_path.clone())
    }
}

impl MailerConfig {
    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions::default()
            .with_num_nearby(self.num_nearby)
            .with_min_distance(self.min_distance_miles)
    }
}

impl JobsConfig {
    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_secs)
    }
}

impl AppConfig {
    /// Defaults, then `config/default.*` and `config/local.*`, then `APP__*` variables
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
