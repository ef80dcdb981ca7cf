//! Application state for shared services

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::domain::{AddressKeyFormat, BatchOptions, DomainError, GeocodeCache, GeocodingProvider};
use crate::infrastructure::geocoding::GeocodingProviderFactory;
use crate::infrastructure::services::JobServiceTrait;

/// Builds a provider for one job, given the key submitted with it (if any)
pub type ProviderBuilder = Arc<
    dyn Fn(Option<&str>) -> Result<Arc<dyn GeocodingProvider>, DomainError> + Send + Sync,
>;

/// Per-job defaults taken from configuration
#[derive(Debug, Clone)]
pub struct MailerSettings {
    /// Each job gets its own directory below this one
    pub work_root: PathBuf,
    pub key_format: AddressKeyFormat,
    pub batch_options: BatchOptions,
    pub brand: String,
}

impl MailerSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            work_root: config.mailer.output_dir.join("jobs"),
            key_format: config.geocoding.key_format(),
            batch_options: config.mailer.batch_options(),
            brand: config.mailer.brand.clone(),
        }
    }
}

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub job_service: Arc<dyn JobServiceTrait>,
    /// Shared by every job so concurrent runs serialize their cache writes
    pub geocode_cache: Arc<dyn GeocodeCache>,
    pub provider_builder: ProviderBuilder,
    pub settings: Arc<MailerSettings>,
}

impl AppState {
    pub fn new(
        job_service: Arc<dyn JobServiceTrait>,
        geocode_cache: Arc<dyn GeocodeCache>,
        config: &AppConfig,
    ) -> Self {
        let geocoding = config.geocoding.clone();
        let provider_builder: ProviderBuilder = Arc::new(move |api_key| {
            GeocodingProviderFactory::create(&geocoding.provider_settings(api_key))
        });

        Self {
            job_service,
            geocode_cache,
            provider_builder,
            settings: Arc::new(MailerSettings::from_config(config)),
        }
    }

    pub fn with_provider_builder(mut self, provider_builder: ProviderBuilder) -> Self {
        self.provider_builder = provider_builder;
        self
    }

    pub fn with_settings(mut self, settings: MailerSettings) -> Self {
        self.settings = Arc::new(settings);
        self
    }

    pub fn build_provider(
        &self,
        api_key: Option<&str>,
    ) -> Result<Arc<dyn GeocodingProvider>, DomainError> {
        (self.provider_builder)(api_key)
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("job_service", &self.job_service)
            .field("geocode_cache", &self.geocode_cache)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
