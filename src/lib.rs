//! Sold-comps mailer
//!
//! Geocodes a client list and a list of recent sales, ranks the closest sales
//! for every client and renders one mailer per client:
//! - Pluggable geocoding providers (Mapbox, TomTom) behind a persistent cache
//! - Batch runs from the command line or as background HTTP jobs

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use infrastructure::cache::open_geocode_cache;
use infrastructure::job::InMemoryJobRepository;
use infrastructure::services::{JobService, JobServiceConfig};

/// Build application state from configuration
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let job_service = JobService::with_config(
        Arc::new(InMemoryJobRepository::new()),
        JobServiceConfig::with_retention(config.jobs.retention()),
    );
    let geocode_cache = open_geocode_cache(&config.geocoding.cache_config()).await;

    tokio::fs::create_dir_all(&config.mailer.output_dir).await?;

    Ok(AppState::new(Arc::new(job_service), geocode_cache, config))
}
