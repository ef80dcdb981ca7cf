//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, GeocodingConfig, JobsConfig, LogFormat, LoggingConfig, MailerConfig, MetricsConfig,
    ServerConfig,
};
