//! Infrastructure layer - External service implementations

pub mod batch;
pub mod cache;
pub mod geocoding;
pub mod job;
pub mod logging;
pub mod observability;
pub mod records;
pub mod render;
pub mod services;
