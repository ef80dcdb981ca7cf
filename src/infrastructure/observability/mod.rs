//! Observability infrastructure - Prometheus metrics

mod metrics;

pub use self::metrics::{
    create_metrics_router, init_metrics, record_batch_run, record_geocode_lookup,
    record_http_request, PrometheusMetrics,
};
