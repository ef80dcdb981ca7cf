//! Geocode cache API types

use serde::Serialize;

/// Response of a cache clear
#[derive(Debug, Clone, Serialize)]
pub struct CacheClearedResponse {
    /// Entries held before the clear
    pub cleared: usize,
}
