use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::address::{AddressKey, Coordinate};
use crate::domain::DomainError;

/// Durable mapping from address key to coordinate
///
/// Entries never expire during the process lifetime. Lookups are pure reads;
/// `store` is an idempotent upsert whose persistence may be deferred but must
/// survive a normal process exit.
#[async_trait]
pub trait GeocodeCache: Send + Sync + Debug {
    /// Returns the cached coordinate for a key
    async fn lookup(&self, key: &AddressKey) -> Option<Coordinate>;

    /// Inserts or replaces the coordinate for a key
    async fn store(&self, key: &AddressKey, coordinate: Coordinate) -> Result<(), DomainError>;

    /// Forces pending writes to the backing store
    async fn flush(&self) -> Result<(), DomainError> {
        Ok(())
    }

    /// Drops every entry, including the persisted copy
    async fn clear(&self) -> Result<(), DomainError>;

    /// Number of cached addresses
    async fn len(&self) -> usize;

    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
