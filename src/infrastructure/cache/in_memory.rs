use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{AddressKey, Coordinate, DomainError, GeocodeCache};

/// Process-local geocode cache, used for `--no-cache` runs and tests
#[derive(Debug, Default)]
pub struct InMemoryGeocodeCache {
    entries: RwLock<HashMap<AddressKey, Coordinate>>,
}

impl InMemoryGeocodeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache pre-populated with the given entries
    pub fn with_entries(entries: impl IntoIterator<Item = (AddressKey, Coordinate)>) -> Self {
        Self {
            entries: RwLock::new(entries.into_iter().collect()),
        }
    }
}

#[async_trait]
impl GeocodeCache for InMemoryGeocodeCache {
    async fn lookup(&self, key: &AddressKey) -> Option<Coordinate> {
        self.entries.read().await.get(key).copied()
    }

    async fn store(&self, key: &AddressKey, coordinate: Coordinate) -> Result<(), DomainError> {
        self.entries.write().await.insert(key.clone(), coordinate);
        Ok(())
    }

    async fn clear(&self) -> Result<(), DomainError> {
        self.entries.write().await.clear();
        Ok(())
    }

    async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_and_lookup() {
        let cache = InMemoryGeocodeCache::new();
        let key = AddressKey::new("1 Main St, Bakersfield, CA 93301");

        assert!(cache.lookup(&key).await.is_none());
        cache.store(&key, Coordinate::new(35.0, -119.0)).await.unwrap();
        cache.store(&key, Coordinate::new(35.1, -119.1)).await.unwrap();

        assert_eq!(cache.lookup(&key).await, Some(Coordinate::new(35.1, -119.1)));
        assert_eq!(cache.len().await, 1);

        cache.clear().await.unwrap();
        assert!(cache.is_empty().await);
    }
}
