use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::{AddressKey, Coordinate, DomainError, GeocodeCache};

/// Geocode cache persisted as one JSON object of `"address key": [lat, lon]`
///
/// The whole map lives in memory behind a mutex owned by this instance. Every
/// store rewrites the file while still holding the lock, going through a
/// sibling temp file and a rename so readers never observe a partial file.
#[derive(Debug)]
pub struct JsonFileGeocodeCache {
    path: PathBuf,
    entries: Mutex<BTreeMap<AddressKey, Coordinate>>,
    /// Memory holds entries the file does not; only changed under `entries`
    dirty: AtomicBool,
}

impl JsonFileGeocodeCache {
    /// Load the cache file, starting cold when it is missing or unreadable
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = load_entries(&path).await;

        info!(path = %path.display(), entries = entries.len(), "Geocode cache loaded");

        Self {
            path,
            entries: Mutex::new(entries),
            dirty: AtomicBool::new(false),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| "geocoding_cache.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    async fn persist(&self, entries: &BTreeMap<AddressKey, Coordinate>) -> Result<(), DomainError> {
        let body = serde_json::to_vec(entries)
            .map_err(|e| DomainError::cache(format!("Failed to serialize geocode cache: {}", e)))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let temp = self.temp_path();
        tokio::fs::write(&temp, &body).await.map_err(|e| {
            DomainError::cache(format!("Failed to write {}: {}", temp.display(), e))
        })?;
        tokio::fs::rename(&temp, &self.path).await.map_err(|e| {
            DomainError::cache(format!("Failed to replace {}: {}", self.path.display(), e))
        })?;

        debug!(path = %self.path.display(), entries = entries.len(), "Geocode cache written");
        Ok(())
    }

    /// Persist and remember whether the file is behind memory
    async fn write_back(&self, entries: &BTreeMap<AddressKey, Coordinate>) -> Result<(), DomainError> {
        let result = self.persist(entries).await;
        self.dirty.store(result.is_err(), Ordering::Release);
        result
    }
}

async fn load_entries(path: &Path) -> BTreeMap<AddressKey, Coordinate> {
    let raw = match tokio::fs::read(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return BTreeMap::new(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Geocode cache unreadable, starting empty");
            return BTreeMap::new();
        }
    };

    let object: serde_json::Map<String, serde_json::Value> = match serde_json::from_slice(&raw) {
        Ok(object) => object,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Geocode cache corrupt, starting empty");
            return BTreeMap::new();
        }
    };

    let total = object.len();
    let entries: BTreeMap<AddressKey, Coordinate> = object
        .into_iter()
        .filter_map(|(key, value)| {
            serde_json::from_value::<Coordinate>(value)
                .ok()
                .map(|coordinate| (AddressKey::new(key), coordinate))
        })
        .collect();

    if entries.len() < total {
        warn!(
            path = %path.display(),
            dropped = total - entries.len(),
            "Ignored malformed geocode cache entries"
        );
    }

    entries
}

#[async_trait]
impl GeocodeCache for JsonFileGeocodeCache {
    async fn lookup(&self, key: &AddressKey) -> Option<Coordinate> {
        self.entries.lock().await.get(key).copied()
    }

    async fn store(&self, key: &AddressKey, coordinate: Coordinate) -> Result<(), DomainError> {
        let mut entries = self.entries.lock().await;
        if entries.get(key) == Some(&coordinate) && !self.dirty.load(Ordering::Acquire) {
            return Ok(());
        }

        entries.insert(key.clone(), coordinate);
        self.write_back(&entries).await
    }

    async fn flush(&self) -> Result<(), DomainError> {
        let entries = self.entries.lock().await;
        self.write_back(&entries).await
    }

    async fn clear(&self) -> Result<(), DomainError> {
        let mut entries = self.entries.lock().await;
        entries.clear();

        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                return Err(DomainError::cache(format!(
                    "Failed to remove {}: {}",
                    self.path.display(),
                    e
                )));
            }
        }

        self.dirty.store(false, Ordering::Release);
        info!(path = %self.path.display(), "Geocode cache cleared");
        Ok(())
    }

    async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}
