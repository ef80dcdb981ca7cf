use std::path::{Path, PathBuf};

use tracing::info;

use crate::domain::{DomainError, SkipRecord};

pub const SKIP_REPORT_FILE: &str = "skipped_addresses.csv";

/// Write `skipped_addresses.csv` into `dir`
///
/// Returns `None` without touching the filesystem when nothing was skipped.
pub async fn write_skip_report(
    dir: &Path,
    skipped: &[SkipRecord],
) -> Result<Option<PathBuf>, DomainError> {
    if skipped.is_empty() {
        return Ok(None);
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in skipped {
        writer
            .serialize(record)
            .map_err(|e| DomainError::storage(format!("Failed to encode skip report: {}", e)))?;
    }
    let body = writer
        .into_inner()
        .map_err(|e| DomainError::storage(format!("Failed to encode skip report: {}", e)))?;

    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(SKIP_REPORT_FILE);
    tokio::fs::write(&path, body).await?;

    info!(path = %path.display(), skipped = skipped.len(), "Skip report written");
    Ok(Some(path))
}

/// Read a skip report back, e.g. to serve it as JSON
pub async fn read_skip_report(path: &Path) -> Result<Vec<SkipRecord>, DomainError> {
    let bytes = tokio::fs::read(path).await?;
    let mut reader = csv::Reader::from_reader(bytes.as_slice());

    reader
        .deserialize()
        .collect::<Result<Vec<SkipRecord>, _>>()
        .map_err(|e| DomainError::storage(format!("Invalid skip report {}: {}", path.display(), e)))
}
