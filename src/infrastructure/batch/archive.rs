use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::domain::DomainError;
use crate::infrastructure::records::SKIP_REPORT_FILE;
use crate::infrastructure::render::{INDIVIDUAL_DIR, MERGED_FILE};

pub const ARCHIVE_FILE: &str = "mailers.zip";

/// Zip a run's output directory: `individual/*`, the merged file and the skip report
pub async fn write_archive(output_dir: &Path, archive_path: &Path) -> Result<PathBuf, DomainError> {
    let output_dir = output_dir.to_path_buf();
    let archive_path = archive_path.to_path_buf();

    tokio::task::spawn_blocking(move || build_archive(&output_dir, &archive_path))
        .await
        .map_err(|e| DomainError::internal(format!("Archive task failed: {}", e)))?
}

fn build_archive(output_dir: &Path, archive_path: &Path) -> Result<PathBuf, DomainError> {
    let mut entries: Vec<(String, PathBuf)> = Vec::new();

    let individual = output_dir.join(INDIVIDUAL_DIR);
    if individual.is_dir() {
        let mut files: Vec<PathBuf> = std::fs::read_dir(&individual)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file())
            .collect();
        files.sort();

        for path in files {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                entries.push((format!("{}/{}", INDIVIDUAL_DIR, name), path.clone()));
            }
        }
    }

    for name in [MERGED_FILE, SKIP_REPORT_FILE] {
        let path = output_dir.join(name);
        if path.is_file() {
            entries.push((name.to_string(), path));
        }
    }

    let file = File::create(archive_path)?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, path) in &entries {
        writer.start_file(name.as_str(), options).map_err(zip_error)?;
        let mut source = File::open(path)?;
        io::copy(&mut source, &mut writer)?;
    }

    writer.finish().map_err(zip_error)?;
    debug!(path = %archive_path.display(), entries = entries.len(), "Archive written");

    Ok(archive_path.to_path_buf())
}

fn zip_error(err: zip::result::ZipError) -> DomainError {
    DomainError::storage(format!("Failed to write archive: {}", err))
}
