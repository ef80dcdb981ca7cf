//! Batch execution - the orchestrator, progress sinks and result archive

mod archive;
mod orchestrator;
mod progress;

pub use archive::{write_archive, ARCHIVE_FILE};
pub use orchestrator::{BatchOrchestrator, BatchRequest};
pub use progress::{LogProgress, WatchProgress};
