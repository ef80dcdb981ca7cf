use tokio::sync::watch;
use tracing::{debug, info};

use crate::domain::batch::{BatchPhase, Progress, ProgressReporter};

/// Publishes the latest progress on a watch channel
///
/// Readers only ever see the newest value; intermediate updates may be
/// skipped, which is what a polling HTTP client wants.
#[derive(Debug)]
pub struct WatchProgress {
    sender: watch::Sender<Progress>,
}

impl WatchProgress {
    pub fn channel() -> (Self, watch::Receiver<Progress>) {
        let (sender, receiver) = watch::channel(Progress::default());
        (Self { sender }, receiver)
    }
}

impl ProgressReporter for WatchProgress {
    fn report(&self, progress: Progress) {
        // No receivers left is fine; the job was dropped
        self.sender.send_replace(progress);
    }
}

/// Writes progress to the log, phase changes at info and steps at debug
#[derive(Debug, Default)]
pub struct LogProgress {
    last_phase: std::sync::Mutex<Option<BatchPhase>>,
}

impl LogProgress {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressReporter for LogProgress {
    fn report(&self, progress: Progress) {
        let phase_changed = match self.last_phase.lock() {
            Ok(mut last) => last.replace(progress.phase) != Some(progress.phase),
            Err(_) => true,
        };

        if phase_changed || progress.current == progress.total {
            info!(
                phase = %progress.phase,
                current = progress.current,
                total = progress.total,
                "{}",
                progress.message
            );
        } else {
            debug!(
                phase = %progress.phase,
                current = progress.current,
                total = progress.total,
                "{}",
                progress.message
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_watch_keeps_latest() {
        let (reporter, mut receiver) = WatchProgress::channel();

        reporter.report(Progress::new(BatchPhase::Loading, 0, 1, "Loading CSV data..."));
        reporter.report(Progress::new(BatchPhase::GeocodingClients, 1, 7, "Geocoding client 1/2"));

        assert!(receiver.has_changed().unwrap());
        let latest = receiver.borrow_and_update().clone();
        assert_eq!(latest.current, 1);
        assert_eq!(latest.total, 7);
        assert_eq!(latest.message, "Geocoding client 1/2");
    }

    #[test]
    fn test_watch_without_receivers_does_not_panic() {
        let (reporter, receiver) = WatchProgress::channel();
        drop(receiver);
        reporter.report(Progress::new(BatchPhase::Done, 1, 1, "Complete!"));
    }

    #[test]
    fn test_log_progress_tracks_phase() {
        let reporter = LogProgress::new();
        reporter.report(Progress::new(BatchPhase::Loading, 0, 1, "Loading CSV data..."));
        reporter.report(Progress::new(BatchPhase::Loading, 0, 1, "Loading CSV data..."));
        assert_eq!(*reporter.last_phase.lock().unwrap(), Some(BatchPhase::Loading));
    }
}
