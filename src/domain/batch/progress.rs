use std::fmt;

use serde::{Deserialize, Serialize};

/// Stage of a batch run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BatchPhase {
    #[default]
    Loading,
    GeocodingClients,
    GeocodingSold,
    Matching,
    Merging,
    Done,
    Failed,
}

impl fmt::Display for BatchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loading => write!(f, "loading"),
            Self::GeocodingClients => write!(f, "geocoding_clients"),
            Self::GeocodingSold => write!(f, "geocoding_sold"),
            Self::Matching => write!(f, "matching"),
            Self::Merging => write!(f, "merging"),
            Self::Done => write!(f, "done"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Snapshot of how far a run has come
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Progress {
    pub phase: BatchPhase,
    pub current: usize,
    pub total: usize,
    pub message: String,
}

impl Progress {
    pub fn new(
        phase: BatchPhase,
        current: usize,
        total: usize,
        message: impl Into<String>,
    ) -> Self {
        Self {
            phase,
            current,
            total,
            message: message.into(),
        }
    }
}

/// Sink for progress updates
///
/// Called from whichever task performs the work; consumers read the state
/// from elsewhere, so implementations must be thread-safe.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, progress: Progress);
}

impl<F> ProgressReporter for F
where
    F: Fn(Progress) + Send + Sync,
{
    fn report(&self, progress: Progress) {
        self(progress)
    }
}

/// Discards every update
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn report(&self, _progress: Progress) {}
}
