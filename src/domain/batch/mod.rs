//! Batch domain - options, progress, skips and the outcome of one run

mod cancel;
mod options;
mod outcome;
mod progress;
mod skip;

pub use cancel::CancelSignal;
pub use options::{BatchOptions, ClientLimit};
pub use outcome::{BatchOutcome, BatchStats, ClientMatch, NearbySale};
pub use progress::{BatchPhase, NoopProgress, Progress, ProgressReporter};
pub use skip::{ListKind, SkipReason, SkipRecord};
