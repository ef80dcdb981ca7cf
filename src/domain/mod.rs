//! Domain layer - Core business logic and entities

pub mod address;
pub mod batch;
pub mod error;
pub mod geocoding;
pub mod job;
pub mod matching;
pub mod render;

pub use address::{AddressKey, AddressKeyFormat, AddressRecord, Coordinate};
pub use batch::{
    BatchOptions, BatchOutcome, CancelSignal, ClientLimit, ListKind, Progress, ProgressReporter,
    SkipReason, SkipRecord,
};
pub use error::DomainError;
pub use geocoding::{GeocodeCache, GeocodingProvider};
pub use job::{Job, JobError, JobId, JobRepository, JobStatus};
pub use matching::{geodesic_miles, ProximityMatcher};
pub use render::{MailerDocument, MailerRenderer, RenderedMailer};
