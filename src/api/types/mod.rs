//! API request and response types

pub mod cache;
pub mod error;
pub mod job;

pub use cache::CacheClearedResponse;
pub use error::{ApiError, ApiErrorDetail, ApiErrorResponse, ApiErrorType};
pub use job::{JobCreated, JobStatusResponse, SkippedResponse};
