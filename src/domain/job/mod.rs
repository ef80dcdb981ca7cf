//! Job domain module for background batch runs

mod entity;
mod error;
pub mod repository;

pub use entity::{validate_job_id, Job, JobId, JobStatus, MAX_ID_LENGTH};
pub use error::JobError;
pub use repository::JobRepository;

#[cfg(test)]
pub use repository::MockJobRepository;
