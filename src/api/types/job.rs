//! Job API types

use serde::Serialize;

use crate::domain::{Job, JobStatus, SkipRecord};

/// Response when a job is accepted (HTTP 202)
#[derive(Debug, Clone, Serialize)]
pub struct JobCreated {
    pub job_id: String,
}

/// Polling view of a job
#[derive(Debug, Clone, Serialize)]
pub struct JobStatusResponse {
    pub status: JobStatus,
    pub progress: usize,
    pub total: usize,
    pub message: String,
    /// Mailers produced by the run
    pub pdf_count: usize,
    pub skipped_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl From<&Job> for JobStatusResponse {
    fn from(job: &Job) -> Self {
        Self {
            status: job.status(),
            progress: job.progress().current,
            total: job.progress().total,
            message: job.progress().message.clone(),
            pdf_count: job.produced_count(),
            skipped_count: job.skipped_count(),
            error: job.error().map(String::from),
            error_detail: job.error_detail().map(String::from),
        }
    }
}

impl From<Job> for JobStatusResponse {
    fn from(job: Job) -> Self {
        JobStatusResponse::from(&job)
    }
}

/// Rows of a job's skip report
#[derive(Debug, Clone, Serialize)]
pub struct SkippedResponse {
    pub total: usize,
    pub skipped: Vec<SkipRecord>,
}

impl From<Vec<SkipRecord>> for SkippedResponse {
    fn from(skipped: Vec<SkipRecord>) -> Self {
        Self {
            total: skipped.len(),
            skipped,
        }
    }
}
