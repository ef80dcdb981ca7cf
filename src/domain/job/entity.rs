//! Job domain entities

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::error::JobError;
use crate::domain::batch::Progress;

/// Regex pattern for valid job IDs: job-{uuid}
static ID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^job-[a-f0-9]{8}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{12}$")
        .expect("job id pattern is valid")
});

/// Maximum length for job IDs
pub const MAX_ID_LENGTH: usize = 40; // "job-" + 36 char UUID

/// Validated job identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct JobId(String);

impl JobId {
    /// Create a new validated job ID
    pub fn new(id: impl Into<String>) -> Result<Self, JobError> {
        let id = id.into();
        validate_job_id(&id)?;
        Ok(Self(id))
    }

    /// Generate a new job ID with UUID
    pub fn generate() -> Self {
        Self(format!("job-{}", uuid::Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for JobId {
    type Error = JobError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<JobId> for String {
    fn from(id: JobId) -> Self {
        id.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validate a job ID string
pub fn validate_job_id(id: &str) -> Result<(), JobError> {
    if id.is_empty() {
        return Err(JobError::invalid_id("Job ID cannot be empty"));
    }

    if id.len() > MAX_ID_LENGTH {
        return Err(JobError::invalid_id(format!(
            "Job ID exceeds maximum length of {} characters",
            MAX_ID_LENGTH
        )));
    }

    if !ID_PATTERN.is_match(id) {
        return Err(JobError::invalid_id(format!(
            "Invalid job ID '{}': must be in format job-{{uuid}}",
            id
        )));
    }

    Ok(())
}

/// Status of a background batch job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    Queued,
    Running,
    Done,
    Failed,
    Cancelled,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed | Self::Cancelled)
    }

    pub fn can_transition_to(&self, target: JobStatus) -> bool {
        matches!(
            (self, target),
            (Self::Queued, Self::Running)
                | (Self::Queued, Self::Failed)
                | (Self::Queued, Self::Cancelled)
                | (Self::Running, Self::Done)
                | (Self::Running, Self::Failed)
                | (Self::Running, Self::Cancelled)
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Queued => write!(f, "queued"),
            Self::Running => write!(f, "running"),
            Self::Done => write!(f, "done"),
            Self::Failed => write!(f, "failed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A batch run submitted through the web front end
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    id: JobId,
    status: JobStatus,
    progress: Progress,
    produced_count: usize,
    skipped_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_detail: Option<String>,
    /// Scratch directory holding uploads and output
    work_dir: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    archive_path: Option<PathBuf>,
    created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    finished_at: Option<DateTime<Utc>>,
}

impl Job {
    /// Create a new queued job
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self::with_id(JobId::generate(), work_dir)
    }

    pub fn with_id(id: JobId, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            id,
            status: JobStatus::Queued,
            progress: Progress {
                total: 1,
                message: "Job queued...".to_string(),
                ..Progress::default()
            },
            produced_count: 0,
            skipped_count: 0,
            error: None,
            error_detail: None,
            work_dir: work_dir.into(),
            archive_path: None,
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
        }
    }

    pub fn id(&self) -> &JobId {
        &self.id
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn produced_count(&self) -> usize {
        self.produced_count
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped_count
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn error_detail(&self) -> Option<&str> {
        self.error_detail.as_deref()
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn archive_path(&self) -> Option<&Path> {
        self.archive_path.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Record a progress update; ignored once the job has finished
    pub fn update_progress(&mut self, progress: Progress) {
        if !self.is_terminal() {
            self.progress = progress;
        }
    }

    pub fn mark_running(&mut self) -> Result<(), JobError> {
        self.transition(JobStatus::Running)?;
        self.progress.message = "Starting generation...".to_string();
        self.started_at = Some(Utc::now());
        Ok(())
    }

    pub fn mark_done(
        &mut self,
        produced_count: usize,
        skipped_count: usize,
        archive_path: Option<PathBuf>,
    ) -> Result<(), JobError> {
        self.transition(JobStatus::Done)?;
        self.produced_count = produced_count;
        self.skipped_count = skipped_count;
        self.archive_path = archive_path;
        self.progress.current = self.progress.total;
        self.progress.message = format!("Done! Generated {} mailers.", produced_count);
        self.finished_at = Some(Utc::now());
        Ok(())
    }

    pub fn mark_failed(
        &mut self,
        error: impl Into<String>,
        detail: Option<String>,
    ) -> Result<(), JobError> {
        self.transition(JobStatus::Failed)?;
        let error = error.into();
        self.progress.message = error.clone();
        self.error = Some(error);
        self.error_detail = detail;
        self.finished_at = Some(Utc::now());
        Ok(())
    }

    pub fn mark_cancelled(&mut self) -> Result<(), JobError> {
        if !self.status.can_transition_to(JobStatus::Cancelled) {
            return Err(JobError::cannot_cancel(format!(
                "Job in '{}' state cannot be cancelled",
                self.status
            )));
        }
        self.status = JobStatus::Cancelled;
        self.progress.message = "Cancelled".to_string();
        self.finished_at = Some(Utc::now());
        Ok(())
    }

    fn transition(&mut self, target: JobStatus) -> Result<(), JobError> {
        if !self.status.can_transition_to(target) {
            return Err(JobError::invalid_transition(
                &self.status.to_string(),
                &target.to_string(),
                format!("Job is '{}'", self.status),
            ));
        }
        self.status = target;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::batch::BatchPhase;

    #[test]
    fn test_job_id_generate() {
        let id = JobId::generate();
        assert!(id.as_str().starts_with("job-"));
        assert_eq!(id.as_str().len(), MAX_ID_LENGTH);
        assert!(JobId::new(id.as_str()).is_ok());
    }

    #[test]
    fn test_job_id_invalid() {
        assert!(JobId::new("").is_err());
        assert!(JobId::new("job-nope").is_err());
        assert!(JobId::new("op-12345678-1234-1234-1234-123456789abc").is_err());
        assert!(JobId::new("12345678-1234-1234-1234-123456789abc").is_err());
    }

    #[test]
    fn test_status_transitions() {
        assert!(JobStatus::Queued.can_transition_to(JobStatus::Running));
        assert!(JobStatus::Running.can_transition_to(JobStatus::Done));
        assert!(JobStatus::Running.can_transition_to(JobStatus::Failed));
        assert!(!JobStatus::Queued.can_transition_to(JobStatus::Done));
        assert!(!JobStatus::Done.can_transition_to(JobStatus::Running));
        assert!(!JobStatus::Failed.can_transition_to(JobStatus::Cancelled));
    }

    #[test]
    fn test_job_lifecycle() {
        let mut job = Job::new("/tmp/job");
        assert_eq!(job.status(), JobStatus::Queued);
        assert_eq!(job.progress().message, "Job queued...");

        job.mark_running().unwrap();
        assert!(job.started_at().is_some());

        job.update_progress(Progress::new(BatchPhase::Matching, 5, 9, "Generated mailer 1/2"));
        assert_eq!(job.progress().current, 5);

        job.mark_done(2, 1, Some(PathBuf::from("/tmp/job/mailers.zip")))
            .unwrap();
        assert_eq!(job.status(), JobStatus::Done);
        assert_eq!(job.progress().current, 9);
        assert_eq!(job.produced_count(), 2);
        assert_eq!(job.skipped_count(), 1);
        assert_eq!(job.progress().message, "Done! Generated 2 mailers.");

        // Late updates from the worker are dropped
        job.update_progress(Progress::new(BatchPhase::Matching, 1, 9, "stale"));
        assert_eq!(job.progress().current, 9);
    }

    #[test]
    fn test_job_failure_keeps_detail() {
        let mut job = Job::new("/tmp/job");
        job.mark_running().unwrap();
        job.mark_failed("clients.csv: missing 'Address' column", Some("trace".into()))
            .unwrap();

        assert_eq!(job.status(), JobStatus::Failed);
        assert_eq!(job.error(), Some("clients.csv: missing 'Address' column"));
        assert_eq!(job.error_detail(), Some("trace"));
    }

    #[test]
    fn test_cannot_cancel_finished_job() {
        let mut job = Job::new("/tmp/job");
        job.mark_running().unwrap();
        job.mark_done(0, 0, None).unwrap();

        assert!(matches!(job.mark_cancelled(), Err(JobError::CannotCancel(_))));
        assert!(job.mark_running().is_err());
    }
}
