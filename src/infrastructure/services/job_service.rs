//! Job service for background batch runs

use std::collections::HashMap;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument, warn};

use crate::domain::batch::{CancelSignal, Progress};
use crate::domain::error::DomainError;
use crate::domain::job::{Job, JobId, JobRepository, JobStatus};

/// Job service configuration
#[derive(Debug, Clone)]
pub struct JobServiceConfig {
    /// How long to keep finished jobs before cleanup
    pub retention_duration: Duration,
}

impl Default for JobServiceConfig {
    fn default() -> Self {
        Self {
            retention_duration: Duration::from_secs(3600),
        }
    }
}

impl JobServiceConfig {
    pub fn with_retention(retention_duration: Duration) -> Self {
        Self { retention_duration }
    }
}

/// Trait for the job service (for dynamic dispatch in AppState)
#[async_trait]
pub trait JobServiceTrait: Send + Sync + Debug {
    /// Register a queued job that will write into `work_dir`
    async fn create_pending(&self, work_dir: PathBuf) -> Result<Job, DomainError>;

    async fn get(&self, id: &str) -> Result<Option<Job>, DomainError>;

    /// Cancellation handle for a job that has not finished yet
    async fn cancel_signal(&self, id: &str) -> Option<CancelSignal>;

    async fn mark_running(&self, id: &str) -> Result<Job, DomainError>;

    async fn update_progress(&self, id: &str, progress: Progress) -> Result<Job, DomainError>;

    async fn mark_done(
        &self,
        id: &str,
        produced_count: usize,
        skipped_count: usize,
        archive_path: Option<PathBuf>,
    ) -> Result<Job, DomainError>;

    async fn mark_failed(
        &self,
        id: &str,
        error: String,
        detail: Option<String>,
    ) -> Result<Job, DomainError>;

    /// Cancel a queued or running job and signal its worker
    async fn cancel(&self, id: &str) -> Result<Job, DomainError>;

    /// Record that a worker stopped on its cancel signal; a job that is
    /// already cancelled is returned unchanged
    async fn finish_cancelled(&self, id: &str) -> Result<Job, DomainError>;

    /// Remove a job together with its working directory
    async fn remove(&self, id: &str) -> Result<Option<Job>, DomainError>;

    /// Purge finished jobs past retention, returning how many were removed
    async fn cleanup_old(&self) -> Result<u64, DomainError>;
}

/// Job service implementation
#[derive(Debug)]
pub struct JobService<R: JobRepository> {
    repository: Arc<R>,
    config: JobServiceConfig,
    cancels: RwLock<HashMap<String, CancelSignal>>,
    /// Serializes read-modify-write of job state
    transitions: Mutex<()>,
}

impl<R: JobRepository + Debug> JobService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self::with_config(repository, JobServiceConfig::default())
    }

    pub fn with_config(repository: Arc<R>, config: JobServiceConfig) -> Self {
        Self {
            repository,
            config,
            cancels: RwLock::new(HashMap::new()),
            transitions: Mutex::new(()),
        }
    }

    fn parse_id(&self, id: &str) -> Result<JobId, DomainError> {
        Ok(JobId::new(id)?)
    }

    async fn get_required(&self, id: &str) -> Result<Job, DomainError> {
        let job_id = self.parse_id(id)?;

        self.repository
            .get(&job_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Job '{}'", id)))
    }

    /// Apply `change` to the stored job and write it back
    ///
    /// Holds the transition lock across the read and the write, so a slow
    /// progress write can never overwrite a concurrent status change.
    async fn modify<F>(&self, id: &str, change: F) -> Result<Job, DomainError>
    where
        F: FnOnce(&mut Job) -> Result<(), DomainError> + Send,
    {
        let _guard = self.transitions.lock().await;
        let mut job = self.get_required(id).await?;
        change(&mut job)?;
        self.repository.update(&job).await
    }

    /// Drop the cancel handle once the job can no longer be cancelled
    async fn release(&self, id: &str) {
        self.cancels.write().await.remove(id);
    }
}

async fn remove_work_dir(path: &Path) {
    match tokio::fs::remove_dir_all(path).await {
        Ok(()) => debug!(path = %path.display(), "Removed job directory"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove job directory"),
    }
}

#[async_trait]
impl<R: JobRepository + Debug> JobServiceTrait for JobService<R> {
    #[instrument(skip(self), fields(work_dir = %work_dir.display()))]
    async fn create_pending(&self, work_dir: PathBuf) -> Result<Job, DomainError> {
        let job = Job::new(work_dir);
        let job_id = job.id().to_string();

        let created = self.repository.create(job).await?;
        self.cancels
            .write()
            .await
            .insert(job_id.clone(), CancelSignal::new());
        info!(job_id = %job_id, "Created pending job");

        Ok(created)
    }

    #[instrument(skip(self))]
    async fn get(&self, id: &str) -> Result<Option<Job>, DomainError> {
        let job_id = self.parse_id(id)?;
        self.repository.get(&job_id).await
    }

    async fn cancel_signal(&self, id: &str) -> Option<CancelSignal> {
        self.cancels.read().await.get(id).cloned()
    }

    #[instrument(skip(self))]
    async fn mark_running(&self, id: &str) -> Result<Job, DomainError> {
        let updated = self
            .modify(id, |job| Ok(job.mark_running()?))
            .await?;
        debug!(job_id = %id, "Marked job as running");

        Ok(updated)
    }

    async fn update_progress(&self, id: &str, progress: Progress) -> Result<Job, DomainError> {
        self.modify(id, |job| {
            job.update_progress(progress);
            Ok(())
        })
        .await
    }

    #[instrument(skip(self, archive_path))]
    async fn mark_done(
        &self,
        id: &str,
        produced_count: usize,
        skipped_count: usize,
        archive_path: Option<PathBuf>,
    ) -> Result<Job, DomainError> {
        let updated = self
            .modify(id, |job| {
                Ok(job.mark_done(produced_count, skipped_count, archive_path)?)
            })
            .await?;
        self.release(id).await;
        info!(job_id = %id, produced_count, skipped_count, "Job completed");

        Ok(updated)
    }

    #[instrument(skip(self, detail))]
    async fn mark_failed(
        &self,
        id: &str,
        error: String,
        detail: Option<String>,
    ) -> Result<Job, DomainError> {
        let updated = self
            .modify(id, |job| Ok(job.mark_failed(&error, detail)?))
            .await?;
        self.release(id).await;
        warn!(job_id = %id, error = %error, "Job failed");

        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn cancel(&self, id: &str) -> Result<Job, DomainError> {
        let updated = self
            .modify(id, |job| Ok(job.mark_cancelled()?))
            .await?;
        if let Some(signal) = self.cancels.write().await.remove(id) {
            signal.cancel();
        }
        info!(job_id = %id, "Cancelled job");

        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn finish_cancelled(&self, id: &str) -> Result<Job, DomainError> {
        let updated = self
            .modify(id, |job| {
                if job.status() != JobStatus::Cancelled {
                    job.mark_cancelled()?;
                }
                Ok(())
            })
            .await?;
        self.release(id).await;
        debug!(job_id = %id, "Worker stopped after cancellation");

        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn remove(&self, id: &str) -> Result<Option<Job>, DomainError> {
        let job_id = self.parse_id(id)?;
        let removed = self.repository.delete(&job_id).await?;

        if let Some(job) = &removed {
            if let Some(signal) = self.cancels.write().await.remove(id) {
                signal.cancel();
            }
            remove_work_dir(job.work_dir()).await;
        }

        Ok(removed)
    }

    #[instrument(skip(self))]
    async fn cleanup_old(&self) -> Result<u64, DomainError> {
        let cutoff = Utc::now()
            - chrono::Duration::from_std(self.config.retention_duration)
                .unwrap_or_else(|_| chrono::Duration::hours(1));

        let purged = self.repository.delete_finished_before(cutoff).await?;

        for job in &purged {
            remove_work_dir(job.work_dir()).await;
        }

        if !purged.is_empty() {
            info!(deleted_count = purged.len(), "Cleaned up old jobs");
        }

        Ok(purged.len() as u64)
    }
}
