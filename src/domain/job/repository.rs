//! Job repository trait

use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[cfg(test)]
use mockall::automock;

use super::{Job, JobId};
use crate::domain::error::DomainError;

/// Repository trait for batch jobs
#[cfg_attr(test, automock)]
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Get a job by ID
    async fn get(&self, id: &JobId) -> Result<Option<Job>, DomainError>;

    /// Create a new job
    async fn create(&self, job: Job) -> Result<Job, DomainError>;

    /// Update an existing job
    async fn update(&self, job: &Job) -> Result<Job, DomainError>;

    /// Delete a job by ID, returning the removed job
    async fn delete(&self, id: &JobId) -> Result<Option<Job>, DomainError>;

    /// Remove finished jobs whose completion is older than `before`
    async fn delete_finished_before(&self, before: DateTime<Utc>) -> Result<Vec<Job>, DomainError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;

    /// Test suite for JobRepository implementations
    pub async fn test_repository_basic_crud<R: JobRepository>(repo: &R) {
        let job = Job::new("/tmp/mailer_job_crud");
        let job_id = job.id().clone();

        let created = repo.create(job).await.expect("create should succeed");
        assert_eq!(created.id(), &job_id);

        let mut fetched = repo
            .get(&job_id)
            .await
            .expect("get should succeed")
            .expect("job should exist");

        fetched.mark_running().expect("mark_running should succeed");
        repo.update(&fetched).await.expect("update should succeed");

        let fetched = repo.get(&job_id).await.unwrap().unwrap();
        assert_eq!(fetched.status(), super::super::JobStatus::Running);

        let deleted = repo.delete(&job_id).await.expect("delete should succeed");
        assert!(deleted.is_some());
        assert!(repo.get(&job_id).await.unwrap().is_none());
    }

    /// Only finished jobs are purged
    pub async fn test_repository_delete_finished_before<R: JobRepository>(repo: &R) {
        let mut finished = Job::new("/tmp/mailer_job_finished");
        finished.mark_running().unwrap();
        finished.mark_done(1, 0, None).unwrap();
        let finished_id = finished.id().clone();

        let mut running = Job::new("/tmp/mailer_job_running");
        running.mark_running().unwrap();
        let running_id = running.id().clone();

        repo.create(finished).await.unwrap();
        repo.create(running).await.unwrap();

        let purged = repo
            .delete_finished_before(Utc::now() - chrono::Duration::hours(1))
            .await
            .unwrap();
        assert!(purged.is_empty());

        let purged = repo
            .delete_finished_before(Utc::now() + chrono::Duration::hours(1))
            .await
            .unwrap();
        assert_eq!(purged.len(), 1);
        assert_eq!(purged[0].id(), &finished_id);
        assert!(repo.get(&running_id).await.unwrap().is_some());
    }
}
