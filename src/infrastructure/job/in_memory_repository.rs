//! In-memory job repository implementation

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::error::DomainError;
use crate::domain::job::{Job, JobId, JobRepository};

/// In-memory implementation of JobRepository
#[derive(Debug, Clone)]
pub struct InMemoryJobRepository {
    jobs: Arc<RwLock<HashMap<String, Job>>>,
}

impl InMemoryJobRepository {
    pub fn new() -> Self {
        Self {
            jobs: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryJobRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JobRepository for InMemoryJobRepository {
    async fn get(&self, id: &JobId) -> Result<Option<Job>, DomainError> {
        let jobs = self.jobs.read().await;
        Ok(jobs.get(id.as_str()).cloned())
    }

    async fn create(&self, job: Job) -> Result<Job, DomainError> {
        let mut jobs = self.jobs.write().await;
        let id = job.id().as_str().to_string();

        if jobs.contains_key(&id) {
            return Err(DomainError::validation(format!(
                "Job '{}' already exists",
                id
            )));
        }

        jobs.insert(id, job.clone());
        Ok(job)
    }

    async fn update(&self, job: &Job) -> Result<Job, DomainError> {
        let mut jobs = self.jobs.write().await;
        let id = job.id().as_str();

        match jobs.get_mut(id) {
            Some(slot) => {
                *slot = job.clone();
                Ok(job.clone())
            }
            None => Err(DomainError::not_found(format!("Job '{}'", id))),
        }
    }

    async fn delete(&self, id: &JobId) -> Result<Option<Job>, DomainError> {
        let mut jobs = self.jobs.write().await;
        Ok(jobs.remove(id.as_str()))
    }

    async fn delete_finished_before(&self, before: DateTime<Utc>) -> Result<Vec<Job>, DomainError> {
        let mut jobs = self.jobs.write().await;
        let expired: Vec<String> = jobs
            .iter()
            .filter(|(_, job)| job.finished_at().is_some_and(|finished| finished < before))
            .map(|(id, _)| id.clone())
            .collect();

        Ok(expired
            .into_iter()
            .filter_map(|id| jobs.remove(&id))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::job::repository::tests::{
        test_repository_basic_crud, test_repository_delete_finished_before,
    };

    #[tokio::test]
    async fn test_basic_crud() {
        let repo = InMemoryJobRepository::new();
        test_repository_basic_crud(&repo).await;
    }

    #[tokio::test]
    async fn test_delete_finished_before() {
        let repo = InMemoryJobRepository::new();
        test_repository_delete_finished_before(&repo).await;
    }

    #[tokio::test]
    async fn test_create_duplicate_fails() {
        let repo = InMemoryJobRepository::new();
        let job = Job::new("/tmp/a");
        let duplicate = Job::with_id(job.id().clone(), "/tmp/b");

        repo.create(job).await.expect("first create should succeed");

        let result = repo.create(duplicate).await;
        assert!(result.unwrap_err().to_string().contains("already exists"));
    }

    #[tokio::test]
    async fn test_update_nonexistent_fails() {
        let repo = InMemoryJobRepository::new();

        let result = repo.update(&Job::new("/tmp/a")).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete_nonexistent_returns_none() {
        let repo = InMemoryJobRepository::new();

        let deleted = repo.delete(&JobId::generate()).await.unwrap();
        assert!(deleted.is_none());
    }
}
