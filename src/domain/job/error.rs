//! Job-specific errors

use std::fmt;

use crate::domain::DomainError;

/// Errors that can occur in job handling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobError {
    /// Invalid job ID format
    InvalidId(String),

    /// Invalid state transition
    InvalidStateTransition {
        from: String,
        to: String,
        reason: String,
    },

    /// Job cannot be cancelled
    CannotCancel(String),
}

impl JobError {
    pub fn invalid_id(message: impl Into<String>) -> Self {
        Self::InvalidId(message.into())
    }

    pub fn invalid_transition(from: &str, to: &str, reason: impl Into<String>) -> Self {
        Self::InvalidStateTransition {
            from: from.to_string(),
            to: to.to_string(),
            reason: reason.into(),
        }
    }

    pub fn cannot_cancel(reason: impl Into<String>) -> Self {
        Self::CannotCancel(reason.into())
    }
}

impl fmt::Display for JobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId(msg) => write!(f, "Invalid job ID: {}", msg),
            Self::InvalidStateTransition { from, to, reason } => {
                write!(
                    f,
                    "Invalid state transition from '{}' to '{}': {}",
                    from, to, reason
                )
            }
            Self::CannotCancel(reason) => write!(f, "Cannot cancel job: {}", reason),
        }
    }
}

impl std::error::Error for JobError {}

impl From<JobError> for DomainError {
    fn from(err: JobError) -> Self {
        match err {
            JobError::InvalidId(msg) => DomainError::invalid_id(msg),
            other => DomainError::validation(other.to_string()),
        }
    }
}
