//! Error values returned by the store and the assignment orchestrator.

use thiserror::Error;

/// Every failure the reviewer assignment core can report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReviewError {
    #[error("team already exists: {0}")]
    TeamExists(String),

    #[error("team not found: {0}")]
    TeamNotFound(String),

    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("pull request already exists: {0}")]
    PullRequestExists(String),

    #[error("pull request not found: {0}")]
    PullRequestNotFound(String),

    #[error("pull request already merged: {0}")]
    PullRequestMerged(String),

    #[error("reviewer {reviewer_id} is not assigned to pull request {pull_request_id}")]
    ReviewerMissing {
        pull_request_id: String,
        reviewer_id: String,
    },

    #[error("no active candidate available in team {0}")]
    NoCandidate(String),
}

/// Coarse classification used by outer layers to map errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    InvalidState,
    Exhausted,
}

impl ReviewError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReviewError::TeamNotFound(_)
            | ReviewError::UserNotFound(_)
            | ReviewError::PullRequestNotFound(_) => ErrorKind::NotFound,
            ReviewError::TeamExists(_) | ReviewError::PullRequestExists(_) => {
                ErrorKind::AlreadyExists
            }
            ReviewError::PullRequestMerged(_) | ReviewError::ReviewerMissing { .. } => {
                ErrorKind::InvalidState
            }
            ReviewError::NoCandidate(_) => ErrorKind::Exhausted,
        }
    }
}

pub type ReviewResult<T> = std::result::Result<T, ReviewError>;
