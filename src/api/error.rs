use crate::error::{ErrorKind, ReviewError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Error envelope: `{"error": {"code": ..., "message": ...}}`.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

/// Failures surfaced by the HTTP layer.
#[derive(Debug)]
pub enum ApiError {
    /// Request body is not valid JSON for the endpoint.
    InvalidBody(String),
    /// Required field or query parameter missing or empty.
    InvalidInput(String),
    Review(ReviewError),
}

impl ApiError {
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::InvalidBody(_) => (StatusCode::BAD_REQUEST, "INVALID_BODY"),
            ApiError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
            ApiError::Review(err) => (status_for(err), code_for(err)),
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::InvalidBody(message) | ApiError::InvalidInput(message) => message.clone(),
            ApiError::Review(err) => err.to_string(),
        }
    }
}

/// Status follows the error kind; a duplicate team is a plain bad request.
fn status_for(err: &ReviewError) -> StatusCode {
    match (err, err.kind()) {
        (ReviewError::TeamExists(_), _) => StatusCode::BAD_REQUEST,
        (_, ErrorKind::NotFound) => StatusCode::NOT_FOUND,
        (_, ErrorKind::AlreadyExists | ErrorKind::InvalidState | ErrorKind::Exhausted) => {
            StatusCode::CONFLICT
        }
    }
}

fn code_for(err: &ReviewError) -> &'static str {
    match err {
        ReviewError::TeamExists(_) => "TEAM_EXISTS",
        ReviewError::TeamNotFound(_)
        | ReviewError::UserNotFound(_)
        | ReviewError::PullRequestNotFound(_) => "NOT_FOUND",
        ReviewError::PullRequestExists(_) => "PR_EXISTS",
        ReviewError::PullRequestMerged(_) => "PR_MERGED",
        ReviewError::ReviewerMissing { .. } => "NOT_ASSIGNED",
        ReviewError::NoCandidate(_) => "NO_CANDIDATE",
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        (
            status,
            Json(ErrorResponse {
                error: ErrorBody {
                    code: code.to_string(),
                    message: self.message(),
                },
            }),
        )
            .into_response()
    }
}

impl From<ReviewError> for ApiError {
    fn from(err: ReviewError) -> Self {
        Self::Review(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ReviewError::TeamExists("t".into()), StatusCode::BAD_REQUEST, "TEAM_EXISTS"),
            (ReviewError::TeamNotFound("t".into()), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (ReviewError::PullRequestExists("p".into()), StatusCode::CONFLICT, "PR_EXISTS"),
            (ReviewError::PullRequestMerged("p".into()), StatusCode::CONFLICT, "PR_MERGED"),
            (ReviewError::NoCandidate("t".into()), StatusCode::CONFLICT, "NO_CANDIDATE"),
            (ReviewError::UserNotFound("u".into()), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (
                ReviewError::ReviewerMissing {
                    pull_request_id: "p".into(),
                    reviewer_id: "u".into(),
                },
                StatusCode::CONFLICT,
                "NOT_ASSIGNED",
            ),
        ];

        for (err, status, code) in cases {
            assert_eq!(ApiError::from(err).status_and_code(), (status, code));
        }
    }

    #[test]
    fn test_status_follows_error_kind() {
        let not_found = ReviewError::PullRequestNotFound("p".into());
        assert_eq!(not_found.kind(), ErrorKind::NotFound);
        assert_eq!(status_for(&not_found), StatusCode::NOT_FOUND);

        let exhausted = ReviewError::NoCandidate("t".into());
        assert_eq!(exhausted.kind(), ErrorKind::Exhausted);
        assert_eq!(status_for(&exhausted), StatusCode::CONFLICT);

        // Same kind as PullRequestExists, different status
        let team_exists = ReviewError::TeamExists("t".into());
        assert_eq!(team_exists.kind(), ErrorKind::AlreadyExists);
        assert_eq!(status_for(&team_exists), StatusCode::BAD_REQUEST);
    }
}
