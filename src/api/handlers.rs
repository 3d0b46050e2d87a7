use super::error::ApiError;
use super::AppState;
use crate::types::{PullRequest, PullRequestShort, Team, User};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::debug;

// ── Request types ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TeamQuery {
    team_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    #[serde(default)]
    user_id: String,
    #[serde(default)]
    is_active: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreatePullRequestRequest {
    #[serde(default)]
    pull_request_id: String,
    #[serde(default)]
    pull_request_name: String,
    #[serde(default)]
    author_id: String,
}

#[derive(Debug, Deserialize)]
pub struct MergePullRequestRequest {
    #[serde(default)]
    pull_request_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ReassignRequest {
    #[serde(default)]
    pull_request_id: String,
    #[serde(default)]
    old_user_id: String,
}

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct TeamResponse {
    team: Team,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    user: User,
}

#[derive(Debug, Serialize)]
pub struct PullRequestResponse {
    pr: PullRequest,
}

#[derive(Debug, Serialize)]
pub struct ReassignResponse {
    pr: PullRequest,
    replaced_by: String,
}

#[derive(Debug, Serialize)]
pub struct UserReviewsResponse {
    user_id: String,
    pull_requests: Vec<PullRequestShort>,
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn parse_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::InvalidBody(rejection.body_text()))
}

fn required(value: Option<String>, field: &str) -> Result<String, ApiError> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ApiError::InvalidInput(format!("{} is required", field))),
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

pub async fn add_team(
    State(state): State<AppState>,
    body: Result<Json<Team>, JsonRejection>,
) -> Result<(StatusCode, Json<TeamResponse>), ApiError> {
    let team = parse_body(body)?;
    if team.name.is_empty() {
        return Err(ApiError::InvalidInput("team_name is required".to_string()));
    }

    let team = state.orchestrator.create_team(team)?;
    Ok((StatusCode::CREATED, Json(TeamResponse { team })))
}

pub async fn get_team(
    State(state): State<AppState>,
    Query(query): Query<TeamQuery>,
) -> Result<Json<Team>, ApiError> {
    let team_name = required(query.team_name, "team_name")?;
    Ok(Json(state.orchestrator.get_team(&team_name)?))
}

pub async fn set_user_active(
    State(state): State<AppState>,
    body: Result<Json<SetActiveRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, ApiError> {
    let request = parse_body(body)?;
    let user_id = required(Some(request.user_id), "user_id")?;

    let user = state
        .orchestrator
        .set_user_active(&user_id, request.is_active)?;
    Ok(Json(UserResponse { user }))
}

pub async fn get_user_reviews(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<UserReviewsResponse>, ApiError> {
    let user_id = required(query.user_id, "user_id")?;
    let pull_requests = state.orchestrator.list_user_reviews(&user_id)?;

    debug!("User {} reviews {} pull requests", user_id, pull_requests.len());
    Ok(Json(UserReviewsResponse {
        user_id,
        pull_requests,
    }))
}

pub async fn create_pull_request(
    State(state): State<AppState>,
    body: Result<Json<CreatePullRequestRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PullRequestResponse>), ApiError> {
    let request = parse_body(body)?;
    if request.pull_request_id.is_empty()
        || request.pull_request_name.is_empty()
        || request.author_id.is_empty()
    {
        return Err(ApiError::InvalidInput(
            "pull_request_id, pull_request_name and author_id are required".to_string(),
        ));
    }

    let pr = state.orchestrator.create_pull_request(
        &request.pull_request_id,
        &request.pull_request_name,
        &request.author_id,
    )?;
    Ok((StatusCode::CREATED, Json(PullRequestResponse { pr })))
}

pub async fn merge_pull_request(
    State(state): State<AppState>,
    body: Result<Json<MergePullRequestRequest>, JsonRejection>,
) -> Result<Json<PullRequestResponse>, ApiError> {
    let request = parse_body(body)?;
    let id = required(Some(request.pull_request_id), "pull_request_id")?;

    let pr = state.orchestrator.merge_pull_request(&id)?;
    Ok(Json(PullRequestResponse { pr }))
}

pub async fn reassign_reviewer(
    State(state): State<AppState>,
    body: Result<Json<ReassignRequest>, JsonRejection>,
) -> Result<Json<ReassignResponse>, ApiError> {
    let request = parse_body(body)?;
    if request.pull_request_id.is_empty() || request.old_user_id.is_empty() {
        return Err(ApiError::InvalidInput(
            "pull_request_id and old_user_id are required".to_string(),
        ));
    }

    let (pr, replaced_by) = state
        .orchestrator
        .reassign_reviewer(&request.pull_request_id, &request.old_user_id)?;
    Ok(Json(ReassignResponse { pr, replaced_by }))
}

pub async fn health() -> &'static str {
    "ok"
}
