use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::error::RepositoryError;

use super::domain::{ApplicationId, ApplicationStatus, CandidateId, JobId};
use super::repository::{ApplicationRepository, CandidateDirectory, JobBoard};
use super::service::{RecruitingService, RecruitingServiceError};

/// Router builder exposing HTTP endpoints for intake, scoring, and automation.
pub fn recruiting_router<R>(service: Arc<RecruitingService<R>>) -> Router
where
    R: ApplicationRepository + CandidateDirectory + JobBoard + 'static,
{
    Router::new()
        .route("/api/v1/recruiting/applications", post(submit_handler::<R>))
        .route(
            "/api/v1/recruiting/applications/:application_id",
            get(status_handler::<R>),
        )
        .route(
            "/api/v1/recruiting/applications/:application_id/score",
            post(score_handler::<R>),
        )
        .route(
            "/api/v1/recruiting/applications/:application_id/transition",
            post(transition_handler::<R>),
        )
        .route(
            "/api/v1/recruiting/applications/:application_id/history",
            get(history_handler::<R>),
        )
        .route(
            "/api/v1/recruiting/jobs/:job_id/automation/run",
            post(automation_run_handler::<R>),
        )
        .route(
            "/api/v1/recruiting/jobs/:job_id/automation/preview",
            get(automation_preview_handler::<R>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub candidate_id: String,
    pub job_id: String,
}

#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    pub to: ApplicationStatus,
    pub actor: String,
    #[serde(default)]
    pub reason: Option<String>,
}

pub(crate) async fn submit_handler<R>(
    State(service): State<Arc<RecruitingService<R>>>,
    axum::Json(request): axum::Json<SubmitRequest>,
) -> Response
where
    R: ApplicationRepository + CandidateDirectory + JobBoard + 'static,
{
    match service.submit(
        CandidateId(request.candidate_id),
        JobId(request.job_id),
    ) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record.status_view())).into_response(),
        Err(RecruitingServiceError::Repository(RepositoryError::Conflict)) => {
            let payload = json!({ "error": "application already exists" });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        Err(other) => error_response(other),
    }
}

pub(crate) async fn status_handler<R>(
    State(service): State<Arc<RecruitingService<R>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + CandidateDirectory + JobBoard + 'static,
{
    let id = ApplicationId(application_id);
    match service.get(&id) {
        Ok(record) => (StatusCode::OK, axum::Json(record.status_view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn score_handler<R>(
    State(service): State<Arc<RecruitingService<R>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + CandidateDirectory + JobBoard + 'static,
{
    let id = ApplicationId(application_id);
    match service.score(&id) {
        Ok(evaluation) => (StatusCode::OK, axum::Json(evaluation)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn transition_handler<R>(
    State(service): State<Arc<RecruitingService<R>>>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<TransitionRequest>,
) -> Response
where
    R: ApplicationRepository + CandidateDirectory + JobBoard + 'static,
{
    let id = ApplicationId(application_id);
    match service.transition(&id, request.to, &request.actor, request.reason) {
        Ok(record) => (StatusCode::OK, axum::Json(record.status_view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn history_handler<R>(
    State(service): State<Arc<RecruitingService<R>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + CandidateDirectory + JobBoard + 'static,
{
    let id = ApplicationId(application_id);
    match service.status_history(&id) {
        Ok(history) => (StatusCode::OK, axum::Json(history)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn automation_run_handler<R>(
    State(service): State<Arc<RecruitingService<R>>>,
    Path(job_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + CandidateDirectory + JobBoard + 'static,
{
    let id = JobId(job_id);
    match service.run_automation(&id) {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn automation_preview_handler<R>(
    State(service): State<Arc<RecruitingService<R>>>,
    Path(job_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + CandidateDirectory + JobBoard + 'static,
{
    let id = JobId(job_id);
    match service.preview_automation(&id) {
        Ok(preview) => (StatusCode::OK, axum::Json(preview)).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(error: RecruitingServiceError) -> Response {
    let status = match &error {
        RecruitingServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        RecruitingServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        RecruitingServiceError::Transition(_) => StatusCode::CONFLICT,
        RecruitingServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        RecruitingServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        RecruitingServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::BAD_GATEWAY
        }
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}
