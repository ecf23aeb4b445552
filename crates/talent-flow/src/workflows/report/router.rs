use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;

use crate::error::RepositoryError;
use crate::workflows::recruiting::ApplicationId;

use super::{ReportError, ReportGenerator, ReportStore};

/// Shared state for the report endpoints.
pub struct ReportState<R> {
    pub generator: Arc<ReportGenerator<R>>,
}

/// Router builder exposing the report endpoint.
pub fn report_router<R>(state: Arc<ReportState<R>>) -> Router
where
    R: ReportStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/reports/applications/:application_id",
            get(report_handler::<R>),
        )
        .with_state(state)
}

async fn report_handler<R>(
    State(state): State<Arc<ReportState<R>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ReportStore + 'static,
{
    match state.generator.generate(&ApplicationId(application_id)) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: ReportError) -> Response {
    let status = match &err {
        ReportError::NotFound(_) => StatusCode::NOT_FOUND,
        ReportError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        ReportError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        ReportError::Repository(RepositoryError::Unavailable(_)) => StatusCode::BAD_GATEWAY,
    };

    (status, Json(json!({ "error": err.to_string() }))).into_response()
}
