use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde_json::json;

use crate::error::RepositoryError;
use crate::workflows::recruiting::{ApplicationId, JobId};

use super::domain::{
    AvailabilityRule, CallId, FlowScope, QuestionTemplate, ReminderId, ScheduleId, SessionId,
};
use super::orchestrator::{CallOrchestrator, CallScheduleOutcome};
use super::reminders::ReminderService;
use super::scheduler::{
    ConfirmingParty, InterviewScheduler, DEFAULT_DAYS_AHEAD, DEFAULT_MAX_SLOTS,
};
use super::store::InterviewStore;
use super::InterviewServiceError;

/// The interview services share one backing store; the router carries all
/// three so schedule mutations can keep the reminder ladder in step.
pub struct InterviewState<R> {
    pub scheduler: Arc<InterviewScheduler<R>>,
    pub reminders: Arc<ReminderService<R>>,
    pub orchestrator: Arc<CallOrchestrator<R>>,
}

/// Router builder exposing HTTP endpoints for scheduling, calls, question
/// flows, and reminders.
pub fn interview_router<R>(state: Arc<InterviewState<R>>) -> Router
where
    R: InterviewStore + 'static,
{
    Router::new()
        .route("/api/v1/interviews/schedules", post(schedule_handler::<R>))
        .route(
            "/api/v1/interviews/schedules/:schedule_id",
            get(get_schedule_handler::<R>),
        )
        .route(
            "/api/v1/interviews/schedules/:schedule_id/confirm",
            post(confirm_handler::<R>),
        )
        .route(
            "/api/v1/interviews/schedules/:schedule_id/reschedule",
            post(reschedule_handler::<R>),
        )
        .route(
            "/api/v1/interviews/schedules/:schedule_id/decline",
            post(decline_handler::<R>),
        )
        .route(
            "/api/v1/interviews/schedules/:schedule_id/cancel",
            post(cancel_handler::<R>),
        )
        .route(
            "/api/v1/interviews/availability",
            post(availability_handler::<R>),
        )
        .route(
            "/api/v1/interviews/applications/:application_id/slots",
            get(slots_handler::<R>),
        )
        .route(
            "/api/v1/interviews/applications/:application_id/session",
            get(session_handler::<R>),
        )
        .route("/api/v1/interviews/calls", post(schedule_call_handler::<R>))
        .route(
            "/api/v1/interviews/calls/process-due",
            post(process_calls_handler::<R>),
        )
        .route(
            "/api/v1/interviews/calls/:call_id",
            get(get_call_handler::<R>),
        )
        .route(
            "/api/v1/interviews/calls/:call_id/execute",
            post(execute_call_handler::<R>),
        )
        .route(
            "/api/v1/interviews/sessions/:session_id/turns",
            get(turns_handler::<R>),
        )
        .route(
            "/api/v1/interviews/jobs/:job_id/questions",
            put(store_flow_handler::<R>).get(get_flow_handler::<R>),
        )
        .route(
            "/api/v1/interviews/reminders/process-due",
            post(process_reminders_handler::<R>),
        )
        .route(
            "/api/v1/interviews/reminders/:reminder_id/deliver",
            post(deliver_reminder_handler::<R>),
        )
        .with_state(state)
}

const fn default_true() -> bool {
    true
}

fn default_trigger() -> String {
    "manual".to_string()
}

#[derive(Debug, Deserialize)]
pub struct ScheduleRequest {
    pub application_id: String,
    #[serde(default)]
    pub interview_date: Option<NaiveDateTime>,
    #[serde(default = "default_true")]
    pub auto_schedule: bool,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmRequest {
    pub party: ConfirmingParty,
}

#[derive(Debug, Deserialize)]
pub struct RescheduleRequest {
    pub new_date: NaiveDateTime,
}

#[derive(Debug, Deserialize)]
pub struct ScheduleCallRequest {
    pub application_id: String,
    #[serde(default = "default_trigger")]
    pub trigger_reason: String,
}

pub(crate) async fn schedule_handler<R>(
    State(state): State<Arc<InterviewState<R>>>,
    axum::Json(request): axum::Json<ScheduleRequest>,
) -> Response
where
    R: InterviewStore + 'static,
{
    let id = ApplicationId(request.application_id);
    let schedule = match state.scheduler.schedule_interview(
        &id,
        request.interview_date,
        request.auto_schedule,
    ) {
        Ok(schedule) => schedule,
        Err(err) => return error_response(err),
    };
    if let Err(err) = state.reminders.plan_for_schedule(&schedule) {
        return error_response(err);
    }
    (StatusCode::CREATED, axum::Json(schedule)).into_response()
}

pub(crate) async fn get_schedule_handler<R>(
    State(state): State<Arc<InterviewState<R>>>,
    Path(schedule_id): Path<String>,
) -> Response
where
    R: InterviewStore + 'static,
{
    match state.scheduler.schedule(&ScheduleId(schedule_id)) {
        Ok(schedule) => (StatusCode::OK, axum::Json(schedule)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn confirm_handler<R>(
    State(state): State<Arc<InterviewState<R>>>,
    Path(schedule_id): Path<String>,
    axum::Json(request): axum::Json<ConfirmRequest>,
) -> Response
where
    R: InterviewStore + 'static,
{
    match state.scheduler.confirm(&ScheduleId(schedule_id), request.party) {
        Ok(schedule) => (StatusCode::OK, axum::Json(schedule)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn reschedule_handler<R>(
    State(state): State<Arc<InterviewState<R>>>,
    Path(schedule_id): Path<String>,
    axum::Json(request): axum::Json<RescheduleRequest>,
) -> Response
where
    R: InterviewStore + 'static,
{
    let old_id = ScheduleId(schedule_id);
    let replacement = match state.scheduler.reschedule(&old_id, request.new_date) {
        Ok(replacement) => replacement,
        Err(err) => return error_response(err),
    };
    if let Err(err) = state.reminders.cancel_for_schedule(&old_id) {
        return error_response(err);
    }
    if let Err(err) = state.reminders.plan_for_schedule(&replacement) {
        return error_response(err);
    }
    (StatusCode::OK, axum::Json(replacement)).into_response()
}

pub(crate) async fn decline_handler<R>(
    State(state): State<Arc<InterviewState<R>>>,
    Path(schedule_id): Path<String>,
) -> Response
where
    R: InterviewStore + 'static,
{
    close_schedule(state, ScheduleId(schedule_id), false).await
}

pub(crate) async fn cancel_handler<R>(
    State(state): State<Arc<InterviewState<R>>>,
    Path(schedule_id): Path<String>,
) -> Response
where
    R: InterviewStore + 'static,
{
    close_schedule(state, ScheduleId(schedule_id), true).await
}

async fn close_schedule<R>(
    state: Arc<InterviewState<R>>,
    schedule_id: ScheduleId,
    cancel: bool,
) -> Response
where
    R: InterviewStore + 'static,
{
    let result = if cancel {
        state.scheduler.cancel(&schedule_id)
    } else {
        state.scheduler.decline(&schedule_id)
    };
    let schedule = match result {
        Ok(schedule) => schedule,
        Err(err) => return error_response(err),
    };
    if let Err(err) = state.reminders.cancel_for_schedule(&schedule_id) {
        return error_response(err);
    }
    (StatusCode::OK, axum::Json(schedule)).into_response()
}

pub(crate) async fn availability_handler<R>(
    State(state): State<Arc<InterviewState<R>>>,
    axum::Json(rule): axum::Json<AvailabilityRule>,
) -> Response
where
    R: InterviewStore + 'static,
{
    match state.scheduler.add_availability(rule) {
        Ok(()) => StatusCode::CREATED.into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn slots_handler<R>(
    State(state): State<Arc<InterviewState<R>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: InterviewStore + 'static,
{
    let id = ApplicationId(application_id);
    match state
        .scheduler
        .find_available_slots(&id, DEFAULT_DAYS_AHEAD, DEFAULT_MAX_SLOTS)
    {
        Ok(slots) => (StatusCode::OK, axum::Json(json!({ "slots": slots }))).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn session_handler<R>(
    State(state): State<Arc<InterviewState<R>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: InterviewStore + 'static,
{
    let id = ApplicationId(application_id);
    match state.orchestrator.latest_session(&id) {
        Ok(Some(session)) => (StatusCode::OK, axum::Json(session)).into_response(),
        Ok(None) => {
            let payload = json!({ "error": "session not found" });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn schedule_call_handler<R>(
    State(state): State<Arc<InterviewState<R>>>,
    axum::Json(request): axum::Json<ScheduleCallRequest>,
) -> Response
where
    R: InterviewStore + 'static,
{
    let id = ApplicationId(request.application_id);
    match state.orchestrator.schedule_call(&id, &request.trigger_reason) {
        Ok(outcome @ CallScheduleOutcome::Scheduled { .. }) => {
            (StatusCode::ACCEPTED, axum::Json(outcome)).into_response()
        }
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn process_calls_handler<R>(
    State(state): State<Arc<InterviewState<R>>>,
) -> Response
where
    R: InterviewStore + 'static,
{
    match state.orchestrator.process_pending() {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn get_call_handler<R>(
    State(state): State<Arc<InterviewState<R>>>,
    Path(call_id): Path<String>,
) -> Response
where
    R: InterviewStore + 'static,
{
    match state.orchestrator.queue_entry(&CallId(call_id)) {
        Ok(entry) => (StatusCode::OK, axum::Json(entry)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn execute_call_handler<R>(
    State(state): State<Arc<InterviewState<R>>>,
    Path(call_id): Path<String>,
) -> Response
where
    R: InterviewStore + 'static,
{
    match state.orchestrator.execute_call(&CallId(call_id)) {
        Ok(execution) => (StatusCode::OK, axum::Json(execution)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn turns_handler<R>(
    State(state): State<Arc<InterviewState<R>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: InterviewStore + 'static,
{
    match state.orchestrator.session_turns(&SessionId(session_id)) {
        Ok(turns) => (StatusCode::OK, axum::Json(turns)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn store_flow_handler<R>(
    State(state): State<Arc<InterviewState<R>>>,
    Path(job_id): Path<String>,
    axum::Json(templates): axum::Json<Vec<QuestionTemplate>>,
) -> Response
where
    R: InterviewStore + 'static,
{
    let scope = FlowScope::Job(JobId(job_id));
    match state.orchestrator.configure_flow(scope, templates) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn get_flow_handler<R>(
    State(state): State<Arc<InterviewState<R>>>,
    Path(job_id): Path<String>,
) -> Response
where
    R: InterviewStore + 'static,
{
    match state.orchestrator.resolved_flow(&JobId(job_id)) {
        Ok(flow) => (StatusCode::OK, axum::Json(flow)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn process_reminders_handler<R>(
    State(state): State<Arc<InterviewState<R>>>,
) -> Response
where
    R: InterviewStore + 'static,
{
    match state.reminders.process_due() {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn deliver_reminder_handler<R>(
    State(state): State<Arc<InterviewState<R>>>,
    Path(reminder_id): Path<String>,
) -> Response
where
    R: InterviewStore + 'static,
{
    match state.reminders.deliver(&ReminderId(reminder_id)) {
        Ok(delivery) => (StatusCode::OK, axum::Json(delivery)).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(error: InterviewServiceError) -> Response {
    let status = match &error {
        InterviewServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        InterviewServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        InterviewServiceError::Conflict(_) => StatusCode::CONFLICT,
        InterviewServiceError::Transition(_) => StatusCode::CONFLICT,
        InterviewServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        InterviewServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        InterviewServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::BAD_GATEWAY
        }
        InterviewServiceError::External(_) => StatusCode::BAD_GATEWAY,
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}
