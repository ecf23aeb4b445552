//! Automated screening calls and interview logistics.
//!
//! Three services share one storage surface: the scheduler books interviews
//! into mutually free slots, the orchestrator runs the AI call loop over a
//! configurable question flow, and the reminder service keeps both parties
//! notified. All side effects go through the capability traits so tests can
//! swap in scripted gateways.

pub mod answers;
pub mod capabilities;
pub mod domain;
pub mod eligibility;
pub mod orchestrator;
pub mod questions;
pub mod reminders;
pub mod router;
pub mod scheduler;
pub mod scorer;
pub mod store;

#[cfg(test)]
mod tests;

use crate::error::RepositoryError;
use crate::workflows::recruiting::InvalidTransition;

use capabilities::CapabilityError;

/// Failures surfaced by the interview services.
#[derive(Debug, thiserror::Error)]
pub enum InterviewServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Transition(#[from] InvalidTransition),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    External(#[from] CapabilityError),
}

pub use answers::{AnswerAnnotations, AnswerEvaluation, AnswerEvaluator, KeywordMatches, Sentiment};
pub use capabilities::{Notifier, ReminderMessage, ScheduledTask, TaskDispatcher, VoiceGateway};
pub use domain::{
    AvailabilityRule, CallId, CallOutcome, CallQueueEntry, CallStatus, ConversationTurn,
    FlowScope, FlowState, InterviewSchedule, InterviewSession, PartyRef, QuestionCategory,
    QuestionCondition, QuestionTemplate, Reminder, ReminderId, ReminderStage, ReminderStatus,
    ScheduleId, ScheduleStatus, SessionId, SessionStatus,
};
pub use eligibility::{EligibilityChecks, EligibilityGate, EligibilityReport};
pub use orchestrator::{CallExecution, CallOrchestrator, CallScanSummary, CallScheduleOutcome};
pub use questions::{FlowStep, PromptedQuestion, QuestionFlowEngine};
pub use reminders::{ReminderDelivery, ReminderScanSummary, ReminderService};
pub use router::{interview_router, InterviewState};
pub use scheduler::{ConfirmingParty, InterviewScheduler, SCHEDULER_ACTOR};
pub use scorer::{category_weight, normalize_score, CategoryScore, InterviewScorer, InterviewScoreSummary, NoAnswersError};
pub use store::{
    CallQueueRepository, InterviewStore, QuestionFlowRepository, ReminderRepository,
    ScheduleRepository, SessionRepository,
};
