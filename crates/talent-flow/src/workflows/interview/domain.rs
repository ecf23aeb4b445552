use std::collections::{BTreeMap, BTreeSet};

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::workflows::recruiting::{ApplicationId, CandidateId, EmployerId, JobId};

/// Identifier wrapper for interview schedules.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScheduleId(pub String);

/// Identifier wrapper for outbound call queue entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CallId(pub String);

/// Identifier wrapper for AI interview sessions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(pub String);

/// Identifier wrapper for interview reminders.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReminderId(pub String);

/// One of the two sides of an interview.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartyRef {
    Candidate(CandidateId),
    Employer(EmployerId),
}

/// Recurring weekly availability window for one party.
///
/// `day_of_week` follows the 0 = Monday convention used across the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityRule {
    pub party: PartyRef,
    pub day_of_week: u8,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub active: bool,
}

impl AvailabilityRule {
    pub fn applies_on(&self, date: NaiveDate) -> bool {
        use chrono::Datelike;
        self.active && u8::try_from(date.weekday().num_days_from_monday()).ok() == Some(self.day_of_week)
    }
}

/// Lifecycle of a scheduled interview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    Pending,
    Confirmed,
    Rescheduled,
    Declined,
    Cancelled,
    Completed,
}

impl ScheduleStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ScheduleStatus::Pending => "pending",
            ScheduleStatus::Confirmed => "confirmed",
            ScheduleStatus::Rescheduled => "rescheduled",
            ScheduleStatus::Declined => "declined",
            ScheduleStatus::Cancelled => "cancelled",
            ScheduleStatus::Completed => "completed",
        }
    }

    /// Whether the schedule still occupies its interview slot.
    pub const fn is_open(self) -> bool {
        matches!(self, ScheduleStatus::Pending | ScheduleStatus::Confirmed)
    }
}

/// A booked (or tentatively booked) interview between the two parties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewSchedule {
    pub id: ScheduleId,
    pub application_id: ApplicationId,
    pub candidate_id: CandidateId,
    pub employer_id: EmployerId,
    pub interview_date: NaiveDateTime,
    pub duration_minutes: i64,
    pub status: ScheduleStatus,
    pub candidate_confirmed: bool,
    pub employer_confirmed: bool,
    pub reschedule_count: u32,
    pub max_reschedules: u32,
    pub previous_schedule: Option<ScheduleId>,
    pub created_at: NaiveDateTime,
}

impl InterviewSchedule {
    pub fn is_confirmed(&self) -> bool {
        self.candidate_confirmed && self.employer_confirmed
    }

    pub fn can_reschedule(&self) -> bool {
        self.reschedule_count < self.max_reschedules
    }

    pub fn duration(&self) -> Duration {
        Duration::minutes(self.duration_minutes)
    }
}

/// Queue state of one outbound call attempt chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    Queued,
    InProgress,
    Completed,
    Failed,
}

impl CallStatus {
    pub const fn label(self) -> &'static str {
        match self {
            CallStatus::Queued => "queued",
            CallStatus::InProgress => "in_progress",
            CallStatus::Completed => "completed",
            CallStatus::Failed => "failed",
        }
    }

    /// Whether the entry blocks another call for the same application.
    pub const fn is_active(self) -> bool {
        matches!(self, CallStatus::Queued | CallStatus::InProgress)
    }
}

/// Result reported at the end of a completed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallOutcome {
    Pending,
    Interested,
    NotInterested,
    CallbackRequested,
    NoResponse,
}

impl CallOutcome {
    pub const fn label(self) -> &'static str {
        match self {
            CallOutcome::Pending => "pending",
            CallOutcome::Interested => "interested",
            CallOutcome::NotInterested => "not_interested",
            CallOutcome::CallbackRequested => "callback_requested",
            CallOutcome::NoResponse => "no_response",
        }
    }
}

/// Durable record of one queued AI screening call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallQueueEntry {
    pub id: CallId,
    pub application_id: ApplicationId,
    pub status: CallStatus,
    pub trigger_reason: String,
    pub scheduled_at: NaiveDateTime,
    pub started_at: Option<NaiveDateTime>,
    pub completed_at: Option<NaiveDateTime>,
    pub retry_count: u32,
    pub max_retries: u32,
    pub error_message: Option<String>,
    pub call_duration_seconds: Option<i64>,
}

impl CallQueueEntry {
    pub fn should_retry(&self) -> bool {
        self.retry_count < self.max_retries
    }
}

/// Session lifecycle, distinct from the queue entry that spawned it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Completed,
    Failed,
}

impl SessionStatus {
    pub const fn label(self) -> &'static str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::Completed => "completed",
            SessionStatus::Failed => "failed",
        }
    }
}

/// One AI interview conversation, including its final disposition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewSession {
    pub id: SessionId,
    pub queue_id: CallId,
    pub application_id: ApplicationId,
    pub status: SessionStatus,
    pub outcome: CallOutcome,
    pub sentiment_score: Option<f64>,
    pub summary: Option<String>,
    pub transcript: Option<String>,
    pub score: Option<super::scorer::InterviewScoreSummary>,
    pub started_at: NaiveDateTime,
    pub completed_at: Option<NaiveDateTime>,
}

/// Topic bucket a question (and its answers) belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionCategory {
    Introduction,
    Experience,
    Skills,
    Availability,
    Salary,
    General,
}

impl QuestionCategory {
    pub const fn label(self) -> &'static str {
        match self {
            QuestionCategory::Introduction => "introduction",
            QuestionCategory::Experience => "experience",
            QuestionCategory::Skills => "skills",
            QuestionCategory::Availability => "availability",
            QuestionCategory::Salary => "salary",
            QuestionCategory::General => "general",
        }
    }
}

/// Gate that must hold before a templated question is asked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionCondition {
    MinExperience { years: u32 },
    RequiresSkill { skill: String },
}

/// One entry of a question flow, ordered by `order`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionTemplate {
    pub order: u32,
    pub category: QuestionCategory,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<QuestionCondition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub follow_up_triggers: Vec<String>,
}

/// Which flow a session draws its questions from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowScope {
    Job(JobId),
    Default,
}

/// Cursor and accumulated answers for one session's question flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowState {
    pub session_id: SessionId,
    pub current_index: usize,
    pub answers: BTreeMap<usize, String>,
    pub follow_up_used: BTreeSet<usize>,
    pub completed_categories: BTreeSet<QuestionCategory>,
}

impl FlowState {
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            current_index: 0,
            answers: BTreeMap::new(),
            follow_up_used: BTreeSet::new(),
            completed_categories: BTreeSet::new(),
        }
    }
}

/// One question/answer exchange inside a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub session_id: SessionId,
    pub turn_number: u32,
    pub question: String,
    pub category: QuestionCategory,
    pub answer: String,
    pub evaluation: Option<super::answers::AnswerEvaluation>,
    pub follow_up: bool,
    pub asked_at: NaiveDateTime,
}

/// How far ahead of the interview each reminder fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderStage {
    DayBefore,
    TwoHours,
    ThirtyMinutes,
}

impl ReminderStage {
    pub const ALL: [ReminderStage; 3] = [
        ReminderStage::DayBefore,
        ReminderStage::TwoHours,
        ReminderStage::ThirtyMinutes,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ReminderStage::DayBefore => "24h",
            ReminderStage::TwoHours => "2h",
            ReminderStage::ThirtyMinutes => "30min",
        }
    }

    pub fn lead_time(self) -> Duration {
        match self {
            ReminderStage::DayBefore => Duration::hours(24),
            ReminderStage::TwoHours => Duration::hours(2),
            ReminderStage::ThirtyMinutes => Duration::minutes(30),
        }
    }
}

/// Delivery state of one reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderStatus {
    Pending,
    Sent,
    Failed,
}

impl ReminderStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ReminderStatus::Pending => "pending",
            ReminderStatus::Sent => "sent",
            ReminderStatus::Failed => "failed",
        }
    }
}

/// A scheduled notification tied to one interview stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: ReminderId,
    pub schedule_id: ScheduleId,
    pub stage: ReminderStage,
    pub status: ReminderStatus,
    pub send_at: NaiveDateTime,
    pub sent_at: Option<NaiveDateTime>,
    pub retry_count: u32,
    pub max_retries: u32,
    pub error_message: Option<String>,
}

impl Reminder {
    pub fn should_retry(&self) -> bool {
        self.retry_count < self.max_retries
    }
}
