use chrono::NaiveDateTime;

use crate::error::RepositoryError;
use crate::workflows::recruiting::repository::{
    ApplicationRepository, CandidateDirectory, JobBoard,
};
use crate::workflows::recruiting::ApplicationId;

use super::domain::{
    AvailabilityRule, CallId, CallQueueEntry, ConversationTurn, FlowScope, FlowState,
    InterviewSchedule, InterviewSession, PartyRef, QuestionTemplate, Reminder, ReminderId,
    ScheduleId, SessionId,
};

/// Storage surface for interview schedules and party availability.
pub trait ScheduleRepository: Send + Sync {
    fn insert_schedule(
        &self,
        schedule: InterviewSchedule,
    ) -> Result<InterviewSchedule, RepositoryError>;
    fn update_schedule(&self, schedule: InterviewSchedule) -> Result<(), RepositoryError>;
    fn fetch_schedule(
        &self,
        id: &ScheduleId,
    ) -> Result<Option<InterviewSchedule>, RepositoryError>;
    /// Schedules still occupying a slot (`pending` or `confirmed`) for one party.
    fn open_schedules(&self, party: &PartyRef) -> Result<Vec<InterviewSchedule>, RepositoryError>;
    fn availability(&self, party: &PartyRef) -> Result<Vec<AvailabilityRule>, RepositoryError>;
    fn add_availability(&self, rule: AvailabilityRule) -> Result<(), RepositoryError>;
}

/// Storage surface for the outbound call queue.
///
/// `enqueue` must refuse a second active (`queued` or `in_progress`) entry for
/// the same application with `RepositoryError::Conflict`; that constraint is
/// the mutual-exclusion boundary behind the at-most-one-in-flight rule.
pub trait CallQueueRepository: Send + Sync {
    fn enqueue(&self, entry: CallQueueEntry) -> Result<CallQueueEntry, RepositoryError>;
    fn update_entry(&self, entry: CallQueueEntry) -> Result<(), RepositoryError>;
    fn fetch_entry(&self, id: &CallId) -> Result<Option<CallQueueEntry>, RepositoryError>;
    fn active_entry_for_application(
        &self,
        application_id: &ApplicationId,
    ) -> Result<Option<CallQueueEntry>, RepositoryError>;
    /// Most recently scheduled entry for the application, any status.
    fn latest_entry_for_application(
        &self,
        application_id: &ApplicationId,
    ) -> Result<Option<CallQueueEntry>, RepositoryError>;
    /// Queued entries whose scheduled time has passed, oldest first.
    fn due_entries(&self, now: NaiveDateTime) -> Result<Vec<CallQueueEntry>, RepositoryError>;
}

/// Storage surface for interview sessions, turns, and flow state.
pub trait SessionRepository: Send + Sync {
    fn insert_session(
        &self,
        session: InterviewSession,
    ) -> Result<InterviewSession, RepositoryError>;
    fn update_session(&self, session: InterviewSession) -> Result<(), RepositoryError>;
    fn fetch_session(&self, id: &SessionId) -> Result<Option<InterviewSession>, RepositoryError>;
    fn latest_session_for_application(
        &self,
        application_id: &ApplicationId,
    ) -> Result<Option<InterviewSession>, RepositoryError>;
    /// Appends one turn; a duplicate (session, turn_number) pair is a conflict.
    fn append_turn(&self, turn: ConversationTurn) -> Result<(), RepositoryError>;
    fn turns(&self, session_id: &SessionId) -> Result<Vec<ConversationTurn>, RepositoryError>;
    fn save_flow_state(&self, state: FlowState) -> Result<(), RepositoryError>;
    fn flow_state(&self, session_id: &SessionId) -> Result<Option<FlowState>, RepositoryError>;
}

/// Storage surface for configurable question flows.
pub trait QuestionFlowRepository: Send + Sync {
    fn flow(&self, scope: &FlowScope) -> Result<Option<Vec<QuestionTemplate>>, RepositoryError>;
    fn store_flow(
        &self,
        scope: FlowScope,
        templates: Vec<QuestionTemplate>,
    ) -> Result<(), RepositoryError>;
}

/// Everything the interview services need from one backing store.
pub trait InterviewStore:
    ScheduleRepository
    + CallQueueRepository
    + SessionRepository
    + QuestionFlowRepository
    + ReminderRepository
    + ApplicationRepository
    + CandidateDirectory
    + JobBoard
{
}

impl<T> InterviewStore for T where
    T: ScheduleRepository
        + CallQueueRepository
        + SessionRepository
        + QuestionFlowRepository
        + ReminderRepository
        + ApplicationRepository
        + CandidateDirectory
        + JobBoard
{
}

/// Storage surface for interview reminders.
///
/// `insert_reminder` must keep (schedule, stage) unique, returning
/// `RepositoryError::Conflict` on a duplicate.
pub trait ReminderRepository: Send + Sync {
    fn insert_reminder(&self, reminder: Reminder) -> Result<Reminder, RepositoryError>;
    fn update_reminder(&self, reminder: Reminder) -> Result<(), RepositoryError>;
    fn fetch_reminder(&self, id: &ReminderId) -> Result<Option<Reminder>, RepositoryError>;
    /// Pending reminders whose send time has passed, oldest first.
    fn due_reminders(&self, now: NaiveDateTime) -> Result<Vec<Reminder>, RepositoryError>;
    fn reminders_for_schedule(
        &self,
        schedule_id: &ScheduleId,
    ) -> Result<Vec<Reminder>, RepositoryError>;
}
