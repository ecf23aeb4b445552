use chrono::NaiveDateTime;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use talent_flow::error::RepositoryError;
use talent_flow::workflows::interview::capabilities::CapabilityError;
use talent_flow::workflows::interview::domain::{
    AvailabilityRule, CallId, CallQueueEntry, CallStatus, ConversationTurn, FlowScope, FlowState,
    InterviewSchedule, InterviewSession, PartyRef, QuestionTemplate, Reminder, ReminderId,
    ReminderStatus, ScheduleId, SessionId,
};
use talent_flow::workflows::interview::store::{
    CallQueueRepository, QuestionFlowRepository, ReminderRepository, ScheduleRepository,
    SessionRepository,
};
use talent_flow::workflows::interview::{
    Notifier, ReminderMessage, ScheduledTask, TaskDispatcher, VoiceGateway,
};
use talent_flow::workflows::recruiting::domain::{
    ApplicationId, ApplicationStatus, CandidateId, CandidateProfile, JobId, JobPosting,
    StatusChange,
};
use talent_flow::workflows::recruiting::repository::{
    ApplicationRecord, ApplicationRepository, CandidateDirectory, JobBoard,
};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Single in-memory store backing every workflow behind the HTTP surface.
#[derive(Default)]
pub(crate) struct InMemoryStore {
    applications: Mutex<HashMap<ApplicationId, ApplicationRecord>>,
    history: Mutex<HashMap<ApplicationId, Vec<StatusChange>>>,
    candidates: Mutex<HashMap<CandidateId, CandidateProfile>>,
    jobs: Mutex<HashMap<JobId, JobPosting>>,
    schedules: Mutex<HashMap<ScheduleId, InterviewSchedule>>,
    rules: Mutex<Vec<AvailabilityRule>>,
    queue: Mutex<HashMap<CallId, CallQueueEntry>>,
    sessions: Mutex<HashMap<SessionId, InterviewSession>>,
    turns: Mutex<HashMap<SessionId, Vec<ConversationTurn>>>,
    flow_states: Mutex<HashMap<SessionId, FlowState>>,
    flows: Mutex<HashMap<FlowScope, Vec<QuestionTemplate>>>,
    reminders: Mutex<HashMap<ReminderId, Reminder>>,
}

fn party_matches(schedule: &InterviewSchedule, party: &PartyRef) -> bool {
    match party {
        PartyRef::Candidate(id) => schedule.candidate_id == *id,
        PartyRef::Employer(id) => schedule.employer_id == *id,
    }
}

impl ApplicationRepository for InMemoryStore {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        let mut guard = self.applications.lock().expect("repository mutex poisoned");
        let duplicate = guard.contains_key(&record.id)
            || guard.values().any(|existing| {
                existing.candidate_id == record.candidate_id && existing.job_id == record.job_id
            });
        if duplicate {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: ApplicationRecord) -> Result<(), RepositoryError> {
        let mut guard = self.applications.lock().expect("repository mutex poisoned");
        if !guard.contains_key(&record.id) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(record.id.clone(), record);
        Ok(())
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        Ok(self
            .applications
            .lock()
            .expect("repository mutex poisoned")
            .get(id)
            .cloned())
    }

    fn pending_for_job(&self, job_id: &JobId) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        let mut pending: Vec<ApplicationRecord> = self
            .applications
            .lock()
            .expect("repository mutex poisoned")
            .values()
            .filter(|record| {
                record.job_id == *job_id && record.status == ApplicationStatus::Pending
            })
            .cloned()
            .collect();
        pending.sort_by(|a, b| a.applied_at.cmp(&b.applied_at).then(a.id.cmp(&b.id)));
        Ok(pending)
    }

    fn append_status_change(
        &self,
        id: &ApplicationId,
        change: StatusChange,
    ) -> Result<(), RepositoryError> {
        self.history
            .lock()
            .expect("repository mutex poisoned")
            .entry(id.clone())
            .or_default()
            .push(change);
        Ok(())
    }

    fn status_history(&self, id: &ApplicationId) -> Result<Vec<StatusChange>, RepositoryError> {
        Ok(self
            .history
            .lock()
            .expect("repository mutex poisoned")
            .get(id)
            .cloned()
            .unwrap_or_default())
    }
}

impl CandidateDirectory for InMemoryStore {
    fn candidate(&self, id: &CandidateId) -> Result<Option<CandidateProfile>, RepositoryError> {
        Ok(self
            .candidates
            .lock()
            .expect("repository mutex poisoned")
            .get(id)
            .cloned())
    }

    fn upsert_candidate(&self, profile: CandidateProfile) -> Result<(), RepositoryError> {
        self.candidates
            .lock()
            .expect("repository mutex poisoned")
            .insert(profile.id.clone(), profile);
        Ok(())
    }
}

impl JobBoard for InMemoryStore {
    fn job(&self, id: &JobId) -> Result<Option<JobPosting>, RepositoryError> {
        Ok(self
            .jobs
            .lock()
            .expect("repository mutex poisoned")
            .get(id)
            .cloned())
    }

    fn upsert_job(&self, posting: JobPosting) -> Result<(), RepositoryError> {
        self.jobs
            .lock()
            .expect("repository mutex poisoned")
            .insert(posting.id.clone(), posting);
        Ok(())
    }
}

impl ScheduleRepository for InMemoryStore {
    fn insert_schedule(
        &self,
        schedule: InterviewSchedule,
    ) -> Result<InterviewSchedule, RepositoryError> {
        let mut guard = self.schedules.lock().expect("repository mutex poisoned");
        if guard.contains_key(&schedule.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(schedule.id.clone(), schedule.clone());
        Ok(schedule)
    }

    fn update_schedule(&self, schedule: InterviewSchedule) -> Result<(), RepositoryError> {
        let mut guard = self.schedules.lock().expect("repository mutex poisoned");
        if !guard.contains_key(&schedule.id) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(schedule.id.clone(), schedule);
        Ok(())
    }

    fn fetch_schedule(
        &self,
        id: &ScheduleId,
    ) -> Result<Option<InterviewSchedule>, RepositoryError> {
        Ok(self
            .schedules
            .lock()
            .expect("repository mutex poisoned")
            .get(id)
            .cloned())
    }

    fn open_schedules(&self, party: &PartyRef) -> Result<Vec<InterviewSchedule>, RepositoryError> {
        Ok(self
            .schedules
            .lock()
            .expect("repository mutex poisoned")
            .values()
            .filter(|schedule| schedule.status.is_open() && party_matches(schedule, party))
            .cloned()
            .collect())
    }

    fn availability(&self, party: &PartyRef) -> Result<Vec<AvailabilityRule>, RepositoryError> {
        Ok(self
            .rules
            .lock()
            .expect("repository mutex poisoned")
            .iter()
            .filter(|rule| rule.party == *party)
            .cloned()
            .collect())
    }

    fn add_availability(&self, rule: AvailabilityRule) -> Result<(), RepositoryError> {
        self.rules
            .lock()
            .expect("repository mutex poisoned")
            .push(rule);
        Ok(())
    }
}

impl CallQueueRepository for InMemoryStore {
    fn enqueue(&self, entry: CallQueueEntry) -> Result<CallQueueEntry, RepositoryError> {
        let mut guard = self.queue.lock().expect("repository mutex poisoned");
        let active = guard.values().any(|existing| {
            existing.application_id == entry.application_id && existing.status.is_active()
        });
        if active || guard.contains_key(&entry.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(entry.id.clone(), entry.clone());
        Ok(entry)
    }

    fn update_entry(&self, entry: CallQueueEntry) -> Result<(), RepositoryError> {
        let mut guard = self.queue.lock().expect("repository mutex poisoned");
        if !guard.contains_key(&entry.id) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(entry.id.clone(), entry);
        Ok(())
    }

    fn fetch_entry(&self, id: &CallId) -> Result<Option<CallQueueEntry>, RepositoryError> {
        Ok(self
            .queue
            .lock()
            .expect("repository mutex poisoned")
            .get(id)
            .cloned())
    }

    fn active_entry_for_application(
        &self,
        application_id: &ApplicationId,
    ) -> Result<Option<CallQueueEntry>, RepositoryError> {
        Ok(self
            .queue
            .lock()
            .expect("repository mutex poisoned")
            .values()
            .find(|entry| entry.application_id == *application_id && entry.status.is_active())
            .cloned())
    }

    fn latest_entry_for_application(
        &self,
        application_id: &ApplicationId,
    ) -> Result<Option<CallQueueEntry>, RepositoryError> {
        Ok(self
            .queue
            .lock()
            .expect("repository mutex poisoned")
            .values()
            .filter(|entry| entry.application_id == *application_id)
            .max_by_key(|entry| entry.scheduled_at)
            .cloned())
    }

    fn due_entries(&self, now: NaiveDateTime) -> Result<Vec<CallQueueEntry>, RepositoryError> {
        let mut due: Vec<CallQueueEntry> = self
            .queue
            .lock()
            .expect("repository mutex poisoned")
            .values()
            .filter(|entry| entry.status == CallStatus::Queued && entry.scheduled_at <= now)
            .cloned()
            .collect();
        due.sort_by_key(|entry| entry.scheduled_at);
        Ok(due)
    }
}

impl SessionRepository for InMemoryStore {
    fn insert_session(
        &self,
        session: InterviewSession,
    ) -> Result<InterviewSession, RepositoryError> {
        let mut guard = self.sessions.lock().expect("repository mutex poisoned");
        if guard.contains_key(&session.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(session.id.clone(), session.clone());
        Ok(session)
    }

    fn update_session(&self, session: InterviewSession) -> Result<(), RepositoryError> {
        let mut guard = self.sessions.lock().expect("repository mutex poisoned");
        if !guard.contains_key(&session.id) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(session.id.clone(), session);
        Ok(())
    }

    fn fetch_session(&self, id: &SessionId) -> Result<Option<InterviewSession>, RepositoryError> {
        Ok(self
            .sessions
            .lock()
            .expect("repository mutex poisoned")
            .get(id)
            .cloned())
    }

    fn latest_session_for_application(
        &self,
        application_id: &ApplicationId,
    ) -> Result<Option<InterviewSession>, RepositoryError> {
        Ok(self
            .sessions
            .lock()
            .expect("repository mutex poisoned")
            .values()
            .filter(|session| session.application_id == *application_id)
            .max_by_key(|session| session.started_at)
            .cloned())
    }

    fn append_turn(&self, turn: ConversationTurn) -> Result<(), RepositoryError> {
        let mut guard = self.turns.lock().expect("repository mutex poisoned");
        let recorded = guard.entry(turn.session_id.clone()).or_default();
        if recorded
            .iter()
            .any(|existing| existing.turn_number == turn.turn_number)
        {
            return Err(RepositoryError::Conflict);
        }
        recorded.push(turn);
        Ok(())
    }

    fn turns(&self, session_id: &SessionId) -> Result<Vec<ConversationTurn>, RepositoryError> {
        let mut turns = self
            .turns
            .lock()
            .expect("repository mutex poisoned")
            .get(session_id)
            .cloned()
            .unwrap_or_default();
        turns.sort_by_key(|turn| turn.turn_number);
        Ok(turns)
    }

    fn save_flow_state(&self, state: FlowState) -> Result<(), RepositoryError> {
        self.flow_states
            .lock()
            .expect("repository mutex poisoned")
            .insert(state.session_id.clone(), state);
        Ok(())
    }

    fn flow_state(&self, session_id: &SessionId) -> Result<Option<FlowState>, RepositoryError> {
        Ok(self
            .flow_states
            .lock()
            .expect("repository mutex poisoned")
            .get(session_id)
            .cloned())
    }
}

impl QuestionFlowRepository for InMemoryStore {
    fn flow(&self, scope: &FlowScope) -> Result<Option<Vec<QuestionTemplate>>, RepositoryError> {
        Ok(self
            .flows
            .lock()
            .expect("repository mutex poisoned")
            .get(scope)
            .cloned())
    }

    fn store_flow(
        &self,
        scope: FlowScope,
        templates: Vec<QuestionTemplate>,
    ) -> Result<(), RepositoryError> {
        self.flows
            .lock()
            .expect("repository mutex poisoned")
            .insert(scope, templates);
        Ok(())
    }
}

impl ReminderRepository for InMemoryStore {
    fn insert_reminder(&self, reminder: Reminder) -> Result<Reminder, RepositoryError> {
        let mut guard = self.reminders.lock().expect("repository mutex poisoned");
        let duplicate = guard.values().any(|existing| {
            existing.schedule_id == reminder.schedule_id && existing.stage == reminder.stage
        });
        if duplicate || guard.contains_key(&reminder.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(reminder.id.clone(), reminder.clone());
        Ok(reminder)
    }

    fn update_reminder(&self, reminder: Reminder) -> Result<(), RepositoryError> {
        let mut guard = self.reminders.lock().expect("repository mutex poisoned");
        if !guard.contains_key(&reminder.id) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(reminder.id.clone(), reminder);
        Ok(())
    }

    fn fetch_reminder(&self, id: &ReminderId) -> Result<Option<Reminder>, RepositoryError> {
        Ok(self
            .reminders
            .lock()
            .expect("repository mutex poisoned")
            .get(id)
            .cloned())
    }

    fn due_reminders(&self, now: NaiveDateTime) -> Result<Vec<Reminder>, RepositoryError> {
        let mut due: Vec<Reminder> = self
            .reminders
            .lock()
            .expect("repository mutex poisoned")
            .values()
            .filter(|reminder| {
                reminder.status == ReminderStatus::Pending && reminder.send_at <= now
            })
            .cloned()
            .collect();
        due.sort_by_key(|reminder| reminder.send_at);
        Ok(due)
    }

    fn reminders_for_schedule(
        &self,
        schedule_id: &ScheduleId,
    ) -> Result<Vec<Reminder>, RepositoryError> {
        let mut matching: Vec<Reminder> = self
            .reminders
            .lock()
            .expect("repository mutex poisoned")
            .values()
            .filter(|reminder| reminder.schedule_id == *schedule_id)
            .cloned()
            .collect();
        matching.sort_by_key(|reminder| reminder.send_at);
        Ok(matching)
    }
}

/// Voice gateway that fabricates candidate answers, so the call loop can run
/// without a telephony vendor behind it.
pub(crate) struct SimulatedVoice {
    responses: Vec<&'static str>,
    cursor: AtomicUsize,
}

impl Default for SimulatedVoice {
    fn default() -> Self {
        Self {
            responses: vec![
                "I have spent the last few years building backend services and data pipelines.",
                "Seven years across two product companies.",
                "Mainly Rust, SQL, and distributed systems, and I am excited to go deeper.",
                "Yes, I could start within two weeks of an offer.",
                "Somewhere around the advertised range would work for me.",
            ],
            cursor: AtomicUsize::new(0),
        }
    }
}

impl VoiceGateway for SimulatedVoice {
    fn ask(&self, _session_id: &SessionId, _question: &str) -> Result<String, CapabilityError> {
        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % self.responses.len();
        Ok(self.responses[index].to_string())
    }
}

/// Notifier that logs each delivery and keeps an outbox for inspection.
#[derive(Default)]
pub(crate) struct OutboxNotifier {
    messages: Mutex<Vec<ReminderMessage>>,
}

impl OutboxNotifier {
    pub(crate) fn messages(&self) -> Vec<ReminderMessage> {
        self.messages
            .lock()
            .expect("outbox mutex poisoned")
            .clone()
    }
}

impl Notifier for OutboxNotifier {
    fn send(&self, message: &ReminderMessage) -> Result<(), CapabilityError> {
        info!(
            recipient = %message.recipient,
            subject = %message.subject,
            "reminder delivered"
        );
        self.messages
            .lock()
            .expect("outbox mutex poisoned")
            .push(message.clone());
        Ok(())
    }
}

/// Task sink for deferred work. Due entries are picked up by the process-due
/// endpoints, so the dispatcher only records what was handed over.
#[derive(Default)]
pub(crate) struct InMemoryTaskQueue {
    tasks: Mutex<Vec<ScheduledTask>>,
}

impl InMemoryTaskQueue {
    pub(crate) fn tasks(&self) -> Vec<ScheduledTask> {
        self.tasks.lock().expect("task queue mutex poisoned").clone()
    }
}

impl TaskDispatcher for InMemoryTaskQueue {
    fn dispatch(&self, task: ScheduledTask) -> Result<(), CapabilityError> {
        info!(?task, "task queued");
        self.tasks
            .lock()
            .expect("task queue mutex poisoned")
            .push(task);
        Ok(())
    }
}

pub(crate) fn parse_datetime(raw: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(raw.trim(), "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw.trim(), "%Y-%m-%d %H:%M"))
        .map_err(|err| format!("failed to parse '{raw}' as a datetime ({err})"))
}
