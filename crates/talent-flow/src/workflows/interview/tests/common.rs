use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, NaiveDateTime};

use crate::clock::FixedClock;
use crate::config::EngineConfig;
use crate::error::RepositoryError;
use crate::workflows::interview::capabilities::{
    CapabilityError, Notifier, ReminderMessage, ScheduledTask, TaskDispatcher, VoiceGateway,
};
use crate::workflows::interview::domain::{
    AvailabilityRule, CallId, CallQueueEntry, CallStatus, ConversationTurn, FlowScope, FlowState,
    InterviewSchedule, InterviewSession, PartyRef, QuestionTemplate, Reminder, ReminderId,
    ReminderStatus, ScheduleId, SessionId,
};
use crate::workflows::interview::orchestrator::CallOrchestrator;
use crate::workflows::interview::reminders::ReminderService;
use crate::workflows::interview::scheduler::InterviewScheduler;
use crate::workflows::interview::store::{
    CallQueueRepository, QuestionFlowRepository, ReminderRepository, ScheduleRepository,
    SessionRepository,
};
use crate::workflows::recruiting::domain::{
    ApplicationId, ApplicationStatus, AutomationSettings, CandidateId, CandidateProfile,
    EmployerId, JobId, JobPosting, JobStatus, StatusChange,
};
use crate::workflows::recruiting::repository::{
    ApplicationRecord, ApplicationRepository, CandidateDirectory, JobBoard,
};

/// In-memory store implementing the full interview storage surface.
#[derive(Default)]
pub(super) struct MemoryStore {
    applications: Mutex<HashMap<ApplicationId, ApplicationRecord>>,
    history: Mutex<HashMap<ApplicationId, Vec<StatusChange>>>,
    candidates: Mutex<HashMap<CandidateId, CandidateProfile>>,
    jobs: Mutex<HashMap<JobId, JobPosting>>,
    schedules: Mutex<Vec<InterviewSchedule>>,
    rules: Mutex<Vec<AvailabilityRule>>,
    entries: Mutex<Vec<CallQueueEntry>>,
    sessions: Mutex<Vec<InterviewSession>>,
    turns: Mutex<Vec<ConversationTurn>>,
    flow_states: Mutex<HashMap<SessionId, FlowState>>,
    flows: Mutex<HashMap<FlowScope, Vec<QuestionTemplate>>>,
    reminders: Mutex<Vec<Reminder>>,
}

fn party_matches(schedule: &InterviewSchedule, party: &PartyRef) -> bool {
    match party {
        PartyRef::Candidate(id) => schedule.candidate_id == *id,
        PartyRef::Employer(id) => schedule.employer_id == *id,
    }
}

impl ScheduleRepository for MemoryStore {
    fn insert_schedule(
        &self,
        schedule: InterviewSchedule,
    ) -> Result<InterviewSchedule, RepositoryError> {
        let mut guard = self.schedules.lock().expect("repository mutex poisoned");
        if guard.iter().any(|existing| existing.id == schedule.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(schedule.clone());
        Ok(schedule)
    }

    fn update_schedule(&self, schedule: InterviewSchedule) -> Result<(), RepositoryError> {
        let mut guard = self.schedules.lock().expect("repository mutex poisoned");
        match guard.iter_mut().find(|existing| existing.id == schedule.id) {
            Some(existing) => {
                *existing = schedule;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch_schedule(
        &self,
        id: &ScheduleId,
    ) -> Result<Option<InterviewSchedule>, RepositoryError> {
        Ok(self
            .schedules
            .lock()
            .expect("repository mutex poisoned")
            .iter()
            .find(|schedule| schedule.id == *id)
            .cloned())
    }

    fn open_schedules(&self, party: &PartyRef) -> Result<Vec<InterviewSchedule>, RepositoryError> {
        Ok(self
            .schedules
            .lock()
            .expect("repository mutex poisoned")
            .iter()
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

impl CallQueueRepository for MemoryStore {
    fn enqueue(&self, entry: CallQueueEntry) -> Result<CallQueueEntry, RepositoryError> {
        let mut guard = self.entries.lock().expect("repository mutex poisoned");
        let active = guard.iter().any(|existing| {
            existing.application_id == entry.application_id && existing.status.is_active()
        });
        if active {
            return Err(RepositoryError::Conflict);
        }
        guard.push(entry.clone());
        Ok(entry)
    }

    fn update_entry(&self, entry: CallQueueEntry) -> Result<(), RepositoryError> {
        let mut guard = self.entries.lock().expect("repository mutex poisoned");
        match guard.iter_mut().find(|existing| existing.id == entry.id) {
            Some(existing) => {
                *existing = entry;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch_entry(&self, id: &CallId) -> Result<Option<CallQueueEntry>, RepositoryError> {
        Ok(self
            .entries
            .lock()
            .expect("repository mutex poisoned")
            .iter()
            .find(|entry| entry.id == *id)
            .cloned())
    }

    fn active_entry_for_application(
        &self,
        application_id: &ApplicationId,
    ) -> Result<Option<CallQueueEntry>, RepositoryError> {
        Ok(self
            .entries
            .lock()
            .expect("repository mutex poisoned")
            .iter()
            .find(|entry| entry.application_id == *application_id && entry.status.is_active())
            .cloned())
    }

    fn latest_entry_for_application(
        &self,
        application_id: &ApplicationId,
    ) -> Result<Option<CallQueueEntry>, RepositoryError> {
        Ok(self
            .entries
            .lock()
            .expect("repository mutex poisoned")
            .iter()
            .filter(|entry| entry.application_id == *application_id)
            .max_by_key(|entry| entry.scheduled_at)
            .cloned())
    }

    fn due_entries(&self, now: NaiveDateTime) -> Result<Vec<CallQueueEntry>, RepositoryError> {
        let mut due: Vec<CallQueueEntry> = self
            .entries
            .lock()
            .expect("repository mutex poisoned")
            .iter()
            .filter(|entry| {
                entry.status == CallStatus::Queued && entry.scheduled_at <= now
            })
            .cloned()
            .collect();
        due.sort_by_key(|entry| entry.scheduled_at);
        Ok(due)
    }
}

impl SessionRepository for MemoryStore {
    fn insert_session(
        &self,
        session: InterviewSession,
    ) -> Result<InterviewSession, RepositoryError> {
        let mut guard = self.sessions.lock().expect("repository mutex poisoned");
        if guard.iter().any(|existing| existing.id == session.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(session.clone());
        Ok(session)
    }

    fn update_session(&self, session: InterviewSession) -> Result<(), RepositoryError> {
        let mut guard = self.sessions.lock().expect("repository mutex poisoned");
        match guard.iter_mut().find(|existing| existing.id == session.id) {
            Some(existing) => {
                *existing = session;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch_session(&self, id: &SessionId) -> Result<Option<InterviewSession>, RepositoryError> {
        Ok(self
            .sessions
            .lock()
            .expect("repository mutex poisoned")
            .iter()
            .find(|session| session.id == *id)
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
            .iter()
            .filter(|session| session.application_id == *application_id)
            .max_by_key(|session| session.started_at)
            .cloned())
    }

    fn append_turn(&self, turn: ConversationTurn) -> Result<(), RepositoryError> {
        let mut guard = self.turns.lock().expect("repository mutex poisoned");
        let duplicate = guard.iter().any(|existing| {
            existing.session_id == turn.session_id && existing.turn_number == turn.turn_number
        });
        if duplicate {
            return Err(RepositoryError::Conflict);
        }
        guard.push(turn);
        Ok(())
    }

    fn turns(&self, session_id: &SessionId) -> Result<Vec<ConversationTurn>, RepositoryError> {
        let mut turns: Vec<ConversationTurn> = self
            .turns
            .lock()
            .expect("repository mutex poisoned")
            .iter()
            .filter(|turn| turn.session_id == *session_id)
            .cloned()
            .collect();
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

impl QuestionFlowRepository for MemoryStore {
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

impl ReminderRepository for MemoryStore {
    fn insert_reminder(&self, reminder: Reminder) -> Result<Reminder, RepositoryError> {
        let mut guard = self.reminders.lock().expect("repository mutex poisoned");
        let duplicate = guard.iter().any(|existing| {
            existing.schedule_id == reminder.schedule_id && existing.stage == reminder.stage
        });
        if duplicate {
            return Err(RepositoryError::Conflict);
        }
        guard.push(reminder.clone());
        Ok(reminder)
    }

    fn update_reminder(&self, reminder: Reminder) -> Result<(), RepositoryError> {
        let mut guard = self.reminders.lock().expect("repository mutex poisoned");
        match guard.iter_mut().find(|existing| existing.id == reminder.id) {
            Some(existing) => {
                *existing = reminder;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch_reminder(&self, id: &ReminderId) -> Result<Option<Reminder>, RepositoryError> {
        Ok(self
            .reminders
            .lock()
            .expect("repository mutex poisoned")
            .iter()
            .find(|reminder| reminder.id == *id)
            .cloned())
    }

    fn due_reminders(&self, now: NaiveDateTime) -> Result<Vec<Reminder>, RepositoryError> {
        let mut due: Vec<Reminder> = self
            .reminders
            .lock()
            .expect("repository mutex poisoned")
            .iter()
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
        Ok(self
            .reminders
            .lock()
            .expect("repository mutex poisoned")
            .iter()
            .filter(|reminder| reminder.schedule_id == *schedule_id)
            .cloned()
            .collect())
    }
}

impl ApplicationRepository for MemoryStore {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        self.applications
            .lock()
            .expect("repository mutex poisoned")
            .insert(record.id.clone(), record.clone());
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

    fn pending_for_job(&self, _job_id: &JobId) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        Ok(Vec::new())
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

impl CandidateDirectory for MemoryStore {
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

impl JobBoard for MemoryStore {
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

/// Voice gateway that replays a scripted answer list, one per question.
/// Running past the script yields empty answers.
pub(super) struct ScriptedVoice {
    script: Mutex<VecDeque<Result<String, String>>>,
}

impl ScriptedVoice {
    pub(super) fn new(answers: &[&str]) -> Self {
        Self {
            script: Mutex::new(
                answers
                    .iter()
                    .map(|answer| Ok(answer.to_string()))
                    .collect(),
            ),
        }
    }

    pub(super) fn with_script(script: Vec<Result<String, String>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
        }
    }
}

impl VoiceGateway for ScriptedVoice {
    fn ask(&self, _session_id: &SessionId, _question: &str) -> Result<String, CapabilityError> {
        match self
            .script
            .lock()
            .expect("script mutex poisoned")
            .pop_front()
        {
            Some(Ok(answer)) => Ok(answer),
            Some(Err(message)) => Err(CapabilityError::Transport(message)),
            None => Ok(String::new()),
        }
    }
}

/// Notifier that records every message and can be told to fail upcoming sends.
#[derive(Default)]
pub(super) struct RecordingNotifier {
    pub(super) sent: Mutex<Vec<ReminderMessage>>,
    failures_left: Mutex<u32>,
}

impl RecordingNotifier {
    pub(super) fn fail_next(&self, count: u32) {
        *self.failures_left.lock().expect("notifier mutex poisoned") = count;
    }
}

impl Notifier for RecordingNotifier {
    fn send(&self, message: &ReminderMessage) -> Result<(), CapabilityError> {
        let mut failures = self.failures_left.lock().expect("notifier mutex poisoned");
        if *failures > 0 {
            *failures -= 1;
            return Err(CapabilityError::Transport("smtp unavailable".to_string()));
        }
        self.sent
            .lock()
            .expect("notifier mutex poisoned")
            .push(message.clone());
        Ok(())
    }
}

/// Dispatcher that records every task instead of executing it.
#[derive(Default)]
pub(super) struct RecordingDispatcher {
    pub(super) tasks: Mutex<Vec<ScheduledTask>>,
}

impl RecordingDispatcher {
    pub(super) fn recorded(&self) -> Vec<ScheduledTask> {
        self.tasks
            .lock()
            .expect("dispatcher mutex poisoned")
            .clone()
    }
}

impl TaskDispatcher for RecordingDispatcher {
    fn dispatch(&self, task: ScheduledTask) -> Result<(), CapabilityError> {
        self.tasks
            .lock()
            .expect("dispatcher mutex poisoned")
            .push(task);
        Ok(())
    }
}

/// Monday, mid-morning.
pub(super) fn test_now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 3, 2)
        .expect("valid date")
        .and_hms_opt(10, 0, 0)
        .expect("valid time")
}

pub(super) fn candidate() -> CandidateProfile {
    CandidateProfile {
        id: CandidateId("cand-1".to_string()),
        full_name: "Asha Rao".to_string(),
        email: "asha@example.com".to_string(),
        phone: "+15550100".to_string(),
        skills: vec!["rust".to_string(), "sql".to_string()],
        education: "BSc Computer Science".to_string(),
        experience_years: 5,
        expected_salary: Some(90_000),
        available_for_call: true,
    }
}

pub(super) fn job() -> JobPosting {
    JobPosting {
        id: JobId("job-1".to_string()),
        title: "Backend Engineer".to_string(),
        employer_id: EmployerId("emp-1".to_string()),
        employer_name: "Acme".to_string(),
        contact_email: "talent@acme.example.com".to_string(),
        skills_required: vec!["rust".to_string(), "sql".to_string()],
        experience: Some("3+ years".to_string()),
        salary_min: Some(70_000),
        salary_max: Some(100_000),
        status: JobStatus::Published,
        automation: AutomationSettings::default(),
    }
}

/// Seeds candidate, job, and one application, returning the application id.
pub(super) fn seed_application(store: &MemoryStore, status: ApplicationStatus) -> ApplicationId {
    store.upsert_candidate(candidate()).expect("candidate stored");
    store.upsert_job(job()).expect("job stored");
    let id = ApplicationId("app-000001".to_string());
    store
        .insert(ApplicationRecord {
            id: id.clone(),
            candidate_id: CandidateId("cand-1".to_string()),
            job_id: JobId("job-1".to_string()),
            status,
            match_score: Some(82.0),
            breakdown: None,
            applied_at: test_now(),
        })
        .expect("application stored");
    id
}

pub(super) fn build_scheduler(
    store: &Arc<MemoryStore>,
    clock: &Arc<FixedClock>,
) -> InterviewScheduler<MemoryStore> {
    InterviewScheduler::new(store.clone(), clock.clone(), &EngineConfig::default())
}

pub(super) fn build_reminder_service(
    store: &Arc<MemoryStore>,
    clock: &Arc<FixedClock>,
    notifier: &Arc<RecordingNotifier>,
    dispatcher: &Arc<RecordingDispatcher>,
) -> ReminderService<MemoryStore> {
    ReminderService::new(
        store.clone(),
        clock.clone(),
        notifier.clone(),
        dispatcher.clone(),
        &EngineConfig::default(),
    )
}

pub(super) fn build_orchestrator(
    store: &Arc<MemoryStore>,
    clock: &Arc<FixedClock>,
    voice: &Arc<ScriptedVoice>,
    dispatcher: &Arc<RecordingDispatcher>,
) -> CallOrchestrator<MemoryStore> {
    CallOrchestrator::new(
        store.clone(),
        clock.clone(),
        voice.clone(),
        dispatcher.clone(),
        &EngineConfig::default(),
    )
}
