use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::workflows::recruiting::repository::{
    ApplicationRepository, CandidateDirectory, JobBoard,
};
use crate::workflows::recruiting::{ApplicationId, JobId};

use super::answers::AnswerEvaluator;
use super::capabilities::{ScheduledTask, TaskDispatcher, VoiceGateway};
use super::domain::{
    CallId, CallOutcome, CallQueueEntry, CallStatus, ConversationTurn, FlowScope, FlowState,
    InterviewSession, QuestionTemplate, SessionId, SessionStatus,
};
use super::eligibility::{EligibilityChecks, EligibilityGate};
use super::questions::{FlowStep, QuestionFlowEngine};
use super::scorer::InterviewScorer;
use super::store::{CallQueueRepository, QuestionFlowRepository, SessionRepository};
use super::InterviewServiceError;

/// Seconds of call time attributed to each recorded turn.
const SECONDS_PER_TURN: i64 = 20;

static CALL_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_call_id() -> CallId {
    let id = CALL_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    CallId(format!("call-{id:06}"))
}

fn next_session_id(queue_id: &CallId) -> SessionId {
    let token = Uuid::new_v4().simple().to_string();
    SessionId(format!("AI-{}-{}", queue_id.0, &token[..8]))
}

/// Result of asking for a call to be queued.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum CallScheduleOutcome {
    Scheduled { entry: CallQueueEntry },
    NotEligible { checks: EligibilityChecks },
}

/// Result of one execution attempt against a queue entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum CallExecution {
    Completed { session: InterviewSession },
    Retrying { next_attempt: NaiveDateTime },
    Abandoned,
}

/// Counters reported by one queue scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CallScanSummary {
    pub processed: usize,
    pub failed: usize,
}

/// Drives the automated screening call end to end: eligibility, queueing,
/// the question loop, scoring, and retry bookkeeping.
///
/// The queue entry is the unit of mutual exclusion; the storage layer refuses
/// a second active entry per application, so two scans can never place
/// concurrent calls to the same candidate.
pub struct CallOrchestrator<R> {
    repository: Arc<R>,
    clock: Arc<dyn Clock>,
    voice: Arc<dyn VoiceGateway>,
    dispatcher: Arc<dyn TaskDispatcher>,
    gate: EligibilityGate,
    engine: QuestionFlowEngine,
    evaluator: AnswerEvaluator,
    scorer: InterviewScorer,
    max_retries: u32,
}

impl<R> CallOrchestrator<R>
where
    R: CallQueueRepository
        + SessionRepository
        + QuestionFlowRepository
        + ApplicationRepository
        + CandidateDirectory
        + JobBoard
        + 'static,
{
    pub fn new(
        repository: Arc<R>,
        clock: Arc<dyn Clock>,
        voice: Arc<dyn VoiceGateway>,
        dispatcher: Arc<dyn TaskDispatcher>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            repository,
            clock,
            voice,
            dispatcher,
            gate: EligibilityGate::new(config),
            engine: QuestionFlowEngine,
            evaluator: AnswerEvaluator,
            scorer: InterviewScorer,
            max_retries: config.max_call_retries,
        }
    }

    /// Queues a call for an eligible application and hands execution to the
    /// background queue at the chosen slot.
    pub fn schedule_call(
        &self,
        application_id: &ApplicationId,
        trigger_reason: &str,
    ) -> Result<CallScheduleOutcome, InterviewServiceError> {
        let application = self
            .repository
            .fetch(application_id)?
            .ok_or(InterviewServiceError::NotFound("application"))?;
        let job = self
            .repository
            .job(&application.job_id)?
            .ok_or(InterviewServiceError::NotFound("job"))?;
        let candidate = self
            .repository
            .candidate(&application.candidate_id)?
            .ok_or(InterviewServiceError::NotFound("candidate"))?;

        let has_active_call = self
            .repository
            .active_entry_for_application(application_id)?
            .is_some();
        let report = self.gate.assess(&application, &job, &candidate, has_active_call);
        if !report.eligible {
            info!(
                application = %application_id.0,
                checks = ?report.checks,
                "application not eligible for a call"
            );
            return Ok(CallScheduleOutcome::NotEligible {
                checks: report.checks,
            });
        }

        let scheduled_at = self.gate.next_call_slot(self.clock.now());
        let entry = CallQueueEntry {
            id: next_call_id(),
            application_id: application_id.clone(),
            status: CallStatus::Queued,
            trigger_reason: trigger_reason.to_string(),
            scheduled_at,
            started_at: None,
            completed_at: None,
            retry_count: 0,
            max_retries: self.max_retries,
            error_message: None,
            call_duration_seconds: None,
        };
        let entry = self.repository.enqueue(entry)?;
        self.dispatcher.dispatch(ScheduledTask::ExecuteCall {
            queue_id: entry.id.clone(),
            eta: scheduled_at,
        })?;

        info!(
            call = %entry.id.0,
            application = %application_id.0,
            at = %scheduled_at,
            reason = trigger_reason,
            "call queued"
        );
        Ok(CallScheduleOutcome::Scheduled { entry })
    }

    /// Runs one queued call. A failure anywhere in the interview marks the
    /// entry failed and requeues it with exponential backoff until the retry
    /// budget is spent.
    pub fn execute_call(&self, call_id: &CallId) -> Result<CallExecution, InterviewServiceError> {
        let mut entry = self
            .repository
            .fetch_entry(call_id)?
            .ok_or(InterviewServiceError::NotFound("call"))?;

        entry.status = CallStatus::InProgress;
        entry.started_at = Some(self.clock.now());
        self.repository.update_entry(entry.clone())?;

        match self.run_interview(&entry) {
            Ok((session, turn_count)) => {
                entry.status = CallStatus::Completed;
                entry.completed_at = Some(self.clock.now());
                entry.call_duration_seconds = Some(turn_count as i64 * SECONDS_PER_TURN);
                self.repository.update_entry(entry.clone())?;
                info!(call = %entry.id.0, session = %session.id.0, "call completed");
                Ok(CallExecution::Completed { session })
            }
            Err(err) => self.handle_failure(entry, err),
        }
    }

    /// Scans for queued entries whose slot has arrived and dispatches each.
    pub fn process_pending(&self) -> Result<CallScanSummary, InterviewServiceError> {
        let now = self.clock.now();
        let mut summary = CallScanSummary::default();
        for entry in self.repository.due_entries(now)? {
            match self.dispatcher.dispatch(ScheduledTask::ExecuteCall {
                queue_id: entry.id.clone(),
                eta: now,
            }) {
                Ok(()) => summary.processed += 1,
                Err(err) => {
                    warn!(call = %entry.id.0, error = %err, "call dispatch failed");
                    summary.failed += 1;
                }
            }
        }
        info!(
            processed = summary.processed,
            failed = summary.failed,
            "pending call scan complete"
        );
        Ok(summary)
    }

    pub fn queue_entry(&self, call_id: &CallId) -> Result<CallQueueEntry, InterviewServiceError> {
        self.repository
            .fetch_entry(call_id)?
            .ok_or(InterviewServiceError::NotFound("call"))
    }

    pub fn latest_session(
        &self,
        application_id: &ApplicationId,
    ) -> Result<Option<InterviewSession>, InterviewServiceError> {
        Ok(self.repository.latest_session_for_application(application_id)?)
    }

    pub fn session_turns(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<ConversationTurn>, InterviewServiceError> {
        Ok(self.repository.turns(session_id)?)
    }

    /// Installs a question flow for a job or the shared default.
    pub fn configure_flow(
        &self,
        scope: FlowScope,
        templates: Vec<QuestionTemplate>,
    ) -> Result<(), InterviewServiceError> {
        if templates.is_empty() {
            return Err(InterviewServiceError::Validation(
                "question flow must contain at least one template".to_string(),
            ));
        }
        self.repository.store_flow(scope, templates)?;
        Ok(())
    }

    /// Installs the built-in default flow unless one is already stored.
    /// Run once at startup; call execution itself never writes flow storage.
    pub fn seed_default_flow(&self) -> Result<bool, InterviewServiceError> {
        if self.repository.flow(&FlowScope::Default)?.is_some() {
            return Ok(false);
        }
        self.repository
            .store_flow(FlowScope::Default, QuestionFlowEngine::built_in())?;
        info!("default question flow installed");
        Ok(true)
    }

    /// The flow a call for this job would walk, after fallbacks.
    pub fn resolved_flow(
        &self,
        job_id: &JobId,
    ) -> Result<Vec<QuestionTemplate>, InterviewServiceError> {
        Ok(self.engine.resolve(self.repository.as_ref(), job_id)?)
    }

    fn run_interview(
        &self,
        entry: &CallQueueEntry,
    ) -> Result<(InterviewSession, usize), InterviewServiceError> {
        let application = self
            .repository
            .fetch(&entry.application_id)?
            .ok_or(InterviewServiceError::NotFound("application"))?;

        let mut session = InterviewSession {
            id: next_session_id(&entry.id),
            queue_id: entry.id.clone(),
            application_id: entry.application_id.clone(),
            status: SessionStatus::Active,
            outcome: CallOutcome::Pending,
            sentiment_score: None,
            summary: None,
            transcript: None,
            score: None,
            started_at: self.clock.now(),
            completed_at: None,
        };
        session = self.repository.insert_session(session)?;

        let flow = self.engine.resolve(self.repository.as_ref(), &application.job_id)?;
        let mut state = FlowState::new(session.id.clone());
        self.repository.save_flow_state(state.clone())?;

        let mut turns: Vec<ConversationTurn> = Vec::new();
        let mut previous_answer: Option<String> = None;
        let mut turn_number: u32 = 1;

        loop {
            let step = self
                .engine
                .next_question(&flow, &mut state, previous_answer.as_deref());
            let question = match step {
                FlowStep::Complete => break,
                FlowStep::Ask(question) => question,
            };

            let answer = match self.voice.ask(&session.id, &question.text) {
                Ok(answer) => answer,
                Err(err) => {
                    warn!(
                        session = %session.id.0,
                        turn = turn_number,
                        error = %err,
                        "voice channel failed, recording unanswered turn"
                    );
                    String::new()
                }
            };

            let evaluation = if answer.trim().is_empty() {
                None
            } else {
                Some(self.evaluator.evaluate(&question.text, &answer, question.category))
            };
            let turn = ConversationTurn {
                session_id: session.id.clone(),
                turn_number,
                question: question.text.clone(),
                category: question.category,
                answer: answer.clone(),
                evaluation,
                follow_up: question.follow_up,
                asked_at: self.clock.now(),
            };
            self.repository.append_turn(turn.clone())?;
            turns.push(turn);

            self.engine.record_answer(&mut state, &answer);
            if !question.follow_up {
                self.engine.advance(&mut state);
            }
            self.repository.save_flow_state(state.clone())?;

            previous_answer = Some(answer);
            turn_number += 1;
        }

        session.transcript = Some(render_transcript(&turns));
        match self.scorer.score(&session.id, &turns) {
            Ok(summary) => session.score = Some(summary),
            Err(err) => warn!(session = %session.id.0, error = %err, "score calculation failed"),
        }

        let answered: Vec<&ConversationTurn> = turns
            .iter()
            .filter(|turn| !turn.answer.trim().is_empty())
            .collect();
        let positive = answered
            .iter()
            .filter(|turn| {
                turn.evaluation
                    .as_ref()
                    .map(|evaluation| evaluation.annotations.sentiment.is_positive())
                    .unwrap_or(false)
            })
            .count();
        let sentiment = if answered.is_empty() {
            0.0
        } else {
            positive as f64 / answered.len() as f64
        };

        session.outcome = if answered.is_empty() {
            CallOutcome::NoResponse
        } else if sentiment >= 0.5 {
            CallOutcome::Interested
        } else {
            CallOutcome::NotInterested
        };
        session.sentiment_score = Some(sentiment);
        session.summary = Some(format!(
            "Interview completed with {} of {} questions answered",
            answered.len(),
            turns.len()
        ));
        session.status = SessionStatus::Completed;
        session.completed_at = Some(self.clock.now());
        self.repository.update_session(session.clone())?;

        Ok((session, turns.len()))
    }

    fn handle_failure(
        &self,
        mut entry: CallQueueEntry,
        err: InterviewServiceError,
    ) -> Result<CallExecution, InterviewServiceError> {
        warn!(call = %entry.id.0, error = %err, "call execution failed");
        entry.status = CallStatus::Failed;
        entry.error_message = Some(err.to_string());
        entry.retry_count += 1;
        self.repository.update_entry(entry.clone())?;

        if !entry.should_retry() {
            return Ok(CallExecution::Abandoned);
        }
        let delay = Duration::seconds(60 * i64::pow(2, entry.retry_count));
        let next_attempt = self.clock.now() + delay;
        self.dispatcher.dispatch(ScheduledTask::ExecuteCall {
            queue_id: entry.id.clone(),
            eta: next_attempt,
        })?;
        info!(
            call = %entry.id.0,
            retry = entry.retry_count,
            at = %next_attempt,
            "call requeued"
        );
        Ok(CallExecution::Retrying { next_attempt })
    }
}

fn render_transcript(turns: &[ConversationTurn]) -> String {
    turns
        .iter()
        .map(|turn| format!("Q: {}\nA: {}", turn.question, turn.answer))
        .collect::<Vec<_>>()
        .join("\n")
}
