use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;
use tracing::{info, warn};

use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::error::RepositoryError;
use crate::workflows::recruiting::repository::{
    ApplicationRepository, CandidateDirectory, JobBoard,
};

use super::capabilities::{Notifier, ReminderMessage, ScheduledTask, TaskDispatcher};
use super::domain::{
    InterviewSchedule, Reminder, ReminderId, ReminderStage, ReminderStatus, ScheduleId,
};
use super::store::{ReminderRepository, ScheduleRepository};
use super::InterviewServiceError;

static REMINDER_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_reminder_id() -> ReminderId {
    let id = REMINDER_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ReminderId(format!("rem-{id:06}"))
}

/// Human wording for how far out the reminder fires.
const fn stage_notice(stage: ReminderStage) -> &'static str {
    match stage {
        ReminderStage::DayBefore => "24 hours",
        ReminderStage::TwoHours => "2 hours",
        ReminderStage::ThirtyMinutes => "30 minutes",
    }
}

/// Outcome of one delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum ReminderDelivery {
    Sent,
    Retrying { next_attempt: NaiveDateTime },
    Abandoned,
}

/// Counters reported by one scan pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReminderScanSummary {
    pub scanned: usize,
    pub dispatched: usize,
    pub skipped: usize,
}

/// Plans, delivers, and retries the notification ladder around each
/// interview. One reminder exists per (schedule, stage); planning is safe to
/// repeat because duplicates are swallowed at the storage layer.
pub struct ReminderService<R> {
    repository: Arc<R>,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
    dispatcher: Arc<dyn TaskDispatcher>,
    max_retries: u32,
}

impl<R> ReminderService<R>
where
    R: ReminderRepository
        + ScheduleRepository
        + ApplicationRepository
        + CandidateDirectory
        + JobBoard
        + 'static,
{
    pub fn new(
        repository: Arc<R>,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn Notifier>,
        dispatcher: Arc<dyn TaskDispatcher>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            repository,
            clock,
            notifier,
            dispatcher,
            max_retries: config.reminder_max_retries,
        }
    }

    /// Creates the reminder ladder for a schedule. Stages whose send time has
    /// already passed are not created; stages that already exist are left
    /// untouched.
    pub fn plan_for_schedule(
        &self,
        schedule: &InterviewSchedule,
    ) -> Result<Vec<Reminder>, InterviewServiceError> {
        let now = self.clock.now();
        let mut created = Vec::new();
        for stage in ReminderStage::ALL {
            let send_at = schedule.interview_date - stage.lead_time();
            if send_at <= now {
                continue;
            }
            let reminder = Reminder {
                id: next_reminder_id(),
                schedule_id: schedule.id.clone(),
                stage,
                status: ReminderStatus::Pending,
                send_at,
                sent_at: None,
                retry_count: 0,
                max_retries: self.max_retries,
                error_message: None,
            };
            match self.repository.insert_reminder(reminder) {
                Ok(reminder) => created.push(reminder),
                Err(RepositoryError::Conflict) => continue,
                Err(err) => return Err(err.into()),
            }
        }
        info!(
            schedule = %schedule.id.0,
            created = created.len(),
            "reminder ladder planned"
        );
        Ok(created)
    }

    /// Scans for due reminders and hands each to the background queue.
    /// Reminders whose schedule is no longer open are skipped.
    pub fn process_due(&self) -> Result<ReminderScanSummary, InterviewServiceError> {
        let now = self.clock.now();
        let due = self.repository.due_reminders(now)?;
        let mut summary = ReminderScanSummary {
            scanned: due.len(),
            ..ReminderScanSummary::default()
        };
        for reminder in due {
            let schedule = self.repository.fetch_schedule(&reminder.schedule_id)?;
            let open = schedule.map(|s| s.status.is_open()).unwrap_or(false);
            if !open {
                summary.skipped += 1;
                continue;
            }
            match self.dispatcher.dispatch(ScheduledTask::SendReminder {
                reminder_id: reminder.id.clone(),
                eta: now,
            }) {
                Ok(()) => summary.dispatched += 1,
                Err(err) => {
                    warn!(reminder = %reminder.id.0, error = %err, "reminder dispatch failed");
                    summary.skipped += 1;
                }
            }
        }
        info!(
            scanned = summary.scanned,
            dispatched = summary.dispatched,
            skipped = summary.skipped,
            "reminder scan complete"
        );
        Ok(summary)
    }

    /// Sends one reminder to both sides of the interview. A notification
    /// failure marks the reminder failed and requeues it with exponential
    /// backoff until the retry budget runs out.
    pub fn deliver(&self, reminder_id: &ReminderId) -> Result<ReminderDelivery, InterviewServiceError> {
        let mut reminder = self
            .repository
            .fetch_reminder(reminder_id)?
            .ok_or(InterviewServiceError::NotFound("reminder"))?;
        let schedule = self
            .repository
            .fetch_schedule(&reminder.schedule_id)?
            .ok_or(InterviewServiceError::NotFound("schedule"))?;
        let application = self
            .repository
            .fetch(&schedule.application_id)?
            .ok_or(InterviewServiceError::NotFound("application"))?;
        let candidate = self
            .repository
            .candidate(&application.candidate_id)?
            .ok_or(InterviewServiceError::NotFound("candidate"))?;
        let job = self
            .repository
            .job(&application.job_id)?
            .ok_or(InterviewServiceError::NotFound("job"))?;

        let subject = format!("Interview Reminder - {}", job.title);
        let body = format!(
            "Hi {}, this is a reminder that your interview for {} at {} starts in {} (on {}).",
            candidate.full_name,
            job.title,
            job.employer_name,
            stage_notice(reminder.stage),
            schedule.interview_date.format("%B %d, %Y at %I:%M %p"),
        );

        let recipients = [candidate.email.as_str(), job.contact_email.as_str()];
        for recipient in recipients {
            let message = ReminderMessage {
                schedule_id: schedule.id.clone(),
                stage: reminder.stage,
                recipient: recipient.to_string(),
                subject: subject.clone(),
                body: body.clone(),
            };
            if let Err(err) = self.notifier.send(&message) {
                return self.handle_failure(reminder, err.to_string());
            }
        }

        reminder.status = ReminderStatus::Sent;
        reminder.sent_at = Some(self.clock.now());
        self.repository.update_reminder(reminder.clone())?;
        info!(
            reminder = %reminder.id.0,
            stage = reminder.stage.label(),
            "reminder sent"
        );
        Ok(ReminderDelivery::Sent)
    }

    /// Flips every pending reminder for the schedule to failed so the scan
    /// never picks them up again.
    pub fn cancel_for_schedule(
        &self,
        schedule_id: &ScheduleId,
    ) -> Result<usize, InterviewServiceError> {
        let mut cancelled = 0;
        for mut reminder in self.repository.reminders_for_schedule(schedule_id)? {
            if reminder.status != ReminderStatus::Pending {
                continue;
            }
            reminder.status = ReminderStatus::Failed;
            reminder.error_message = Some("Interview cancelled".to_string());
            self.repository.update_reminder(reminder)?;
            cancelled += 1;
        }
        info!(schedule = %schedule_id.0, cancelled, "pending reminders cancelled");
        Ok(cancelled)
    }

    fn handle_failure(
        &self,
        mut reminder: Reminder,
        error: String,
    ) -> Result<ReminderDelivery, InterviewServiceError> {
        warn!(reminder = %reminder.id.0, error = %error, "reminder delivery failed");
        reminder.status = ReminderStatus::Failed;
        reminder.error_message = Some(error);
        reminder.retry_count += 1;
        self.repository.update_reminder(reminder.clone())?;

        if !reminder.should_retry() {
            return Ok(ReminderDelivery::Abandoned);
        }
        let delay = Duration::seconds(60 * i64::pow(2, reminder.retry_count));
        let next_attempt = self.clock.now() + delay;
        self.dispatcher.dispatch(ScheduledTask::SendReminder {
            reminder_id: reminder.id.clone(),
            eta: next_attempt,
        })?;
        info!(
            reminder = %reminder.id.0,
            retry = reminder.retry_count,
            at = %next_attempt,
            "reminder requeued"
        );
        Ok(ReminderDelivery::Retrying { next_attempt })
    }
}
