use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{Duration, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::workflows::recruiting::repository::{
    ApplicationRecord, ApplicationRepository, CandidateDirectory, JobBoard,
};
use crate::workflows::recruiting::{
    status, ApplicationId, ApplicationStatus, JobPosting, StatusChange,
};

use super::domain::{AvailabilityRule, InterviewSchedule, PartyRef, ScheduleId, ScheduleStatus};
use super::store::ScheduleRepository;
use super::InterviewServiceError;

/// Actor recorded on status changes made while booking interviews.
pub const SCHEDULER_ACTOR: &str = "scheduler";

pub const DEFAULT_DAYS_AHEAD: u32 = 7;
pub const DEFAULT_MAX_SLOTS: usize = 10;

static SCHEDULE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_schedule_id() -> ScheduleId {
    let id = SCHEDULE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ScheduleId(format!("sch-{id:06}"))
}

/// Which side of the interview is confirming or declining.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmingParty {
    Candidate,
    Employer,
}

/// Books interviews into the first mutually free slot and walks schedules
/// through their confirm/reschedule/decline lifecycle.
pub struct InterviewScheduler<R> {
    repository: Arc<R>,
    clock: Arc<dyn Clock>,
    slot_duration: Duration,
    buffer: Duration,
    max_reschedules: u32,
    fallback_start: NaiveTime,
    fallback_end: NaiveTime,
}

impl<R> InterviewScheduler<R>
where
    R: ScheduleRepository + ApplicationRepository + CandidateDirectory + JobBoard + 'static,
{
    pub fn new(repository: Arc<R>, clock: Arc<dyn Clock>, config: &EngineConfig) -> Self {
        Self {
            repository,
            clock,
            slot_duration: Duration::minutes(config.slot_duration_minutes),
            buffer: Duration::minutes(config.slot_buffer_minutes),
            max_reschedules: config.max_reschedules,
            fallback_start: config.call_window_start,
            fallback_end: config.call_window_end,
        }
    }

    /// Mutually free slots for both parties, soonest first. Slots in the past
    /// are never offered, even when today's availability window has already
    /// opened.
    pub fn find_available_slots(
        &self,
        application_id: &ApplicationId,
        days_ahead: u32,
        max_slots: usize,
    ) -> Result<Vec<NaiveDateTime>, InterviewServiceError> {
        let (application, job) = self.application_context(application_id)?;
        let candidate = PartyRef::Candidate(application.candidate_id.clone());
        let employer = PartyRef::Employer(job.employer_id.clone());

        let candidate_rules = self.rules_or_default(&candidate)?;
        let employer_rules = self.rules_or_default(&employer)?;

        let now = self.clock.now();
        let mut slots = Vec::new();

        for day_offset in 0..i64::from(days_ahead) {
            let date = now.date() + Duration::days(day_offset);
            let employer_day: Vec<&AvailabilityRule> = employer_rules
                .iter()
                .filter(|rule| rule.applies_on(date))
                .collect();
            let candidate_day: Vec<&AvailabilityRule> = candidate_rules
                .iter()
                .filter(|rule| rule.applies_on(date))
                .collect();
            if employer_day.is_empty() || candidate_day.is_empty() {
                continue;
            }

            for employer_rule in &employer_day {
                for candidate_rule in &candidate_day {
                    let overlap_start = employer_rule.start_time.max(candidate_rule.start_time);
                    let overlap_end = employer_rule.end_time.min(candidate_rule.end_time);
                    if overlap_start >= overlap_end {
                        continue;
                    }

                    let mut current = date.and_time(overlap_start);
                    let window_end = date.and_time(overlap_end);
                    while current + self.slot_duration <= window_end {
                        if current >= now && !self.has_conflict(&candidate, &employer, current)? {
                            slots.push(current);
                            if slots.len() >= max_slots {
                                return Ok(slots);
                            }
                        }
                        current += self.slot_duration + self.buffer;
                    }
                }
            }
        }

        Ok(slots)
    }

    /// Books an interview at `requested`, or at the first free slot when no
    /// date is given and auto-booking is on. Moves the application to
    /// `interview_scheduled`.
    pub fn schedule_interview(
        &self,
        application_id: &ApplicationId,
        requested: Option<NaiveDateTime>,
        auto_schedule: bool,
    ) -> Result<InterviewSchedule, InterviewServiceError> {
        let (application, job) = self.application_context(application_id)?;

        let interview_date = match requested {
            Some(date) => date,
            None if auto_schedule => {
                let slots = self.find_available_slots(application_id, DEFAULT_DAYS_AHEAD, 1)?;
                *slots.first().ok_or_else(|| {
                    InterviewServiceError::Validation("No available slots found".to_string())
                })?
            }
            None => {
                return Err(InterviewServiceError::Validation(
                    "Interview date required".to_string(),
                ))
            }
        };

        let now = self.clock.now();
        if interview_date < now {
            return Err(InterviewServiceError::Validation(
                "Interview date must be in the future".to_string(),
            ));
        }

        let schedule = InterviewSchedule {
            id: next_schedule_id(),
            application_id: application.id.clone(),
            candidate_id: application.candidate_id.clone(),
            employer_id: job.employer_id.clone(),
            interview_date,
            duration_minutes: self.slot_duration.num_minutes(),
            status: ScheduleStatus::Pending,
            candidate_confirmed: false,
            employer_confirmed: false,
            reschedule_count: 0,
            max_reschedules: self.max_reschedules,
            previous_schedule: None,
            created_at: now,
        };
        let schedule = self.repository.insert_schedule(schedule)?;

        if application.status != ApplicationStatus::InterviewScheduled {
            self.mark_interview_scheduled(application)?;
        }

        info!(
            schedule = %schedule.id.0,
            application = %schedule.application_id.0,
            at = %schedule.interview_date,
            "interview scheduled"
        );
        Ok(schedule)
    }

    /// Records one side's confirmation; the schedule flips to confirmed once
    /// both sides have agreed. Confirming an already confirmed schedule is a
    /// no-op.
    pub fn confirm(
        &self,
        schedule_id: &ScheduleId,
        party: ConfirmingParty,
    ) -> Result<InterviewSchedule, InterviewServiceError> {
        let mut schedule = self.fetch_schedule(schedule_id)?;
        match schedule.status {
            ScheduleStatus::Pending => {
                match party {
                    ConfirmingParty::Candidate => schedule.candidate_confirmed = true,
                    ConfirmingParty::Employer => schedule.employer_confirmed = true,
                }
                if schedule.is_confirmed() {
                    schedule.status = ScheduleStatus::Confirmed;
                    info!(schedule = %schedule.id.0, "interview confirmed by both parties");
                }
                self.repository.update_schedule(schedule.clone())?;
                Ok(schedule)
            }
            ScheduleStatus::Confirmed => Ok(schedule),
            _ => Err(InterviewServiceError::Conflict(format!(
                "schedule is {} and can no longer be confirmed",
                schedule.status.label()
            ))),
        }
    }

    /// Replaces an open schedule with a new one at `new_date`, keeping the
    /// old record as the back-reference. Bounded by the reschedule limit.
    pub fn reschedule(
        &self,
        schedule_id: &ScheduleId,
        new_date: NaiveDateTime,
    ) -> Result<InterviewSchedule, InterviewServiceError> {
        let mut schedule = self.fetch_schedule(schedule_id)?;
        if !schedule.status.is_open() {
            return Err(InterviewServiceError::Conflict(format!(
                "schedule is {} and cannot be rescheduled",
                schedule.status.label()
            )));
        }
        if !schedule.can_reschedule() {
            return Err(InterviewServiceError::Conflict(
                "Maximum reschedule limit reached".to_string(),
            ));
        }
        if new_date < self.clock.now() {
            return Err(InterviewServiceError::Validation(
                "New date must be in the future".to_string(),
            ));
        }

        let candidate = PartyRef::Candidate(schedule.candidate_id.clone());
        let employer = PartyRef::Employer(schedule.employer_id.clone());
        if self.has_conflict(&candidate, &employer, new_date)? {
            return Err(InterviewServiceError::Conflict(
                "Time slot has conflicts".to_string(),
            ));
        }

        let replacement = InterviewSchedule {
            id: next_schedule_id(),
            application_id: schedule.application_id.clone(),
            candidate_id: schedule.candidate_id.clone(),
            employer_id: schedule.employer_id.clone(),
            interview_date: new_date,
            duration_minutes: schedule.duration_minutes,
            status: ScheduleStatus::Pending,
            candidate_confirmed: false,
            employer_confirmed: false,
            reschedule_count: schedule.reschedule_count + 1,
            max_reschedules: schedule.max_reschedules,
            previous_schedule: Some(schedule.id.clone()),
            created_at: self.clock.now(),
        };
        let replacement = self.repository.insert_schedule(replacement)?;

        schedule.status = ScheduleStatus::Rescheduled;
        self.repository.update_schedule(schedule)?;

        info!(
            schedule = %replacement.id.0,
            previous = ?replacement.previous_schedule.as_ref().map(|id| &id.0),
            at = %replacement.interview_date,
            "interview rescheduled"
        );
        Ok(replacement)
    }

    pub fn decline(&self, schedule_id: &ScheduleId) -> Result<InterviewSchedule, InterviewServiceError> {
        self.close(schedule_id, ScheduleStatus::Declined)
    }

    pub fn cancel(&self, schedule_id: &ScheduleId) -> Result<InterviewSchedule, InterviewServiceError> {
        self.close(schedule_id, ScheduleStatus::Cancelled)
    }

    pub fn schedule(&self, schedule_id: &ScheduleId) -> Result<InterviewSchedule, InterviewServiceError> {
        self.fetch_schedule(schedule_id)
    }

    /// Registers a weekly availability window for one party.
    pub fn add_availability(&self, rule: AvailabilityRule) -> Result<(), InterviewServiceError> {
        if rule.day_of_week > 6 {
            return Err(InterviewServiceError::Validation(
                "day_of_week must be 0 (Monday) through 6 (Sunday)".to_string(),
            ));
        }
        if rule.start_time >= rule.end_time {
            return Err(InterviewServiceError::Validation(
                "availability window must end after it starts".to_string(),
            ));
        }
        self.repository.add_availability(rule)?;
        Ok(())
    }

    fn close(
        &self,
        schedule_id: &ScheduleId,
        target: ScheduleStatus,
    ) -> Result<InterviewSchedule, InterviewServiceError> {
        let mut schedule = self.fetch_schedule(schedule_id)?;
        if !schedule.status.is_open() {
            return Err(InterviewServiceError::Conflict(format!(
                "schedule is {} and cannot move to {}",
                schedule.status.label(),
                target.label()
            )));
        }
        schedule.status = target;
        self.repository.update_schedule(schedule.clone())?;
        info!(schedule = %schedule.id.0, status = schedule.status.label(), "schedule closed");
        Ok(schedule)
    }

    fn application_context(
        &self,
        application_id: &ApplicationId,
    ) -> Result<(ApplicationRecord, JobPosting), InterviewServiceError> {
        let application = self
            .repository
            .fetch(application_id)?
            .ok_or(InterviewServiceError::NotFound("application"))?;
        let job = self
            .repository
            .job(&application.job_id)?
            .ok_or(InterviewServiceError::NotFound("job"))?;
        Ok((application, job))
    }

    fn fetch_schedule(&self, id: &ScheduleId) -> Result<InterviewSchedule, InterviewServiceError> {
        self.repository
            .fetch_schedule(id)?
            .ok_or(InterviewServiceError::NotFound("schedule"))
    }

    /// Weekday business hours used when a party never set availability.
    fn rules_or_default(&self, party: &PartyRef) -> Result<Vec<AvailabilityRule>, InterviewServiceError> {
        let rules: Vec<AvailabilityRule> = self
            .repository
            .availability(party)?
            .into_iter()
            .filter(|rule| rule.active)
            .collect();
        if !rules.is_empty() {
            return Ok(rules);
        }
        Ok((0..5)
            .map(|day| AvailabilityRule {
                party: party.clone(),
                day_of_week: day,
                start_time: self.fallback_start,
                end_time: self.fallback_end,
                active: true,
            })
            .collect())
    }

    /// A slot conflicts when either party already holds an open schedule
    /// within one interview length of it.
    fn has_conflict(
        &self,
        candidate: &PartyRef,
        employer: &PartyRef,
        slot: NaiveDateTime,
    ) -> Result<bool, InterviewServiceError> {
        let window_start = slot - self.slot_duration;
        let window_end = slot + self.slot_duration;
        for party in [candidate, employer] {
            let busy = self
                .repository
                .open_schedules(party)?
                .iter()
                .any(|existing| {
                    existing.interview_date >= window_start && existing.interview_date < window_end
                });
            if busy {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn mark_interview_scheduled(
        &self,
        mut application: ApplicationRecord,
    ) -> Result<(), InterviewServiceError> {
        let from = application.status;
        status::ensure_transition(from, ApplicationStatus::InterviewScheduled)?;
        application.status = ApplicationStatus::InterviewScheduled;
        self.repository.update(application.clone())?;
        self.repository.append_status_change(
            &application.id,
            StatusChange {
                from,
                to: ApplicationStatus::InterviewScheduled,
                actor: SCHEDULER_ACTOR.to_string(),
                reason: Some("interview scheduled".to_string()),
                changed_at: self.clock.now(),
            },
        )?;
        Ok(())
    }
}
