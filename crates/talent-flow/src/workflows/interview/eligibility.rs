use chrono::{Duration, NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::config::EngineConfig;
use crate::workflows::recruiting::{
    ApplicationRecord, ApplicationStatus, CandidateProfile, JobPosting, JobStatus,
};

/// Individual gate results, serialized as a map for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EligibilityChecks {
    pub ats_score: bool,
    pub job_status: bool,
    pub candidate_available: bool,
    pub not_already_called: bool,
    pub status_valid: bool,
}

impl EligibilityChecks {
    pub const fn all_pass(&self) -> bool {
        self.ats_score
            && self.job_status
            && self.candidate_available
            && self.not_already_called
            && self.status_valid
    }
}

/// Aggregate verdict plus the per-check breakdown behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EligibilityReport {
    pub eligible: bool,
    pub checks: EligibilityChecks,
}

/// Pre-flight gate run before any AI call is queued.
///
/// The `not_already_called` check is the at-most-one-in-flight rule: callers
/// pass whether an active queue entry already exists for the application.
#[derive(Debug, Clone)]
pub struct EligibilityGate {
    min_score: f64,
    window_start: NaiveTime,
    window_end: NaiveTime,
}

impl EligibilityGate {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            min_score: config.min_call_score,
            window_start: config.call_window_start,
            window_end: config.call_window_end,
        }
    }

    pub fn assess(
        &self,
        application: &ApplicationRecord,
        job: &JobPosting,
        candidate: &CandidateProfile,
        has_active_call: bool,
    ) -> EligibilityReport {
        let checks = EligibilityChecks {
            ats_score: application.match_score.unwrap_or(0.0) >= self.min_score,
            job_status: job.status == JobStatus::Published,
            candidate_available: candidate.available_for_call,
            not_already_called: !has_active_call,
            status_valid: matches!(
                application.status,
                ApplicationStatus::Shortlisted | ApplicationStatus::InterviewScheduled
            ),
        };
        EligibilityReport {
            eligible: checks.all_pass(),
            checks,
        }
    }

    /// Earliest moment a call may be placed: five minutes out when inside the
    /// calling window, otherwise the start of the window on the next day.
    pub fn next_call_slot(&self, now: NaiveDateTime) -> NaiveDateTime {
        let time = now.time();
        if time >= self.window_start && time < self.window_end {
            now + Duration::minutes(5)
        } else {
            (now + Duration::days(1)).date().and_time(self.window_start)
        }
    }
}
