use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::info;

use crate::clock::Clock;
use crate::error::RepositoryError;

use super::automation::{
    AutomationDecision, AutomationEngine, AutomationPreview, AutomationRunSummary,
};
use super::domain::{
    ApplicationId, ApplicationStatus, CandidateId, CandidateProfile, JobId, JobPosting,
    StatusChange,
};
use super::repository::{
    ApplicationRecord, ApplicationRepository, CandidateDirectory, JobBoard,
};
use super::scoring::{AtsEvaluation, ScoringEngine};
use super::status::{ensure_transition, InvalidTransition};

/// Actor recorded on history entries written by the automation pass.
pub const AUTOMATION_ACTOR: &str = "automation";

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("app-{id:06}"))
}

/// Service composing the scoring engine, status workflow, and automation rules
/// over one record store.
pub struct RecruitingService<R> {
    repository: Arc<R>,
    clock: Arc<dyn Clock>,
    scoring: ScoringEngine,
    automation: AutomationEngine,
}

impl<R> RecruitingService<R>
where
    R: ApplicationRepository + CandidateDirectory + JobBoard + 'static,
{
    pub fn new(repository: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            clock,
            scoring: ScoringEngine,
            automation: AutomationEngine,
        }
    }

    pub fn register_candidate(
        &self,
        profile: CandidateProfile,
    ) -> Result<(), RecruitingServiceError> {
        self.repository.upsert_candidate(profile)?;
        Ok(())
    }

    /// Store a job posting after validating its automation thresholds.
    pub fn register_job(&self, posting: JobPosting) -> Result<(), RecruitingServiceError> {
        posting
            .automation
            .validate()
            .map_err(|err| RecruitingServiceError::Validation(err.to_string()))?;
        self.repository.upsert_job(posting)?;
        Ok(())
    }

    /// Create a pending application for a (candidate, job) pair.
    pub fn submit(
        &self,
        candidate_id: CandidateId,
        job_id: JobId,
    ) -> Result<ApplicationRecord, RecruitingServiceError> {
        self.repository
            .candidate(&candidate_id)?
            .ok_or(RecruitingServiceError::NotFound("candidate"))?;
        self.repository
            .job(&job_id)?
            .ok_or(RecruitingServiceError::NotFound("job"))?;

        let record = ApplicationRecord {
            id: next_application_id(),
            candidate_id,
            job_id,
            status: ApplicationStatus::Pending,
            match_score: None,
            breakdown: None,
            applied_at: self.clock.now(),
        };

        let stored = self.repository.insert(record)?;
        info!(application = %stored.id.0, "application submitted");
        Ok(stored)
    }

    /// Run the scoring engine for one application and persist the result.
    pub fn score(&self, id: &ApplicationId) -> Result<AtsEvaluation, RecruitingServiceError> {
        let mut record = self.fetch(id)?;
        let candidate = self
            .repository
            .candidate(&record.candidate_id)?
            .ok_or(RecruitingServiceError::NotFound("candidate"))?;
        let job = self
            .repository
            .job(&record.job_id)?
            .ok_or(RecruitingServiceError::NotFound("job"))?;

        let evaluation = self.scoring.evaluate(&candidate, &job);
        record.match_score = Some(evaluation.total);
        record.breakdown = Some(evaluation.breakdown.clone());
        self.repository.update(record)?;

        info!(application = %id.0, score = evaluation.total, "application scored");
        Ok(evaluation)
    }

    /// Move an application to `to`, appending an audit entry on success.
    pub fn transition(
        &self,
        id: &ApplicationId,
        to: ApplicationStatus,
        actor: &str,
        reason: Option<String>,
    ) -> Result<ApplicationRecord, RecruitingServiceError> {
        let record = self.fetch(id)?;
        self.apply_transition(record, to, actor, reason)
    }

    /// Evaluate one application against its job's automation rules, mutating
    /// status when a threshold fires.
    pub fn automate(
        &self,
        id: &ApplicationId,
    ) -> Result<AutomationDecision, RecruitingServiceError> {
        let record = self.fetch(id)?;
        let job = self
            .repository
            .job(&record.job_id)?
            .ok_or(RecruitingServiceError::NotFound("job"))?;
        let score = record.match_score.ok_or_else(|| {
            RecruitingServiceError::Validation("application has not been scored".to_string())
        })?;

        let decision = self.automation.decide(&job.automation, record.status, score);
        self.enact(record, decision)?;
        Ok(decision)
    }

    /// Bulk pass over every pending application for one job.
    pub fn run_automation(
        &self,
        job_id: &JobId,
    ) -> Result<AutomationRunSummary, RecruitingServiceError> {
        let job = self
            .repository
            .job(job_id)?
            .ok_or(RecruitingServiceError::NotFound("job"))?;

        let mut summary = AutomationRunSummary::default();
        for record in self.repository.pending_for_job(job_id)? {
            let decision = match record.match_score {
                Some(score) => self.automation.decide(&job.automation, record.status, score),
                None => AutomationDecision::Unchanged,
            };
            self.enact(record, decision)?;
            summary.record(decision);
        }

        info!(
            job = %job_id.0,
            shortlisted = summary.shortlisted,
            rejected = summary.rejected,
            unchanged = summary.unchanged,
            "automation pass finished"
        );
        Ok(summary)
    }

    /// Dry-run counterpart of [`run_automation`](Self::run_automation).
    pub fn preview_automation(
        &self,
        job_id: &JobId,
    ) -> Result<AutomationPreview, RecruitingServiceError> {
        let job = self
            .repository
            .job(job_id)?
            .ok_or(RecruitingServiceError::NotFound("job"))?;
        let scores = self
            .repository
            .pending_for_job(job_id)?
            .into_iter()
            .filter_map(|record| record.match_score);
        Ok(self.automation.preview(&job.automation, scores))
    }

    pub fn get(&self, id: &ApplicationId) -> Result<ApplicationRecord, RecruitingServiceError> {
        self.fetch(id)
    }

    pub fn status_history(
        &self,
        id: &ApplicationId,
    ) -> Result<Vec<StatusChange>, RecruitingServiceError> {
        Ok(self.repository.status_history(id)?)
    }

    fn fetch(&self, id: &ApplicationId) -> Result<ApplicationRecord, RecruitingServiceError> {
        Ok(self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?)
    }

    fn enact(
        &self,
        record: ApplicationRecord,
        decision: AutomationDecision,
    ) -> Result<(), RecruitingServiceError> {
        let target = match decision {
            AutomationDecision::Shortlist => ApplicationStatus::Shortlisted,
            AutomationDecision::Reject => ApplicationStatus::Rejected,
            _ => return Ok(()),
        };
        self.apply_transition(
            record,
            target,
            AUTOMATION_ACTOR,
            Some(decision.reason().to_string()),
        )?;
        Ok(())
    }

    fn apply_transition(
        &self,
        mut record: ApplicationRecord,
        to: ApplicationStatus,
        actor: &str,
        reason: Option<String>,
    ) -> Result<ApplicationRecord, RecruitingServiceError> {
        let from = record.status;
        ensure_transition(from, to)?;

        record.status = to;
        self.repository.update(record.clone())?;
        self.repository.append_status_change(
            &record.id,
            StatusChange {
                from,
                to,
                actor: actor.to_string(),
                reason,
                changed_at: self.clock.now(),
            },
        )?;

        info!(
            application = %record.id.0,
            from = from.label(),
            to = to.label(),
            actor,
            "application status changed"
        );
        Ok(record)
    }
}

/// Error raised by the recruiting service.
#[derive(Debug, thiserror::Error)]
pub enum RecruitingServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error(transparent)]
    Transition(#[from] InvalidTransition),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
