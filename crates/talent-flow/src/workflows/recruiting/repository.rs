use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::RepositoryError;

use super::domain::{
    ApplicationId, ApplicationStatus, CandidateId, CandidateProfile, JobId, JobPosting,
    StatusChange,
};
use super::scoring::ScoreBreakdown;

/// Repository record for one candidate-to-job application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: ApplicationId,
    pub candidate_id: CandidateId,
    pub job_id: JobId,
    pub status: ApplicationStatus,
    pub match_score: Option<f64>,
    pub breakdown: Option<ScoreBreakdown>,
    pub applied_at: NaiveDateTime,
}

impl ApplicationRecord {
    pub fn status_view(&self) -> ApplicationStatusView {
        ApplicationStatusView {
            application_id: self.id.clone(),
            candidate_id: self.candidate_id.clone(),
            job_id: self.job_id.clone(),
            status: self.status.label(),
            match_score: self.match_score,
        }
    }
}

/// Sanitized representation of an application's exposed status.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationStatusView {
    pub application_id: ApplicationId,
    pub candidate_id: CandidateId,
    pub job_id: JobId,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_score: Option<f64>,
}

/// Storage abstraction so the service module can be exercised in isolation.
///
/// `insert` must reject a second application for the same (candidate, job)
/// pair with `RepositoryError::Conflict`.
pub trait ApplicationRepository: Send + Sync {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError>;
    fn update(&self, record: ApplicationRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError>;
    fn pending_for_job(&self, job_id: &JobId) -> Result<Vec<ApplicationRecord>, RepositoryError>;
    fn append_status_change(
        &self,
        id: &ApplicationId,
        change: StatusChange,
    ) -> Result<(), RepositoryError>;
    fn status_history(&self, id: &ApplicationId) -> Result<Vec<StatusChange>, RepositoryError>;
}

/// Lookup surface for candidate profiles.
pub trait CandidateDirectory: Send + Sync {
    fn candidate(&self, id: &CandidateId) -> Result<Option<CandidateProfile>, RepositoryError>;
    fn upsert_candidate(&self, profile: CandidateProfile) -> Result<(), RepositoryError>;
}

/// Lookup surface for job postings.
pub trait JobBoard: Send + Sync {
    fn job(&self, id: &JobId) -> Result<Option<JobPosting>, RepositoryError>;
    fn upsert_job(&self, posting: JobPosting) -> Result<(), RepositoryError>;
}
