//! Hiring report generator.
//!
//! Folds the ATS evaluation, the latest screening call, and the status
//! history into one reviewer-facing document: candidate and job snapshots,
//! rule-based strengths and risks, a recommendation tier, and an overall
//! rating on the blended score.

pub mod narrative;
pub mod recommendation;
pub mod router;


use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::info;

use crate::clock::Clock;
use crate::error::RepositoryError;
use crate::workflows::interview::store::{CallQueueRepository, SessionRepository};
use crate::workflows::interview::{
    CallOutcome, CallStatus, CategoryScore, QuestionCategory, SessionStatus,
};
use crate::workflows::recruiting::repository::{
    ApplicationRecord, ApplicationRepository, CandidateDirectory, JobBoard,
};
use crate::workflows::recruiting::{ApplicationId, ScoreBreakdown, StatusChange};

pub use narrative::Highlights;
pub use recommendation::{OverallRating, Recommendation};
pub use router::{report_router, ReportState};

/// Failures surfaced while assembling a report.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Everything the generator reads from the backing store.
pub trait ReportStore:
    ApplicationRepository + CandidateDirectory + JobBoard + CallQueueRepository + SessionRepository
{
}

impl<T> ReportStore for T where
    T: ApplicationRepository
        + CandidateDirectory
        + JobBoard
        + CallQueueRepository
        + SessionRepository
{
}

/// Candidate fields surfaced at the top of the report.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateSummary {
    pub name: String,
    pub email: String,
    pub experience_years: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_salary: Option<u32>,
    pub skills: Vec<String>,
}

/// Job fields surfaced alongside the candidate.
#[derive(Debug, Clone, Serialize)]
pub struct JobSummary {
    pub title: String,
    pub company: String,
    pub applied_at: NaiveDateTime,
}

/// Resume-match section, straight from the application record.
#[derive(Debug, Clone, Serialize)]
pub struct AtsSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<ScoreBreakdown>,
    pub status: &'static str,
}

/// Screening-call section; shape depends on how far the call got.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum InterviewSection {
    Scheduled(ScheduledInterview),
    Completed(CompletedInterview),
}

/// A call exists in the queue but no conversation has run yet.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduledInterview {
    pub status: CallStatus,
    pub scheduled_at: NaiveDateTime,
    pub completed: bool,
}

/// Full conversation detail once a session has been recorded.
#[derive(Debug, Clone, Serialize)]
pub struct CompletedInterview {
    pub status: SessionStatus,
    pub outcome: CallOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_score: Option<f64>,
    pub category_scores: BTreeMap<QuestionCategory, CategoryScore>,
    pub total_questions: usize,
    pub answered_questions: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_duration_seconds: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<NaiveDateTime>,
}

/// Rule-based reviewer guidance.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub strengths: Vec<String>,
    pub risks: Vec<String>,
    pub recommendation: Recommendation,
}

/// The assembled report document.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateReport {
    pub report_id: String,
    pub application_id: ApplicationId,
    pub generated_at: NaiveDateTime,
    pub candidate: CandidateSummary,
    pub job: JobSummary,
    pub ats: AtsSection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interview: Option<InterviewSection>,
    pub analysis: Analysis,
    pub overall: OverallRating,
    pub timeline: Vec<StatusChange>,
}

/// Read-only service producing [`CandidateReport`]s on demand.
pub struct ReportGenerator<R> {
    repository: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> ReportGenerator<R>
where
    R: ReportStore + 'static,
{
    pub fn new(repository: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    pub fn generate(&self, application_id: &ApplicationId) -> Result<CandidateReport, ReportError> {
        let application = self
            .repository
            .fetch(application_id)?
            .ok_or(ReportError::NotFound("application"))?;
        let candidate = self
            .repository
            .candidate(&application.candidate_id)?
            .ok_or(ReportError::NotFound("candidate"))?;
        let job = self
            .repository
            .job(&application.job_id)?
            .ok_or(ReportError::NotFound("job"))?;
        let interview = self.interview_section(&application)?;
        let timeline = self.repository.status_history(application_id)?;

        let ats_total = application.match_score.unwrap_or(0.0);
        let completed = match &interview {
            Some(InterviewSection::Completed(section)) => Some(section),
            _ => None,
        };
        let interview_overall = completed.map(|section| section.overall_score.unwrap_or(0.0));

        let highlights = narrative::assess(
            ats_total,
            application.breakdown.as_ref(),
            completed,
            &candidate,
            &job,
        );
        let combined = recommendation::combined_score(ats_total, interview_overall);
        let recommendation = recommendation::recommend(combined);
        let overall = recommendation::overall_rating(ats_total, interview_overall);

        let now = self.clock.now();
        info!(
            application = %application_id.0,
            score = overall.score,
            decision = recommendation.decision,
            "report generated"
        );

        Ok(CandidateReport {
            report_id: format!("RPT-{}-{}", application_id.0, now.format("%Y%m%d")),
            application_id: application.id.clone(),
            generated_at: now,
            candidate: CandidateSummary {
                name: candidate.full_name,
                email: candidate.email,
                experience_years: candidate.experience_years,
                expected_salary: candidate.expected_salary,
                skills: candidate.skills,
            },
            job: JobSummary {
                title: job.title,
                company: job.employer_name,
                applied_at: application.applied_at,
            },
            ats: AtsSection {
                match_score: application.match_score,
                breakdown: application.breakdown,
                status: application.status.label(),
            },
            interview,
            analysis: Analysis {
                strengths: highlights.strengths,
                risks: highlights.risks,
                recommendation,
            },
            overall,
            timeline,
        })
    }

    fn interview_section(
        &self,
        application: &ApplicationRecord,
    ) -> Result<Option<InterviewSection>, ReportError> {
        let entry = match self.repository.latest_entry_for_application(&application.id)? {
            Some(entry) => entry,
            None => return Ok(None),
        };

        let section = match self
            .repository
            .latest_session_for_application(&application.id)?
        {
            None => InterviewSection::Scheduled(ScheduledInterview {
                status: entry.status,
                scheduled_at: entry.scheduled_at,
                completed: false,
            }),
            Some(session) => {
                let (category_scores, total_questions, answered_questions, overall_score) =
                    match &session.score {
                        Some(score) => (
                            score.category_scores.clone(),
                            score.total_questions,
                            score.answered_questions,
                            Some(score.overall_score),
                        ),
                        None => (BTreeMap::new(), 0, 0, None),
                    };
                InterviewSection::Completed(CompletedInterview {
                    status: session.status,
                    outcome: session.outcome,
                    sentiment_score: session.sentiment_score,
                    summary: session.summary,
                    overall_score,
                    category_scores,
                    total_questions,
                    answered_questions,
                    call_duration_seconds: entry.call_duration_seconds,
                    completed_at: session.completed_at,
                })
            }
        };

        Ok(Some(section))
    }
}
