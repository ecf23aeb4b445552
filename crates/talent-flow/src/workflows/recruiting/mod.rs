//! Candidate intake, ATS scoring, status workflow, and automation rules.
//!
//! The pipeline is deliberately layered: the scoring and automation engines are
//! pure, the status machine owns the transition allow-list, and the service
//! composes them over a record store behind repository traits.

pub mod automation;
pub mod domain;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;
pub mod status;

#[cfg(test)]
mod tests;

pub use automation::{
    AutomationDecision, AutomationEngine, AutomationPreview, AutomationRunSummary,
};
pub use domain::{
    ApplicationId, ApplicationStatus, AutomationSettings, CandidateId, CandidateProfile,
    EmployerId, InvalidThresholds, JobId, JobPosting, JobStatus, StatusChange,
};
pub use repository::{
    ApplicationRecord, ApplicationRepository, ApplicationStatusView, CandidateDirectory, JobBoard,
};
pub use router::recruiting_router;
pub use scoring::{AtsEvaluation, ScoreBreakdown, ScoringEngine};
pub use service::{RecruitingService, RecruitingServiceError, AUTOMATION_ACTOR};
pub use status::{allowed_targets, ensure_transition, is_terminal, InvalidTransition};
