use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Identifier wrapper for candidate records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CandidateId(pub String);

/// Identifier wrapper for job postings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobId(pub String);

/// Identifier wrapper for the employer behind a posting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EmployerId(pub String);

/// Identifier wrapper for submitted applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Candidate snapshot consumed by scoring, eligibility, and reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub id: CandidateId,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub skills: Vec<String>,
    pub education: String,
    pub experience_years: u32,
    pub expected_salary: Option<u32>,
    pub available_for_call: bool,
}

/// Advertised position with the thresholds that drive automation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: JobId,
    pub title: String,
    pub employer_id: EmployerId,
    pub employer_name: String,
    /// Address interview notifications for the employer side go to.
    pub contact_email: String,
    pub skills_required: Vec<String>,
    /// Free-text requirement such as "3+ years"; the scoring engine extracts
    /// the leading integer heuristically.
    pub experience: Option<String>,
    pub salary_min: Option<u32>,
    pub salary_max: Option<u32>,
    pub status: JobStatus,
    pub automation: AutomationSettings,
}

/// Per-job switches for the automation rule engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomationSettings {
    pub enabled: bool,
    pub shortlist_threshold: u8,
    pub reject_threshold: u8,
}

impl Default for AutomationSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            shortlist_threshold: 80,
            reject_threshold: 30,
        }
    }
}

impl AutomationSettings {
    /// Thresholds are only coherent when the reject bound sits strictly below
    /// the shortlist bound.
    pub fn validate(&self) -> Result<(), InvalidThresholds> {
        if self.reject_threshold >= self.shortlist_threshold {
            return Err(InvalidThresholds {
                shortlist: self.shortlist_threshold,
                reject: self.reject_threshold,
            });
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("reject threshold {reject} must be below shortlist threshold {shortlist}")]
pub struct InvalidThresholds {
    pub shortlist: u8,
    pub reject: u8,
}

/// Lifecycle of a job posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Draft,
    Published,
    Closed,
}

impl JobStatus {
    pub const fn label(self) -> &'static str {
        match self {
            JobStatus::Draft => "draft",
            JobStatus::Published => "published",
            JobStatus::Closed => "closed",
        }
    }
}

/// High level status tracked throughout the application workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Shortlisted,
    InterviewScheduled,
    Reviewed,
    Accepted,
    Rejected,
    Selected,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::InterviewScheduled => "interview_scheduled",
            ApplicationStatus::Reviewed => "reviewed",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Selected => "selected",
        }
    }
}

/// Immutable audit entry appended on every successful status transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusChange {
    pub from: ApplicationStatus,
    pub to: ApplicationStatus,
    pub actor: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub changed_at: NaiveDateTime,
}
