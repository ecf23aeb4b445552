use crate::workflows::interview::CallOutcome;
use crate::workflows::recruiting::{CandidateProfile, JobPosting, ScoreBreakdown};

use super::CompletedInterview;

/// Hard cap on each list so the report stays scannable.
const MAX_ITEMS: usize = 5;

/// Salary expectations above this multiple of the job cap are flagged.
const SALARY_STRETCH: f64 = 1.2;

/// Rule-derived strengths and risks, each capped at five entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Highlights {
    pub strengths: Vec<String>,
    pub risks: Vec<String>,
}

/// Walks the threshold rules over the ATS scores, the interview detail, and
/// the salary picture. Missing sub-scores count as zero, matching how an
/// unscored application reads to a reviewer.
pub fn assess(
    ats_total: f64,
    breakdown: Option<&ScoreBreakdown>,
    interview: Option<&CompletedInterview>,
    candidate: &CandidateProfile,
    job: &JobPosting,
) -> Highlights {
    let mut strengths = Vec::new();
    let mut risks = Vec::new();

    if ats_total >= 80.0 {
        strengths.push("Excellent ATS match score".to_string());
    } else if ats_total < 50.0 {
        risks.push("Low ATS match score".to_string());
    }

    let skills_score = breakdown.map(|b| b.skills_score).unwrap_or(0.0);
    if skills_score >= 80.0 {
        strengths.push("Strong technical skills match".to_string());
    } else if skills_score < 50.0 {
        risks.push("Skills gap identified".to_string());
    }

    let experience_score = breakdown.map(|b| b.experience_score).unwrap_or(0.0);
    if experience_score >= 80.0 {
        strengths.push("Relevant experience level".to_string());
    } else if experience_score < 50.0 {
        risks.push("Experience mismatch".to_string());
    }

    if let Some(detail) = interview {
        let overall = detail.overall_score.unwrap_or(0.0);
        if overall >= 80.0 {
            strengths.push("Excellent interview performance".to_string());
        } else if overall < 60.0 {
            risks.push("Below average interview performance".to_string());
        }

        let sentiment = detail.sentiment_score.unwrap_or(0.0);
        if sentiment >= 0.7 {
            strengths.push("Positive attitude and enthusiasm".to_string());
        } else if sentiment < 0.4 {
            risks.push("Low engagement or negative sentiment".to_string());
        }

        match detail.outcome {
            CallOutcome::Interested => {
                strengths.push("Expressed strong interest in role".to_string());
            }
            CallOutcome::NotInterested => {
                risks.push("Candidate not interested".to_string());
            }
            _ => {}
        }

        for (category, score) in &detail.category_scores {
            if score.average_score >= 85.0 {
                strengths.push(format!("Strong {} responses", category.label()));
            } else if score.average_score < 60.0 {
                risks.push(format!("Weak {} responses", category.label()));
            }
        }
    }

    if let (Some(expected), Some(cap)) = (candidate.expected_salary, job.salary_max) {
        if f64::from(expected) > f64::from(cap) * SALARY_STRETCH {
            risks.push("Salary expectation significantly above budget".to_string());
        } else if expected <= cap {
            strengths.push("Salary expectation within budget".to_string());
        }
    }

    strengths.truncate(MAX_ITEMS);
    risks.truncate(MAX_ITEMS);
    Highlights { strengths, risks }
}
