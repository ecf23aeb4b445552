use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::domain::{CandidateProfile, JobPosting};

const SKILLS_WEIGHT: f64 = 0.40;
const EXPERIENCE_WEIGHT: f64 = 0.30;
const EDUCATION_WEIGHT: f64 = 0.20;
const SALARY_WEIGHT: f64 = 0.10;

fn years_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(\d+)").expect("valid years pattern"))
}

/// Per-component scores plus the skill overlap detail used by reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub skills_score: f64,
    pub experience_score: f64,
    pub education_score: f64,
    pub salary_score: f64,
    pub skills_matched: Vec<String>,
    pub skills_missing: Vec<String>,
}

/// Weighted result of matching one candidate against one job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtsEvaluation {
    pub total: f64,
    pub breakdown: ScoreBreakdown,
}

/// Deterministic resume-to-job matcher.
///
/// Missing inputs degrade to documented defaults rather than erroring: a job
/// without listed skills scores the component 100, a candidate without an
/// expected salary is treated as within budget, and so on. Every component
/// lands in [0, 100] so the weighted total does too.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringEngine;

impl ScoringEngine {
    pub fn evaluate(&self, candidate: &CandidateProfile, job: &JobPosting) -> AtsEvaluation {
        let (skills_score, skills_matched, skills_missing) = self.score_skills(candidate, job);
        let experience_score = self.score_experience(candidate, job);
        let education_score = self.score_education(candidate);
        let salary_score = self.score_salary(candidate, job);

        let total = skills_score * SKILLS_WEIGHT
            + experience_score * EXPERIENCE_WEIGHT
            + education_score * EDUCATION_WEIGHT
            + salary_score * SALARY_WEIGHT;

        AtsEvaluation {
            total: round2(total),
            breakdown: ScoreBreakdown {
                skills_score: round2(skills_score),
                experience_score: round2(experience_score),
                education_score: round2(education_score),
                salary_score: round2(salary_score),
                skills_matched,
                skills_missing,
            },
        }
    }

    fn score_skills(
        &self,
        candidate: &CandidateProfile,
        job: &JobPosting,
    ) -> (f64, Vec<String>, Vec<String>) {
        let required: Vec<&str> = job
            .skills_required
            .iter()
            .map(|skill| skill.trim())
            .filter(|skill| !skill.is_empty())
            .collect();
        if required.is_empty() {
            return (100.0, Vec::new(), Vec::new());
        }

        let offered: Vec<String> = candidate
            .skills
            .iter()
            .map(|skill| skill.trim().to_lowercase())
            .filter(|skill| !skill.is_empty())
            .collect();
        if offered.is_empty() {
            let missing = required.iter().map(|skill| skill.to_string()).collect();
            return (0.0, Vec::new(), missing);
        }

        let mut matched = Vec::new();
        let mut missing = Vec::new();
        for skill in &required {
            if offered.iter().any(|have| have == &skill.to_lowercase()) {
                matched.push(skill.to_string());
            } else {
                missing.push(skill.to_string());
            }
        }

        let score = (matched.len() as f64 / required.len() as f64) * 100.0;
        (score.min(100.0), matched, missing)
    }

    fn score_experience(&self, candidate: &CandidateProfile, job: &JobPosting) -> f64 {
        let required_years = match &job.experience {
            Some(text) => match years_pattern()
                .captures(text)
                .and_then(|caps| caps.get(1))
                .and_then(|m| m.as_str().parse::<u32>().ok())
            {
                Some(years) => years as f64,
                None => return 100.0,
            },
            None => return 100.0,
        };

        let have = candidate.experience_years as f64;
        if have >= required_years {
            100.0
        } else if have >= required_years * 0.8 {
            80.0
        } else if have >= required_years * 0.6 {
            60.0
        } else if have >= required_years * 0.4 {
            40.0
        } else {
            20.0
        }
    }

    fn score_education(&self, candidate: &CandidateProfile) -> f64 {
        if candidate.education.trim().is_empty() {
            50.0
        } else {
            100.0
        }
    }

    fn score_salary(&self, candidate: &CandidateProfile, job: &JobPosting) -> f64 {
        let (expected, budget) = match (candidate.expected_salary, job.salary_max) {
            (Some(expected), Some(budget)) => (expected as f64, budget as f64),
            _ => return 100.0,
        };

        if expected <= budget {
            100.0
        } else if expected <= budget * 1.1 {
            80.0
        } else if expected <= budget * 1.2 {
            60.0
        } else {
            30.0
        }
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
