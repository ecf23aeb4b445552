use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::clock::FixedClock;
use crate::error::RepositoryError;
use crate::workflows::recruiting::domain::{
    ApplicationId, ApplicationStatus, AutomationSettings, CandidateId, CandidateProfile,
    EmployerId, JobId, JobPosting, JobStatus, StatusChange,
};
use crate::workflows::recruiting::repository::{
    ApplicationRecord, ApplicationRepository, CandidateDirectory, JobBoard,
};
use crate::workflows::recruiting::service::RecruitingService;

/// In-memory store backing the service tests.
#[derive(Default)]
pub(super) struct MemoryStore {
    applications: Mutex<HashMap<ApplicationId, ApplicationRecord>>,
    history: Mutex<HashMap<ApplicationId, Vec<StatusChange>>>,
    candidates: Mutex<HashMap<CandidateId, CandidateProfile>>,
    jobs: Mutex<HashMap<JobId, JobPosting>>,
}

impl ApplicationRepository for MemoryStore {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        let mut guard = self
            .applications
            .lock()
            .expect("repository mutex poisoned");
        let duplicate = guard.values().any(|existing| {
            existing.candidate_id == record.candidate_id && existing.job_id == record.job_id
        });
        if duplicate || guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: ApplicationRecord) -> Result<(), RepositoryError> {
        let mut guard = self
            .applications
            .lock()
            .expect("repository mutex poisoned");
        if !guard.contains_key(&record.id) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(record.id.clone(), record);
        Ok(())
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        Ok(self
            .applications
            .lock()
            .expect("repository mutex poisoned")
            .get(id)
            .cloned())
    }

    fn pending_for_job(&self, job_id: &JobId) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        let mut records: Vec<ApplicationRecord> = self
            .applications
            .lock()
            .expect("repository mutex poisoned")
            .values()
            .filter(|record| {
                record.job_id == *job_id && record.status == ApplicationStatus::Pending
            })
            .cloned()
            .collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(records)
    }

    fn append_status_change(
        &self,
        id: &ApplicationId,
        change: StatusChange,
    ) -> Result<(), RepositoryError> {
        self.history
            .lock()
            .expect("repository mutex poisoned")
            .entry(id.clone())
            .or_default()
            .push(change);
        Ok(())
    }

    fn status_history(&self, id: &ApplicationId) -> Result<Vec<StatusChange>, RepositoryError> {
        Ok(self
            .history
            .lock()
            .expect("repository mutex poisoned")
            .get(id)
            .cloned()
            .unwrap_or_default())
    }
}

impl CandidateDirectory for MemoryStore {
    fn candidate(&self, id: &CandidateId) -> Result<Option<CandidateProfile>, RepositoryError> {
        Ok(self
            .candidates
            .lock()
            .expect("repository mutex poisoned")
            .get(id)
            .cloned())
    }

    fn upsert_candidate(&self, profile: CandidateProfile) -> Result<(), RepositoryError> {
        self.candidates
            .lock()
            .expect("repository mutex poisoned")
            .insert(profile.id.clone(), profile);
        Ok(())
    }
}

impl JobBoard for MemoryStore {
    fn job(&self, id: &JobId) -> Result<Option<JobPosting>, RepositoryError> {
        Ok(self
            .jobs
            .lock()
            .expect("repository mutex poisoned")
            .get(id)
            .cloned())
    }

    fn upsert_job(&self, posting: JobPosting) -> Result<(), RepositoryError> {
        self.jobs
            .lock()
            .expect("repository mutex poisoned")
            .insert(posting.id.clone(), posting);
        Ok(())
    }
}

pub(super) fn test_now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 3, 2)
        .expect("valid date")
        .and_hms_opt(10, 0, 0)
        .expect("valid time")
}

pub(super) fn build_service() -> (Arc<RecruitingService<MemoryStore>>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::default());
    let clock = Arc::new(FixedClock::new(test_now()));
    let service = Arc::new(RecruitingService::new(store.clone(), clock));
    (service, store)
}

pub(super) fn candidate(id: &str, skills: &[&str], years: u32) -> CandidateProfile {
    CandidateProfile {
        id: CandidateId(id.to_string()),
        full_name: format!("Candidate {id}"),
        email: format!("{id}@example.com"),
        phone: "+15550100".to_string(),
        skills: skills.iter().map(|s| s.to_string()).collect(),
        education: "BSc Computer Science".to_string(),
        experience_years: years,
        expected_salary: Some(90_000),
        available_for_call: true,
    }
}

pub(super) fn job(id: &str, automation_enabled: bool) -> JobPosting {
    JobPosting {
        id: JobId(id.to_string()),
        title: "Backend Engineer".to_string(),
        employer_id: EmployerId("emp-1".to_string()),
        employer_name: "Acme".to_string(),
        contact_email: "talent@acme.example.com".to_string(),
        skills_required: vec!["rust".to_string(), "sql".to_string()],
        experience: Some("3+ years".to_string()),
        salary_min: Some(70_000),
        salary_max: Some(100_000),
        status: JobStatus::Published,
        automation: AutomationSettings {
            enabled: automation_enabled,
            shortlist_threshold: 80,
            reject_threshold: 30,
        },
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body reads");
    serde_json::from_slice(&bytes).expect("body is json")
}
