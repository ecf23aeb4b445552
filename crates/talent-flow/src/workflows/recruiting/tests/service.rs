use super::common::*;
use crate::error::RepositoryError;
use crate::workflows::recruiting::domain::{
    ApplicationStatus, AutomationSettings, CandidateId, JobId,
};
use crate::workflows::recruiting::service::AUTOMATION_ACTOR;
use crate::workflows::recruiting::{AutomationDecision, RecruitingServiceError};

#[test]
fn submit_requires_known_candidate_and_job() {
    let (service, _store) = build_service();
    service.register_job(job("job-1", false)).expect("job stored");

    match service.submit(CandidateId("ghost".to_string()), JobId("job-1".to_string())) {
        Err(RecruitingServiceError::NotFound("candidate")) => {}
        other => panic!("expected missing candidate, got {other:?}"),
    }

    service
        .register_candidate(candidate("cand-1", &["rust"], 5))
        .expect("candidate stored");
    match service.submit(CandidateId("cand-1".to_string()), JobId("ghost".to_string())) {
        Err(RecruitingServiceError::NotFound("job")) => {}
        other => panic!("expected missing job, got {other:?}"),
    }
}

#[test]
fn duplicate_application_conflicts() {
    let (service, _store) = build_service();
    service.register_job(job("job-1", false)).expect("job stored");
    service
        .register_candidate(candidate("cand-1", &["rust"], 5))
        .expect("candidate stored");

    service
        .submit(CandidateId("cand-1".to_string()), JobId("job-1".to_string()))
        .expect("first submission succeeds");
    match service.submit(CandidateId("cand-1".to_string()), JobId("job-1".to_string())) {
        Err(RecruitingServiceError::Repository(RepositoryError::Conflict)) => {}
        other => panic!("expected conflict, got {other:?}"),
    }
}

#[test]
fn score_persists_match_score_and_breakdown() {
    let (service, _store) = build_service();
    service.register_job(job("job-1", false)).expect("job stored");
    service
        .register_candidate(candidate("cand-1", &["rust", "sql"], 5))
        .expect("candidate stored");

    let record = service
        .submit(CandidateId("cand-1".to_string()), JobId("job-1".to_string()))
        .expect("submission succeeds");
    let evaluation = service.score(&record.id).expect("scoring succeeds");
    assert_eq!(evaluation.total, 100.0);

    let stored = service.get(&record.id).expect("record present");
    assert_eq!(stored.match_score, Some(100.0));
    let breakdown = stored.breakdown.expect("breakdown stored");
    assert_eq!(breakdown.skills_matched.len(), 2);
}

#[test]
fn transition_appends_audit_history() {
    let (service, _store) = build_service();
    service.register_job(job("job-1", false)).expect("job stored");
    service
        .register_candidate(candidate("cand-1", &["rust"], 5))
        .expect("candidate stored");

    let record = service
        .submit(CandidateId("cand-1".to_string()), JobId("job-1".to_string()))
        .expect("submission succeeds");
    service
        .transition(&record.id, ApplicationStatus::Shortlisted, "recruiter", None)
        .expect("shortlist allowed");
    service
        .transition(
            &record.id,
            ApplicationStatus::InterviewScheduled,
            "scheduler",
            Some("slot booked".to_string()),
        )
        .expect("schedule allowed");

    let history = service.status_history(&record.id).expect("history reads");
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].from, ApplicationStatus::Pending);
    assert_eq!(history[0].to, ApplicationStatus::Shortlisted);
    assert_eq!(history[0].actor, "recruiter");
    assert_eq!(history[1].to, ApplicationStatus::InterviewScheduled);
    assert_eq!(history[1].reason.as_deref(), Some("slot booked"));
    assert_eq!(history[1].changed_at, test_now());
}

#[test]
fn terminal_states_refuse_further_transitions() {
    let (service, _store) = build_service();
    service.register_job(job("job-1", false)).expect("job stored");
    service
        .register_candidate(candidate("cand-1", &["rust"], 5))
        .expect("candidate stored");

    let record = service
        .submit(CandidateId("cand-1".to_string()), JobId("job-1".to_string()))
        .expect("submission succeeds");
    service
        .transition(&record.id, ApplicationStatus::Rejected, "recruiter", None)
        .expect("rejection allowed");

    match service.transition(&record.id, ApplicationStatus::Shortlisted, "recruiter", None) {
        Err(RecruitingServiceError::Transition(err)) => {
            assert_eq!(err.from, ApplicationStatus::Rejected);
            assert_eq!(err.to, ApplicationStatus::Shortlisted);
        }
        other => panic!("expected transition error, got {other:?}"),
    }
    let history = service.status_history(&record.id).expect("history reads");
    assert_eq!(history.len(), 1, "failed transition must not append history");
}

fn seed_scored_pipeline(
    service: &crate::workflows::recruiting::RecruitingService<MemoryStore>,
) -> [crate::workflows::recruiting::ApplicationId; 3] {
    service.register_job(job("job-1", true)).expect("job stored");

    let strong = candidate("cand-strong", &["rust", "sql"], 5);
    let mut mid = candidate("cand-mid", &["rust"], 5);
    mid.expected_salary = Some(130_000);
    let mut weak = candidate("cand-weak", &[], 0);
    weak.education = String::new();
    weak.expected_salary = Some(130_000);

    let mut ids = Vec::new();
    for profile in [strong, mid, weak] {
        let candidate_id = profile.id.clone();
        service.register_candidate(profile).expect("candidate stored");
        let record = service
            .submit(candidate_id, JobId("job-1".to_string()))
            .expect("submission succeeds");
        service.score(&record.id).expect("scoring succeeds");
        ids.push(record.id);
    }
    [ids[0].clone(), ids[1].clone(), ids[2].clone()]
}

#[test]
fn automation_pass_splits_the_pipeline() {
    let (service, _store) = build_service();
    let [strong, mid, weak] = seed_scored_pipeline(&service);

    let summary = service
        .run_automation(&JobId("job-1".to_string()))
        .expect("automation runs");
    assert_eq!(summary.total, 3);
    assert_eq!(summary.shortlisted, 1);
    assert_eq!(summary.rejected, 1);
    assert_eq!(summary.unchanged, 1);

    assert_eq!(
        service.get(&strong).expect("record").status,
        ApplicationStatus::Shortlisted
    );
    assert_eq!(
        service.get(&mid).expect("record").status,
        ApplicationStatus::Pending
    );
    assert_eq!(
        service.get(&weak).expect("record").status,
        ApplicationStatus::Rejected
    );

    let history = service.status_history(&strong).expect("history reads");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].actor, AUTOMATION_ACTOR);
    assert_eq!(history[0].reason.as_deref(), Some("auto_shortlisted"));
    let history = service.status_history(&weak).expect("history reads");
    assert_eq!(history[0].reason.as_deref(), Some("auto_rejected"));
}

#[test]
fn preview_agrees_with_apply() {
    let (service, _store) = build_service();
    seed_scored_pipeline(&service);
    let job_id = JobId("job-1".to_string());

    let preview = service.preview_automation(&job_id).expect("preview runs");
    let summary = service.run_automation(&job_id).expect("automation runs");

    assert_eq!(preview.would_shortlist, summary.shortlisted);
    assert_eq!(preview.would_reject, summary.rejected);
    assert_eq!(preview.would_remain_pending, summary.unchanged);
    assert_eq!(preview.shortlist_threshold, 80);
    assert_eq!(preview.reject_threshold, 30);
}

#[test]
fn disabled_automation_leaves_everything_pending() {
    let (service, _store) = build_service();
    service.register_job(job("job-1", false)).expect("job stored");
    service
        .register_candidate(candidate("cand-1", &["rust", "sql"], 5))
        .expect("candidate stored");
    let record = service
        .submit(CandidateId("cand-1".to_string()), JobId("job-1".to_string()))
        .expect("submission succeeds");
    service.score(&record.id).expect("scoring succeeds");

    let decision = service.automate(&record.id).expect("decision computed");
    assert_eq!(decision, AutomationDecision::Disabled);
    assert_eq!(
        service.get(&record.id).expect("record").status,
        ApplicationStatus::Pending
    );
}

#[test]
fn automating_an_unscored_application_is_a_validation_error() {
    let (service, _store) = build_service();
    service.register_job(job("job-1", true)).expect("job stored");
    service
        .register_candidate(candidate("cand-1", &["rust"], 5))
        .expect("candidate stored");
    let record = service
        .submit(CandidateId("cand-1".to_string()), JobId("job-1".to_string()))
        .expect("submission succeeds");

    match service.automate(&record.id) {
        Err(RecruitingServiceError::Validation(message)) => {
            assert!(message.contains("not been scored"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn register_job_rejects_inverted_thresholds() {
    let (service, _store) = build_service();
    let mut posting = job("job-1", true);
    posting.automation = AutomationSettings {
        enabled: true,
        shortlist_threshold: 30,
        reject_threshold: 80,
    };
    match service.register_job(posting) {
        Err(RecruitingServiceError::Validation(_)) => {}
        other => panic!("expected validation error, got {other:?}"),
    }
}
