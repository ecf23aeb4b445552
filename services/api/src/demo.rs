use crate::infra::{InMemoryStore, InMemoryTaskQueue, OutboxNotifier, SimulatedVoice};
use chrono::{NaiveDate, NaiveDateTime};
use clap::Args;
use std::sync::Arc;
use talent_flow::clock::{Clock, FixedClock};
use talent_flow::config::EngineConfig;
use talent_flow::error::AppError;
use talent_flow::workflows::interview::store::ReminderRepository;
use talent_flow::workflows::interview::{
    CallExecution, CallOrchestrator, CallScheduleOutcome, ConfirmingParty, InterviewScheduler,
    InterviewServiceError, ReminderDelivery, ReminderService,
};
use talent_flow::workflows::recruiting::domain::{
    ApplicationStatus, AutomationSettings, CandidateId, CandidateProfile, EmployerId, JobId,
    JobPosting, JobStatus,
};
use talent_flow::workflows::recruiting::RecruitingService;
use talent_flow::workflows::report::ReportGenerator;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Pin the demo clock (YYYY-MM-DDTHH:MM:SS). Defaults to a Monday morning.
    #[arg(long, value_parser = crate::infra::parse_datetime)]
    pub(crate) now: Option<NaiveDateTime>,
    /// Skip the automated screening call portion of the demo.
    #[arg(long)]
    pub(crate) skip_call: bool,
    /// Print the final hiring report as JSON instead of the condensed summary.
    #[arg(long)]
    pub(crate) report_json: bool,
}

fn default_demo_now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 3, 2)
        .expect("valid date")
        .and_hms_opt(9, 0, 0)
        .expect("valid time")
}

fn demo_candidate() -> CandidateProfile {
    CandidateProfile {
        id: CandidateId("cand-demo".to_string()),
        full_name: "Priya Shah".to_string(),
        email: "priya.shah@example.com".to_string(),
        phone: "+15550142".to_string(),
        skills: vec!["rust".to_string(), "sql".to_string(), "kafka".to_string()],
        education: "MSc Data Engineering".to_string(),
        experience_years: 6,
        expected_salary: Some(95_000),
        available_for_call: true,
    }
}

fn demo_job() -> JobPosting {
    JobPosting {
        id: JobId("job-demo".to_string()),
        title: "Data Platform Engineer".to_string(),
        employer_id: EmployerId("emp-nova".to_string()),
        employer_name: "Nova Analytics".to_string(),
        contact_email: "hiring@nova-analytics.example.com".to_string(),
        skills_required: vec!["rust".to_string(), "sql".to_string(), "kafka".to_string()],
        experience: Some("4+ years".to_string()),
        salary_min: Some(80_000),
        salary_max: Some(110_000),
        status: JobStatus::Published,
        automation: AutomationSettings {
            enabled: true,
            shortlist_threshold: 75,
            reject_threshold: 30,
        },
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        now,
        skip_call,
        report_json,
    } = args;

    let engine = EngineConfig::default();
    let store = Arc::new(InMemoryStore::default());
    let clock = Arc::new(FixedClock::new(now.unwrap_or_else(default_demo_now)));
    let shared_clock: Arc<dyn Clock> = clock.clone();
    let notifier = Arc::new(OutboxNotifier::default());
    let dispatcher = Arc::new(InMemoryTaskQueue::default());
    let voice = Arc::new(SimulatedVoice::default());

    let recruiting = RecruitingService::new(store.clone(), shared_clock.clone());
    let scheduler = InterviewScheduler::new(store.clone(), shared_clock.clone(), &engine);
    let reminders = ReminderService::new(
        store.clone(),
        shared_clock.clone(),
        notifier.clone(),
        dispatcher.clone(),
        &engine,
    );
    let orchestrator = CallOrchestrator::new(
        store.clone(),
        shared_clock.clone(),
        voice,
        dispatcher.clone(),
        &engine,
    );
    let reports = ReportGenerator::new(store.clone(), shared_clock.clone());
    orchestrator.seed_default_flow()?;

    println!("Candidate workflow demo (clock pinned to {})", clock.now());

    println!("\nIntake and scoring");
    let candidate = demo_candidate();
    let job = demo_job();
    recruiting.register_candidate(candidate.clone())?;
    recruiting.register_job(job.clone())?;
    let record = recruiting.submit(candidate.id.clone(), job.id.clone())?;
    println!(
        "- Application {} received for {} -> status {}",
        record.id.0,
        job.title,
        record.status.label()
    );

    let evaluation = recruiting.score(&record.id)?;
    println!("- Match score {:.1}", evaluation.total);
    println!(
        "  skills {:.0} | experience {:.0} | education {:.0} | salary {:.0}",
        evaluation.breakdown.skills_score,
        evaluation.breakdown.experience_score,
        evaluation.breakdown.education_score,
        evaluation.breakdown.salary_score
    );
    if !evaluation.breakdown.skills_missing.is_empty() {
        println!(
            "  missing skills: {}",
            evaluation.breakdown.skills_missing.join(", ")
        );
    }

    let summary = recruiting.run_automation(&job.id)?;
    println!(
        "- Automation pass: {} shortlisted, {} rejected, {} unchanged (thresholds {}/{})",
        summary.shortlisted,
        summary.rejected,
        summary.unchanged,
        job.automation.shortlist_threshold,
        job.automation.reject_threshold
    );

    if !skip_call {
        println!("\nAutomated screening call");
        match orchestrator.schedule_call(&record.id, "shortlisted")? {
            CallScheduleOutcome::Scheduled { entry } => {
                println!(
                    "- Call {} queued for {} (retry budget {})",
                    entry.id.0, entry.scheduled_at, entry.max_retries
                );

                clock.set(entry.scheduled_at);
                let scan = orchestrator.process_pending()?;
                println!("- Due scan picked up {} call(s)", scan.processed);

                match orchestrator.execute_call(&entry.id)? {
                    CallExecution::Completed { session } => {
                        println!(
                            "- Session {} finished: outcome {:?}, sentiment {:?}",
                            session.id.0, session.outcome, session.sentiment_score
                        );
                        if let Some(summary) = &session.summary {
                            println!("  {}", summary);
                        }
                        if let Some(score) = &session.score {
                            println!(
                                "  Interview score {:.1} ({} of {} answered)",
                                score.overall_score,
                                score.answered_questions,
                                score.total_questions
                            );
                        }
                        println!("  Transcript:");
                        for turn in orchestrator.session_turns(&session.id)? {
                            println!("    Q{}: {}", turn.turn_number, turn.question);
                            println!("        {}", turn.answer);
                        }
                    }
                    CallExecution::Retrying { next_attempt } => {
                        println!("- Call failed, retry scheduled for {}", next_attempt);
                    }
                    CallExecution::Abandoned => {
                        println!("- Call abandoned after exhausting retries");
                    }
                }
            }
            CallScheduleOutcome::NotEligible { checks } => {
                println!("- Application not eligible for a call: {:?}", checks);
            }
        }
    }

    println!("\nInterview scheduling");
    let schedule = scheduler.schedule_interview(&record.id, None, true)?;
    println!(
        "- Interview {} booked for {} ({} minutes)",
        schedule.id.0, schedule.interview_date, schedule.duration_minutes
    );

    let planned = reminders.plan_for_schedule(&schedule)?;
    println!("- {} reminder(s) planned:", planned.len());
    for reminder in &planned {
        println!("  - {:?} stage, due {}", reminder.stage, reminder.send_at);
    }

    let confirmed = scheduler.confirm(&schedule.id, ConfirmingParty::Candidate)?;
    println!(
        "- Candidate confirmed -> status {:?}",
        confirmed.status
    );
    let confirmed = scheduler.confirm(&schedule.id, ConfirmingParty::Employer)?;
    println!("- Employer confirmed -> status {:?}", confirmed.status);

    if let Some(next_due) = planned.iter().map(|reminder| reminder.send_at).min() {
        clock.set(next_due);
        let scan = reminders.process_due()?;
        println!(
            "- Reminder scan: {} scanned, {} dispatched, {} skipped",
            scan.scanned, scan.dispatched, scan.skipped
        );
        let due = store
            .due_reminders(clock.now())
            .map_err(InterviewServiceError::from)?;
        for reminder in due {
            match reminders.deliver(&reminder.id)? {
                ReminderDelivery::Sent => {
                    println!("- Reminder {} delivered", reminder.id.0);
                }
                ReminderDelivery::Retrying { next_attempt } => {
                    println!(
                        "- Reminder {} failed, retry at {}",
                        reminder.id.0, next_attempt
                    );
                }
                ReminderDelivery::Abandoned => {
                    println!("- Reminder {} abandoned", reminder.id.0);
                }
            }
        }
        let outbox = notifier.messages();
        println!("- Outbox holds {} message(s):", outbox.len());
        for message in &outbox {
            println!("  - to {}: {}", message.recipient, message.subject);
        }
    }

    recruiting.transition(
        &record.id,
        ApplicationStatus::Reviewed,
        "demo",
        Some("screening call completed".to_string()),
    )?;

    println!("\nHiring report");
    let report = reports.generate(&record.id)?;
    if report_json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(err) => println!("Report serialization failed: {}", err),
        }
    } else {
        println!("- {} for {}", report.report_id, report.candidate.name);
        println!(
            "- Recommendation: {} (priority {}) -> {}",
            report.analysis.recommendation.decision,
            report.analysis.recommendation.priority,
            report.analysis.recommendation.next_step
        );
        println!(
            "- Overall {:.1} ({}) with weights {}% ATS / {}% interview",
            report.overall.score,
            report.overall.rating,
            report.overall.ats_weight,
            report.overall.interview_weight
        );
        if !report.analysis.strengths.is_empty() {
            println!("- Strengths:");
            for strength in &report.analysis.strengths {
                println!("  - {}", strength);
            }
        }
        if !report.analysis.risks.is_empty() {
            println!("- Risks:");
            for risk in &report.analysis.risks {
                println!("  - {}", risk);
            }
        }
        println!("- Timeline:");
        for change in &report.timeline {
            println!(
                "  - {} -> {} by {} at {}",
                change.from.label(),
                change.to.label(),
                change.actor,
                change.changed_at
            );
        }
    }

    println!(
        "\nBackground queue recorded {} task(s) during the run",
        dispatcher.tasks().len()
    );

    Ok(())
}
