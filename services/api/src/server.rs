use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryStore, InMemoryTaskQueue, OutboxNotifier, SimulatedVoice};
use crate::routes::with_service_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use talent_flow::clock::{Clock, SystemClock};
use talent_flow::config::AppConfig;
use talent_flow::error::AppError;
use talent_flow::telemetry;
use talent_flow::workflows::interview::{
    CallOrchestrator, InterviewScheduler, InterviewState, ReminderService,
};
use talent_flow::workflows::recruiting::RecruitingService;
use talent_flow::workflows::report::{ReportGenerator, ReportState};
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(InMemoryStore::default());
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let notifier = Arc::new(OutboxNotifier::default());
    let dispatcher = Arc::new(InMemoryTaskQueue::default());
    let voice = Arc::new(SimulatedVoice::default());

    let recruiting = Arc::new(RecruitingService::new(store.clone(), clock.clone()));
    let interviews = Arc::new(InterviewState {
        scheduler: Arc::new(InterviewScheduler::new(
            store.clone(),
            clock.clone(),
            &config.engine,
        )),
        reminders: Arc::new(ReminderService::new(
            store.clone(),
            clock.clone(),
            notifier,
            dispatcher.clone(),
            &config.engine,
        )),
        orchestrator: Arc::new(CallOrchestrator::new(
            store.clone(),
            clock.clone(),
            voice,
            dispatcher,
            &config.engine,
        )),
    });
    interviews.orchestrator.seed_default_flow()?;

    let reports = Arc::new(ReportState {
        generator: Arc::new(ReportGenerator::new(store.clone(), clock.clone())),
    });

    let app = with_service_routes(recruiting, interviews, reports)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "candidate workflow engine ready");

    axum::serve(listener, app).await?;
    Ok(())
}
