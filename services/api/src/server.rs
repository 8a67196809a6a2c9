use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryLoanRepository, InMemoryNoticePublisher};
use crate::jobs;
use crate::routes::with_lending_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use loandesk::config::AppConfig;
use loandesk::error::AppError;
use loandesk::lending::LoanService;
use loandesk::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
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

    let repository = Arc::new(InMemoryLoanRepository::default());
    let notices = Arc::new(InMemoryNoticePublisher::default());
    let loan_service = Arc::new(LoanService::new(
        repository,
        notices,
        config.engine.clone(),
    ));

    let _scheduler = jobs::schedule_sweeps(loan_service.clone(), &config.sweep).await?;

    let app = with_lending_routes(loan_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "loan back office ready");

    axum::serve(listener, app).await?;
    Ok(())
}
