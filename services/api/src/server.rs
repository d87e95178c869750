use crate::cli::ServeArgs;
use crate::infra::{AppState, WorkforceService};
use crate::routes::workforce_router;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use headcount::config::AppConfig;
use headcount::error::AppError;
use headcount::telemetry;
use headcount::workforce::WorkforceLoader;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    if config.sources.roster.is_none() || config.sources.departures.is_none() {
        warn!("workforce sources not fully configured, only uploaded reports will succeed");
    }

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let loader = WorkforceLoader::new(config.sources.fetch_timeout)?;
    let service = Arc::new(WorkforceService::new(
        loader,
        config.sources.clone(),
        config.reporting.probation_months,
    ));

    let app = workforce_router(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "headcount dashboard service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
