use crate::infra::{deserialize_optional_date, AppState, WorkforceService};
use crate::report::{build_payload, ClassificationView, ReportResponse, ViewSelection};
use axum::extract::Query;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::{Local, NaiveDate};
use headcount::error::AppError;
use headcount::workforce::sources::{parse_departures, parse_roster};
use headcount::workforce::{
    ReportOptions, DEFAULT_DEPARTURES_SKIP_ROWS, DEFAULT_ROSTER_SKIP_ROWS,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ReportQuery {
    #[serde(default)]
    pub(crate) granularity: ViewSelection,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) as_of: Option<NaiveDate>,
    #[serde(default)]
    pub(crate) refresh: bool,
}

/// Report over CSV text posted inline instead of the configured sources.
#[derive(Debug, Deserialize)]
pub(crate) struct UploadedReportRequest {
    pub(crate) roster_csv: String,
    pub(crate) departures_csv: String,
    #[serde(default)]
    pub(crate) roster_skip_rows: Option<usize>,
    #[serde(default)]
    pub(crate) departures_skip_rows: Option<usize>,
    #[serde(default)]
    pub(crate) granularity: ViewSelection,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) as_of: Option<NaiveDate>,
    #[serde(default)]
    pub(crate) probation_months: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ClassifyQuery {
    #[serde(default)]
    pub(crate) label: Option<String>,
}

pub(crate) fn workforce_router(service: Arc<WorkforceService>) -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route(
            "/api/v1/workforce/report",
            get(configured_report_endpoint).post(uploaded_report_endpoint),
        )
        .route("/api/v1/workforce/cache/refresh", post(refresh_endpoint))
        .route("/api/v1/workforce/classify", get(classify_endpoint))
        .layer(Extension(service))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn configured_report_endpoint(
    Extension(service): Extension<Arc<WorkforceService>>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<ReportResponse>, AppError> {
    let (roster, departures) = service.datasets(query.refresh).await?;

    let options = ReportOptions {
        as_of: query.as_of.unwrap_or_else(|| Local::now().date_naive()),
        probation_months: service.probation_months(),
    };
    let report = build_payload(&roster.records, &departures.records, query.granularity, options);

    Ok(Json(ReportResponse {
        roster: roster.summary.clone(),
        departures: departures.summary.clone(),
        report,
    }))
}

pub(crate) async fn uploaded_report_endpoint(
    Extension(service): Extension<Arc<WorkforceService>>,
    Json(payload): Json<UploadedReportRequest>,
) -> Result<Json<ReportResponse>, AppError> {
    let UploadedReportRequest {
        roster_csv,
        departures_csv,
        roster_skip_rows,
        departures_skip_rows,
        granularity,
        as_of,
        probation_months,
    } = payload;

    let roster = parse_roster(
        roster_csv.as_bytes(),
        roster_skip_rows.unwrap_or(DEFAULT_ROSTER_SKIP_ROWS),
    )?;
    let departures = parse_departures(
        departures_csv.as_bytes(),
        departures_skip_rows.unwrap_or(DEFAULT_DEPARTURES_SKIP_ROWS),
    )?;
    info!(
        roster_rows = roster.len(),
        departure_rows = departures.len(),
        "building report from uploaded sheets"
    );

    let options = ReportOptions {
        as_of: as_of.unwrap_or_else(|| Local::now().date_naive()),
        probation_months: probation_months.unwrap_or_else(|| service.probation_months()),
    };
    let report = build_payload(&roster.records, &departures.records, granularity, options);

    Ok(Json(ReportResponse {
        roster: roster.summary,
        departures: departures.summary,
        report,
    }))
}

pub(crate) async fn refresh_endpoint(
    Extension(service): Extension<Arc<WorkforceService>>,
) -> Json<serde_json::Value> {
    let (evicted, sources) = service.refresh().await;
    let sources: Vec<String> = sources.iter().map(ToString::to_string).collect();
    Json(json!({ "evicted": evicted, "sources": sources }))
}

pub(crate) async fn classify_endpoint(Query(query): Query<ClassifyQuery>) -> Json<ClassificationView> {
    Json(ClassificationView::of(query.label.as_deref()))
}
