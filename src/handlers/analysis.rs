//! Log analysis handlers

use axum::extract::State;
use axum::http::{HeaderName, HeaderValue};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

use crate::AppState;
use crate::models::{AnalyzeRawRequest, AnalyzeRequest, AnalyzeResponse, LogEntry};
use crate::services::AnalysisOutcome;
use crate::utils::{ApiJson, ApiResult, parse_lines};

pub const ANALYSIS_SOURCE_HEADER: &str = "x-analysis-source";

/// Analyze a batch of log entries
///
/// Always answers 200 for a well-formed body; degraded results use the rule engine.
#[utoipa::path(
    post,
    path = "/analyze",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "Clustered error patterns", body = AnalyzeResponse),
        (status = 400, description = "Malformed JSON"),
        (status = 422, description = "Body does not match the schema"),
    ),
    tag = "Analysis"
)]
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<AnalyzeRequest>,
) -> ApiResult<Response> {
    Ok(run_analysis(&state, req.logs).await)
}

/// Parse raw log lines, then analyze them like `/analyze`
#[utoipa::path(
    post,
    path = "/analyze/raw",
    request_body = AnalyzeRawRequest,
    responses(
        (status = 200, description = "Clustered error patterns", body = AnalyzeResponse),
        (status = 400, description = "Malformed JSON"),
        (status = 422, description = "Body does not match the schema"),
    ),
    tag = "Analysis"
)]
pub async fn analyze_raw(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<AnalyzeRawRequest>,
) -> ApiResult<Response> {
    let logs = parse_lines(&req.lines, req.service_name.as_deref());
    tracing::debug!("Parsed {} raw lines", logs.len());
    Ok(run_analysis(&state, logs).await)
}

async fn run_analysis(state: &AppState, logs: Vec<LogEntry>) -> Response {
    let span = tracing::info_span!("analyze", request_id = %Uuid::new_v4(), entries = logs.len());

    let outcome = async {
        let t0 = std::time::Instant::now();
        let outcome = state.log_analysis_service.analyze(&logs).await;
        tracing::info!(
            "Analysis finished: source={}, clusters={}, {}ms",
            outcome.source.as_str(),
            outcome.response.clusters.len(),
            t0.elapsed().as_millis()
        );
        outcome
    }
    .instrument(span)
    .await;

    into_response(outcome)
}

fn into_response(outcome: AnalysisOutcome) -> Response {
    let mut response = ApiJson(outcome.response).into_response();
    response.headers_mut().insert(
        HeaderName::from_static(ANALYSIS_SOURCE_HEADER),
        HeaderValue::from_static(outcome.source.as_str()),
    );
    response
}
