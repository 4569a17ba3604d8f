use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{AppState, handlers, models};

#[derive(OpenApi)]
#[openapi(
    paths(handlers::analysis::analyze, handlers::analysis::analyze_raw),
    components(schemas(
        models::LogEntry,
        models::AnalyzeRequest,
        models::AnalyzeRawRequest,
        models::ErrorCluster,
        models::AnalyzeResponse,
    )),
    tags((name = "Analysis", description = "Log pattern analysis endpoints"))
)]
pub struct ApiDoc;

/// Build the full application router
pub fn build_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/analyze", post(handlers::analysis::analyze))
        .route("/analyze/raw", post(handlers::analysis::analyze_raw))
        .route("/api/llm/status", get(handlers::llm::get_status))
        .with_state(state);

    let health_routes = Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(ready_check));

    Router::new()
        .merge(SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_routes)
        .merge(health_routes)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(tower_http::cors::CorsLayer::permissive())
}

async fn health_check() -> &'static str {
    "OK"
}

async fn ready_check() -> &'static str {
    "READY"
}
