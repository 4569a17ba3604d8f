//! LLM API Handlers

use axum::{Json, extract::State, response::IntoResponse};
use std::sync::Arc;

use crate::AppState;
use crate::services::llm::LLMProviderInfo;

/// Get LLM provider status
/// GET /api/llm/status
pub async fn get_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(LLMProviderInfo::from(state.llm_config.as_ref()))
}
