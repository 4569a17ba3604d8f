//! LLM Data Models
//!
//! Generation request/response types and the adapter error surface.

use serde::Serialize;

use crate::config::LLMConfig;

// ============================================================================
// Generation Request / Response
// ============================================================================

/// Output format requested from the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseMode {
    Text,
    JsonObject,
}

/// A single text-generation call
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub response_mode: ResponseMode,
    pub temperature: f64,
    pub max_tokens: u32,
}

/// Raw provider output
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationResponse {
    pub content: String,
    pub input_tokens: i32,
    pub output_tokens: i32,
}

impl GenerationResponse {
    pub fn from_content(content: impl Into<String>) -> Self {
        Self { content: content.into(), ..Default::default() }
    }
}

/// Provider info for external display (without sensitive data)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LLMProviderInfo {
    pub enabled: bool,
    pub api_base: String,
    pub model: String,
    pub api_key_configured: bool,
    pub temperature: f64,
    pub max_tokens: u32,
    pub timeout_seconds: u64,
}

impl From<&LLMConfig> for LLMProviderInfo {
    fn from(c: &LLMConfig) -> Self {
        Self {
            enabled: c.enabled,
            api_base: c.api_base.clone(),
            model: c.model_name.clone(),
            api_key_configured: c.has_api_key(),
            temperature: c.temperature,
            max_tokens: c.max_tokens,
            timeout_seconds: c.timeout_seconds,
        }
    }
}

// ============================================================================
// LLM Error Types
// ============================================================================

/// LLM adapter errors. Every variant is recovered by falling back to the rule engine.
#[derive(Debug, thiserror::Error)]
pub enum LLMError {
    #[error("LLM service disabled")]
    Disabled,

    #[error("LLM API key not configured")]
    NoApiKey,

    #[error("LLM API error: {0}")]
    ApiError(String),

    #[error("LLM timeout after {0}s")]
    Timeout(u64),

    #[error("LLM rate limited, retry after {0}s")]
    RateLimited(u64),

    #[error("Empty response from LLM")]
    EmptyResponse,

    #[error("LLM response parsing error: {0}")]
    ParseError(String),

    #[error("LLM response schema error: {0}")]
    SchemaError(String),

    #[error("LLM response type conversion error: {0}")]
    TypeConversion(String),
}

impl LLMError {
    /// Stable identifier used in operator logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::NoApiKey => "no_api_key",
            Self::ApiError(_) => "api_error",
            Self::Timeout(_) => "timeout",
            Self::RateLimited(_) => "rate_limited",
            Self::EmptyResponse => "empty_response",
            Self::ParseError(_) => "parse_error",
            Self::SchemaError(_) => "schema_error",
            Self::TypeConversion(_) => "type_conversion",
        }
    }

    /// Transport-level failure, as opposed to a bad response body
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::ApiError(_) | Self::Timeout(_) | Self::RateLimited(_))
    }
}
