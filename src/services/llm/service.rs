//! LLM Service Trait and Implementation
//!
//! Defines the text-generation capability and the log analysis adapter built on it.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

use super::models::*;
use super::prompt::{SYSTEM_PROMPT, build_user_prompt};
use crate::models::{AnalyzeResponse, ErrorCluster, LogEntry};

pub const DEFAULT_TEMPERATURE: f64 = 0.2;
pub const DEFAULT_MAX_TOKENS: u32 = 700;

pub const EMPTY_INPUT_SUMMARY: &str = "No logs to analyze.";
pub const DEFAULT_SUMMARY: &str = "Log analysis completed.";

// ============================================================================
// Text Generation Capability
// ============================================================================

/// External text-generation service. One call, no retries.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, LLMError>;
}

// ============================================================================
// LLM Analyzer
// ============================================================================

/// Log analysis adapter: prompt construction, invocation and response validation
pub struct LLMAnalyzer {
    generator: Arc<dyn TextGenerator>,
    temperature: f64,
    max_tokens: u32,
}

impl LLMAnalyzer {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator, temperature: DEFAULT_TEMPERATURE, max_tokens: DEFAULT_MAX_TOKENS }
    }

    pub fn with_sampling(mut self, temperature: f64, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    pub fn build_request(&self, logs: &[LogEntry]) -> GenerationRequest {
        GenerationRequest {
            system_prompt: SYSTEM_PROMPT.to_string(),
            user_prompt: build_user_prompt(logs),
            response_mode: ResponseMode::JsonObject,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }

    /// Analyze a batch with the LLM. Empty input returns without calling the provider.
    pub async fn analyze(&self, logs: &[LogEntry]) -> Result<AnalyzeResponse, LLMError> {
        if logs.is_empty() {
            return Ok(AnalyzeResponse {
                clusters: Vec::new(),
                overall_summary: EMPTY_INPUT_SUMMARY.to_string(),
            });
        }

        let request = self.build_request(logs);
        let start = std::time::Instant::now();
        let response = self.generator.generate(&request).await?;
        tracing::info!(
            "LLM analysis of {} entries completed in {}ms",
            logs.len(),
            start.elapsed().as_millis()
        );

        parse_analysis(&response.content)
    }
}

// ============================================================================
// Response Validation
// ============================================================================

/// Parse the provider's JSON reply. Any malformed cluster fails the whole reply.
pub fn parse_analysis(content: &str) -> Result<AnalyzeResponse, LLMError> {
    let value: Value = serde_json::from_str(content).map_err(|e| {
        LLMError::ParseError(format!("Failed to parse LLM response: {}. Content: {}", e, content))
    })?;

    let obj = value.as_object().ok_or_else(|| {
        LLMError::SchemaError(format!("expected a JSON object, got {}", json_type(&value)))
    })?;

    let clusters = match obj.get("clusters") {
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(idx, item)| parse_cluster(idx, item))
            .collect::<Result<Vec<_>, _>>()?,
        Some(other) => {
            tracing::debug!("Ignoring non-array 'clusters' ({})", json_type(other));
            Vec::new()
        },
        None => Vec::new(),
    };

    let overall_summary = match obj.get("overallSummary") {
        None => DEFAULT_SUMMARY.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => {
            return Err(LLMError::SchemaError(format!(
                "overallSummary must be a string, got {}",
                json_type(other)
            )));
        },
    };

    Ok(AnalyzeResponse { clusters, overall_summary })
}

fn parse_cluster(idx: usize, item: &Value) -> Result<ErrorCluster, LLMError> {
    let obj = item.as_object().ok_or_else(|| {
        LLMError::SchemaError(format!("cluster[{}] must be an object, got {}", idx, json_type(item)))
    })?;

    let pattern = required_str(obj, idx, "pattern")?;
    let count_value = obj
        .get("count")
        .ok_or_else(|| LLMError::SchemaError(format!("cluster[{}] missing 'count'", idx)))?;
    let count = coerce_count(count_value)
        .map_err(|msg| LLMError::TypeConversion(format!("cluster[{}].count: {}", idx, msg)))?;
    let explanation = required_str(obj, idx, "explanation")?;
    let suggested_fix = required_str(obj, idx, "suggestedFix")?;

    Ok(ErrorCluster { pattern, count, explanation, suggested_fix })
}

fn required_str(obj: &Map<String, Value>, idx: usize, key: &str) -> Result<String, LLMError> {
    match obj.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(LLMError::SchemaError(format!(
            "cluster[{}].{} must be a string, got {}",
            idx,
            key,
            json_type(other)
        ))),
        None => Err(LLMError::SchemaError(format!("cluster[{}] missing '{}'", idx, key))),
    }
}

/// Integer coercion: integers as-is, floats truncated, booleans as 0/1,
/// and strings holding an optionally signed decimal integer.
pub fn coerce_count(value: &Value) -> Result<u64, String> {
    let n: i128 = match value {
        Value::Number(num) => {
            if let Some(v) = num.as_u64() {
                v as i128
            } else if let Some(v) = num.as_i64() {
                v as i128
            } else if let Some(v) = num.as_f64() {
                if !v.is_finite() {
                    return Err(format!("non-finite number {}", v));
                }
                v.trunc() as i128
            } else {
                return Err(format!("unsupported number {}", num));
            }
        },
        Value::Bool(b) => i128::from(*b),
        Value::String(s) => {
            let trimmed = s.trim();
            let digits = trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed);
            if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
                return Err(format!("invalid integer literal {:?}", s));
            }
            trimmed.parse::<i128>().map_err(|e| format!("invalid integer literal {:?}: {}", s, e))?
        },
        other => return Err(format!("expected a number, got {}", json_type(other))),
    };

    u64::try_from(n).map_err(|_| format!("count out of range: {}", n))
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
