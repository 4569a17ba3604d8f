//! Log analysis orchestration
//!
//! LLM first, rule-based fallback. From the caller's side `analyze` cannot fail.

use serde::Serialize;

use crate::models::{AnalyzeResponse, LogEntry};
use crate::services::llm::LLMAnalyzer;
use crate::services::rule_classifier;

/// Which engine produced a response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisSource {
    Llm,
    RuleBased,
}

impl AnalysisSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Llm => "llm",
            Self::RuleBased => "rule_based",
        }
    }
}

/// Orchestrator outcome: the response plus its origin (not serialized into the body)
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub response: AnalyzeResponse,
    pub source: AnalysisSource,
}

pub struct LogAnalysisService {
    analyzer: LLMAnalyzer,
}

impl LogAnalysisService {
    pub fn new(analyzer: LLMAnalyzer) -> Self {
        Self { analyzer }
    }

    /// Run the LLM adapter; on any error log it and substitute the rule engine result
    pub async fn analyze(&self, logs: &[LogEntry]) -> AnalysisOutcome {
        match self.analyzer.analyze(logs).await {
            Ok(response) => {
                tracing::info!(
                    "LLM analysis produced {} clusters for {} entries",
                    response.clusters.len(),
                    logs.len()
                );
                AnalysisOutcome { response, source: AnalysisSource::Llm }
            },
            Err(e) => {
                tracing::warn!(
                    error.kind = e.kind(),
                    "LLM analysis failed, falling back to rule-based: {}",
                    e
                );
                let response = rule_classifier::classify(logs);
                tracing::info!(
                    "Rule-based analysis produced {} clusters for {} entries",
                    response.clusters.len(),
                    logs.len()
                );
                AnalysisOutcome { response, source: AnalysisSource::RuleBased }
            },
        }
    }
}
