use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A single observed log line as submitted by the caller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
    pub message: String,
    /// Original unparsed line, preferred over `message` when prompting the LLM
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_line: Option<String>,
}

impl LogEntry {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), ..Default::default() }
    }

    /// Text used for the LLM transcript: the raw line unless it is missing or empty
    pub fn prompt_line(&self) -> &str {
        self.raw_line
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.message)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct AnalyzeRequest {
    pub logs: Vec<LogEntry>,
}

/// Raw, unparsed lines from one service
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRawRequest {
    #[serde(default)]
    pub service_name: Option<String>,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorCluster {
    pub pattern: String,
    pub count: u64,
    pub explanation: String,
    pub suggested_fix: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub clusters: Vec<ErrorCluster>,
    pub overall_summary: String,
}

impl AnalyzeResponse {
    /// Total number of entries the clusters claim to cover
    pub fn total_count(&self) -> u64 {
        self.clusters.iter().map(|c| c.count).sum()
    }
}
