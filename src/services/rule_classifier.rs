//! Rule-based classifier
//!
//! Deterministic keyword clustering used whenever the LLM path fails.
//! Rules are evaluated in table order and the first match wins.

use crate::models::{AnalyzeResponse, ErrorCluster, LogEntry};

/// Number of original messages retained per cluster
pub const MAX_SAMPLES: usize = 3;

// ============================================================================
// Rule Table
// ============================================================================

/// A single classification rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassificationRule {
    /// Lower-case substrings, any of which selects this rule
    pub markers: &'static [&'static str],
    pub pattern: &'static str,
    pub explanation: &'static str,
    pub suggested_fix: &'static str,
}

impl ClassificationRule {
    /// `message` must already be lower-cased
    fn matches(&self, message: &str) -> bool {
        self.markers.iter().any(|m| message.contains(m))
    }
}

/// Catch-all for messages no rule claims
pub const OTHER_LOGS: ClassificationRule = ClassificationRule {
    markers: &[],
    pattern: "Other logs",
    explanation: "These logs do not match common error patterns.",
    suggested_fix: "Inspect these log lines manually or enhance the analyzer rules.",
};

pub const RULES: &[ClassificationRule] = &[
    ClassificationRule {
        markers: &["timeout"],
        pattern: "Timeout errors",
        explanation: "The system is experiencing timeouts, likely due to slow downstream services or network issues.",
        suggested_fix: "Investigate slow endpoints, add retries with backoff, and monitor latency of dependent services.",
    },
    ClassificationRule {
        markers: &["database", "db "],
        pattern: "Database connectivity errors",
        explanation: "The application is unable to communicate with the database.",
        suggested_fix: "Check DB credentials, connection URL, network access, and database health.",
    },
    ClassificationRule {
        markers: &["unauthorized", "authentication"],
        pattern: "Authentication/authorization errors",
        explanation: "There are issues with user authentication or permissions.",
        suggested_fix: "Verify auth tokens, user roles, and configuration of your identity provider.",
    },
    ClassificationRule {
        markers: &["nullpointer", "null pointer"],
        pattern: "Null pointer exceptions",
        explanation: "The code is referencing objects that are not initialized.",
        suggested_fix: "Add null checks, validate inputs, and improve defensive coding practices.",
    },
    ClassificationRule {
        markers: &["exception", "error"],
        pattern: "Generic application errors",
        explanation: "The system is throwing various application-level errors.",
        suggested_fix: "Review exception stack traces, add logging, and write tests around failing paths.",
    },
];

/// Find the rule a message belongs to (case-insensitive)
pub fn match_rule(message: &str) -> &'static ClassificationRule {
    let lower = message.to_lowercase();
    RULES
        .iter()
        .find(|rule| rule.matches(&lower))
        .unwrap_or(&OTHER_LOGS)
}

// ============================================================================
// Clustering
// ============================================================================

/// Working state for one category during a classification run
#[derive(Debug, Clone)]
pub struct RuleCluster {
    pub rule: &'static ClassificationRule,
    pub count: u64,
    /// Up to [`MAX_SAMPLES`] original messages, not exposed on the wire
    pub samples: Vec<String>,
}

impl RuleCluster {
    fn new(rule: &'static ClassificationRule) -> Self {
        Self { rule, count: 0, samples: Vec::with_capacity(MAX_SAMPLES) }
    }

    fn add(&mut self, message: &str) {
        self.count += 1;
        if self.samples.len() < MAX_SAMPLES {
            self.samples.push(message.to_string());
        }
    }

    fn to_error_cluster(&self) -> ErrorCluster {
        ErrorCluster {
            pattern: self.rule.pattern.to_string(),
            count: self.count,
            explanation: self.rule.explanation.to_string(),
            suggested_fix: self.rule.suggested_fix.to_string(),
        }
    }
}

/// Group entries by rule, keeping categories in first-seen order
pub fn cluster_entries(logs: &[LogEntry]) -> Vec<RuleCluster> {
    let mut clusters: Vec<RuleCluster> = Vec::new();

    for log in logs {
        let rule = match_rule(&log.message);
        let idx = match clusters.iter().position(|c| c.rule.pattern == rule.pattern) {
            Some(idx) => idx,
            None => {
                clusters.push(RuleCluster::new(rule));
                clusters.len() - 1
            },
        };
        clusters[idx].add(&log.message);
    }

    clusters
}

/// Classify a batch with the fixed rule table. Never fails, empty input included.
pub fn classify(logs: &[LogEntry]) -> AnalyzeResponse {
    let clusters: Vec<ErrorCluster> =
        cluster_entries(logs).iter().map(RuleCluster::to_error_cluster).collect();

    let overall_summary = format!(
        "Analyzed {} log entries and detected {} error/issue categories.",
        logs.len(),
        clusters.len()
    );

    AnalyzeResponse { clusters, overall_summary }
}
