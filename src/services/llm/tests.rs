//! LLM Service Unit Tests
//!
//! Adapter tests against a scripted generator; no network access.

use super::*;
use crate::models::LogEntry;
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Scripted generator that records every call
pub(crate) struct FakeGenerator {
    reply: Box<dyn Fn() -> Result<GenerationResponse, LLMError> + Send + Sync>,
    calls: AtomicUsize,
    last_request: Mutex<Option<GenerationRequest>>,
}

impl FakeGenerator {
    pub(crate) fn replying(content: impl Into<String>) -> Arc<Self> {
        let content = content.into();
        Arc::new(Self::new(move || Ok(GenerationResponse::from_content(content.clone()))))
    }

    pub(crate) fn failing(make_err: impl Fn() -> LLMError + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self::new(move || Err(make_err())))
    }

    fn new(reply: impl Fn() -> Result<GenerationResponse, LLMError> + Send + Sync + 'static) -> Self {
        Self { reply: Box::new(reply), calls: AtomicUsize::new(0), last_request: Mutex::new(None) }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn last_request(&self) -> Option<GenerationRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, LLMError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        (self.reply)()
    }
}

fn logs(messages: &[&str]) -> Vec<LogEntry> {
    messages.iter().map(|m| LogEntry::new(*m)).collect()
}

fn analyzer(generator: &Arc<FakeGenerator>) -> LLMAnalyzer {
    LLMAnalyzer::new(generator.clone())
}

#[cfg(test)]
mod analyzer_tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_input_skips_provider() {
        let generator = FakeGenerator::replying("{}");
        let response = analyzer(&generator).analyze(&[]).await.unwrap();

        assert!(response.clusters.is_empty());
        assert_eq!(response.overall_summary, "No logs to analyze.");
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_well_formed_reply_parsed_as_is() {
        let reply = json!({
            "clusters": [
                {"pattern": "DB pool exhausted", "count": 4, "explanation": "pool too small", "suggestedFix": "grow pool"},
                {"pattern": "Upstream timeouts", "count": "2", "explanation": "slow upstream", "suggestedFix": "add timeouts"}
            ],
            "overallSummary": "Two issues found."
        });
        let generator = FakeGenerator::replying(reply.to_string());

        let response = analyzer(&generator).analyze(&logs(&["a", "b"])).await.unwrap();

        assert_eq!(generator.calls(), 1);
        assert_eq!(response.overall_summary, "Two issues found.");
        assert_eq!(response.clusters.len(), 2);
        assert_eq!(response.clusters[0].pattern, "DB pool exhausted");
        assert_eq!(response.clusters[0].count, 4);
        assert_eq!(response.clusters[0].suggested_fix, "grow pool");
        assert_eq!(response.clusters[1].count, 2);
    }

    #[tokio::test]
    async fn test_request_carries_prompts_and_sampling() {
        let generator = FakeGenerator::replying(r#"{"clusters": []}"#);
        let mut entry = LogEntry::new("parsed");
        entry.raw_line = Some("RAW LINE 1".to_string());

        analyzer(&generator).analyze(&[entry, LogEntry::new("second")]).await.unwrap();

        let request = generator.last_request().unwrap();
        assert_eq!(request.system_prompt, SYSTEM_PROMPT);
        assert!(request.user_prompt.contains("Logs:\nRAW LINE 1\nsecond"));
        assert_eq!(request.response_mode, ResponseMode::JsonObject);
        assert_eq!(request.temperature, 0.2);
        assert_eq!(request.max_tokens, 700);
    }

    #[tokio::test]
    async fn test_custom_sampling() {
        let generator = FakeGenerator::replying(r#"{"clusters": []}"#);
        LLMAnalyzer::new(generator.clone())
            .with_sampling(0.0, 256)
            .analyze(&logs(&["x"]))
            .await
            .unwrap();

        let request = generator.last_request().unwrap();
        assert_eq!(request.temperature, 0.0);
        assert_eq!(request.max_tokens, 256);
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let generator = FakeGenerator::failing(|| LLMError::ApiError("connection refused".into()));
        let err = analyzer(&generator).analyze(&logs(&["x"])).await.unwrap_err();

        assert!(matches!(err, LLMError::ApiError(_)));
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn test_non_numeric_count_fails_whole_reply() {
        let reply = json!({
            "clusters": [
                {"pattern": "ok", "count": 1, "explanation": "e", "suggestedFix": "f"},
                {"pattern": "bad", "count": "several", "explanation": "e", "suggestedFix": "f"}
            ],
            "overallSummary": "s"
        });
        let generator = FakeGenerator::replying(reply.to_string());
        let err = analyzer(&generator).analyze(&logs(&["x"])).await.unwrap_err();

        assert!(matches!(err, LLMError::TypeConversion(_)), "got {:?}", err);
    }
}

#[cfg(test)]
mod parse_tests {
    use super::*;

    #[test]
    fn test_missing_summary_defaults() {
        let response = parse_analysis(r#"{"clusters": []}"#).unwrap();
        assert_eq!(response.overall_summary, "Log analysis completed.");
    }

    #[test]
    fn test_missing_or_malformed_clusters_is_empty() {
        for body in [
            r#"{"overallSummary": "s"}"#,
            r#"{"clusters": null, "overallSummary": "s"}"#,
            r#"{"clusters": "none", "overallSummary": "s"}"#,
            r#"{"clusters": {"pattern": "x"}, "overallSummary": "s"}"#,
        ] {
            let response = parse_analysis(body).unwrap();
            assert!(response.clusters.is_empty(), "body: {}", body);
            assert_eq!(response.overall_summary, "s");
        }
    }

    #[test]
    fn test_non_json_is_parse_error() {
        let err = parse_analysis("Sure! Here are your clusters:").unwrap_err();
        assert!(matches!(err, LLMError::ParseError(_)));
    }

    #[test]
    fn test_non_object_is_schema_error() {
        let err = parse_analysis("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, LLMError::SchemaError(_)));
    }

    #[test]
    fn test_missing_required_keys_fail() {
        for key in ["pattern", "count", "explanation", "suggestedFix"] {
            let mut cluster = json!({"pattern": "p", "count": 1, "explanation": "e", "suggestedFix": "f"});
            cluster.as_object_mut().unwrap().remove(key);
            let body = json!({"clusters": [cluster], "overallSummary": "s"}).to_string();

            let err = parse_analysis(&body).unwrap_err();
            assert!(matches!(err, LLMError::SchemaError(_)), "key {}: {:?}", key, err);
        }
    }

    #[test]
    fn test_non_string_fields_fail() {
        let body = json!({
            "clusters": [{"pattern": 42, "count": 1, "explanation": "e", "suggestedFix": "f"}]
        })
        .to_string();
        assert!(matches!(parse_analysis(&body), Err(LLMError::SchemaError(_))));

        let body = json!({"clusters": [], "overallSummary": null}).to_string();
        assert!(matches!(parse_analysis(&body), Err(LLMError::SchemaError(_))));
    }

    #[test]
    fn test_non_object_cluster_fails() {
        let body = json!({"clusters": ["just a string"]}).to_string();
        assert!(matches!(parse_analysis(&body), Err(LLMError::SchemaError(_))));
    }

    #[test]
    fn test_llm_counts_not_reconciled() {
        // Model may over-count; the adapter passes counts through unchanged
        let body = json!({
            "clusters": [{"pattern": "p", "count": 99, "explanation": "e", "suggestedFix": "f"}],
            "overallSummary": "s"
        })
        .to_string();
        assert_eq!(parse_analysis(&body).unwrap().total_count(), 99);
    }
}

#[cfg(test)]
mod coerce_tests {
    use super::*;

    #[test]
    fn test_accepted_values() {
        assert_eq!(coerce_count(&json!(3)), Ok(3));
        assert_eq!(coerce_count(&json!(3.9)), Ok(3));
        assert_eq!(coerce_count(&json!("7")), Ok(7));
        assert_eq!(coerce_count(&json!(" 12 ")), Ok(12));
        assert_eq!(coerce_count(&json!("+5")), Ok(5));
        assert_eq!(coerce_count(&json!(true)), Ok(1));
        assert_eq!(coerce_count(&json!(false)), Ok(0));
    }

    #[test]
    fn test_rejected_values() {
        for value in [
            json!("three"),
            json!("3.5"),
            json!(""),
            json!("-"),
            json!(null),
            json!([1]),
            json!({"n": 1}),
            json!(-2),
            json!("-4"),
        ] {
            assert!(coerce_count(&value).is_err(), "value: {}", value);
        }
    }
}
