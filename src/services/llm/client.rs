//! LLM Client - HTTP client for OpenAI-compatible APIs
//!
//! Uses reqwest to call the chat completions endpoint. Compatible with:
//! - OpenAI
//! - Azure OpenAI
//! - DeepSeek
//! - Other OpenAI-compatible APIs

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::models::*;
use super::service::TextGenerator;
use crate::config::LLMConfig;

/// LLM HTTP Client
pub struct OpenAIClient {
    http_client: Client,
    api_base: String,
    api_key: Option<String>,
    model_name: String,
    timeout_seconds: u64,
    enabled: bool,
}

impl OpenAIClient {
    pub fn new(config: &LLMConfig) -> Result<Self, LLMError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| LLMError::ApiError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
            model_name: config.model_name.clone(),
            timeout_seconds: config.timeout_seconds,
            enabled: config.enabled,
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base)
    }

    fn build_chat_request(&self, request: &GenerationRequest) -> ChatCompletionRequest {
        let response_format = match request.response_mode {
            ResponseMode::JsonObject => Some(ResponseFormat { r#type: "json_object".to_string() }),
            ResponseMode::Text => None,
        };

        ChatCompletionRequest {
            model: self.model_name.clone(),
            messages: vec![
                ChatMessage { role: "system".to_string(), content: request.system_prompt.clone() },
                ChatMessage { role: "user".to_string(), content: request.user_prompt.clone() },
            ],
            max_tokens: Some(request.max_tokens),
            temperature: Some(request.temperature),
            response_format,
        }
    }
}

#[async_trait]
impl TextGenerator for OpenAIClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, LLMError> {
        if !self.enabled {
            return Err(LLMError::Disabled);
        }
        let api_key = self.api_key.as_ref().ok_or(LLMError::NoApiKey)?;

        let url = self.completions_url();
        let chat_request = self.build_chat_request(request);

        tracing::debug!("Calling LLM API: {} with model {}", url, self.model_name);

        let response = self
            .http_client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&chat_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LLMError::Timeout(self.timeout_seconds)
                } else {
                    LLMError::ApiError(e.to_string())
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(LLMError::RateLimited(retry_after));
        }

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LLMError::ApiError(format!("API error {}: {}", status, error_text)));
        }

        let chat_response: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LLMError::ParseError(e.to_string()))?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(LLMError::EmptyResponse)?;

        let (input_tokens, output_tokens) = chat_response
            .usage
            .map(|u| (u.prompt_tokens, u.completion_tokens))
            .unwrap_or((0, 0));

        tracing::debug!(
            "LLM API returned {} chars (input_tokens={}, output_tokens={})",
            content.len(),
            input_tokens,
            output_tokens
        );

        Ok(GenerationResponse { content, input_tokens, output_tokens })
    }
}

// ============================================================================
// OpenAI API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    r#type: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: i32,
    completion_tokens: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> GenerationRequest {
        GenerationRequest {
            system_prompt: "sys".to_string(),
            user_prompt: "user".to_string(),
            response_mode: ResponseMode::JsonObject,
            temperature: 0.2,
            max_tokens: 700,
        }
    }

    #[test]
    fn test_chat_request_shape() {
        let config = LLMConfig {
            api_base: "https://llm.internal/v1/".to_string(),
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        };
        let client = OpenAIClient::new(&config).unwrap();
        assert_eq!(client.completions_url(), "https://llm.internal/v1/chat/completions");

        let body = serde_json::to_value(client.build_chat_request(&sample_request())).unwrap();
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "user");
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["max_tokens"], 700);
        assert_eq!(body["temperature"], 0.2);
    }

    #[test]
    fn test_text_mode_omits_response_format() {
        let client = OpenAIClient::new(&LLMConfig::default()).unwrap();
        let request = GenerationRequest { response_mode: ResponseMode::Text, ..sample_request() };
        let body = serde_json::to_value(client.build_chat_request(&request)).unwrap();
        assert!(body.get("response_format").is_none());
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_without_network() {
        let client = OpenAIClient::new(&LLMConfig::default()).unwrap();
        let err = client.generate(&sample_request()).await.unwrap_err();
        assert!(matches!(err, LLMError::NoApiKey));
    }

    #[tokio::test]
    async fn test_disabled_fails_without_network() {
        let config =
            LLMConfig { enabled: false, api_key: Some("sk-test".to_string()), ..Default::default() };
        let client = OpenAIClient::new(&config).unwrap();
        let err = client.generate(&sample_request()).await.unwrap_err();
        assert!(matches!(err, LLMError::Disabled));
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_api_error() {
        let config = LLMConfig {
            // Port 9 (discard) on loopback is expected to refuse connections
            api_base: "http://127.0.0.1:9/v1".to_string(),
            api_key: Some("sk-test".to_string()),
            timeout_seconds: 5,
            ..Default::default()
        };
        let client = OpenAIClient::new(&config).unwrap();
        let err = client.generate(&sample_request()).await.unwrap_err();
        assert!(err.is_transport(), "unexpected error: {:?}", err);
    }
}
