//! Log Intel Library
//!
//! Clusters batches of application logs into recurring error patterns.
//! The LLM path is preferred; the rule-based classifier is the fallback.

use std::sync::Arc;

pub mod config;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use services::llm::{LLMAnalyzer, LLMError, OpenAIClient, TextGenerator};
pub use services::{AnalysisSource, LogAnalysisService};

/// Application shared state
///
/// All services are wrapped in Arc for cheap cloning and thread safety.
#[derive(Clone)]
pub struct AppState {
    pub llm_config: Arc<config::LLMConfig>,
    pub log_analysis_service: Arc<LogAnalysisService>,
}

impl AppState {
    /// Build state backed by the OpenAI-compatible client
    pub fn from_config(llm_config: config::LLMConfig) -> Result<Self, LLMError> {
        let client = Arc::new(OpenAIClient::new(&llm_config)?);
        Ok(Self::with_generator(llm_config, client))
    }

    /// Build state around any text generator (tests plug fakes in here)
    pub fn with_generator(llm_config: config::LLMConfig, generator: Arc<dyn TextGenerator>) -> Self {
        let analyzer = LLMAnalyzer::new(generator)
            .with_sampling(llm_config.temperature, llm_config.max_tokens);

        Self {
            llm_config: Arc::new(llm_config),
            log_analysis_service: Arc::new(LogAnalysisService::new(analyzer)),
        }
    }
}
