//! LLM Service Module
//!
//! LLM-backed log pattern analysis.
//!
//! # Architecture
//! ```text
//! ┌─────────────────┐
//! │   LLMAnalyzer   │  ← prompt + response validation
//! └────────┬────────┘
//!          │
//! ┌────────▼────────┐
//! │  TextGenerator  │  ← Trait (injectable capability)
//! └────────┬────────┘
//!          │
//!    ┌─────┴─────┐
//!    ▼           ▼
//! ┌──────┐  ┌──────────┐
//! │OpenAI│  │  Test    │
//! │Client│  │  fakes   │
//! └──────┘  └──────────┘
//! ```

mod client;
mod models;
mod prompt;
mod service;

pub use client::OpenAIClient;
pub use models::*;
pub use prompt::{SYSTEM_PROMPT, build_transcript, build_user_prompt};
pub use service::{
    DEFAULT_MAX_TOKENS, DEFAULT_SUMMARY, DEFAULT_TEMPERATURE, EMPTY_INPUT_SUMMARY, LLMAnalyzer,
    TextGenerator, coerce_count, parse_analysis,
};

#[cfg(test)]
pub(crate) mod tests;
