pub mod llm;
pub mod log_analysis_service;
pub mod rule_classifier;

pub use log_analysis_service::{AnalysisOutcome, AnalysisSource, LogAnalysisService};
pub use rule_classifier::classify;
