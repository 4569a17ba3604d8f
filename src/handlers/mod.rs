pub mod analysis;
pub mod llm;
