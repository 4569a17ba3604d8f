//! Prompt construction for log pattern analysis

use crate::models::LogEntry;

pub const SYSTEM_PROMPT: &str = "You are an expert backend/SRE engineer. \
You analyze application logs, detect error patterns, and suggest fixes.";

const USER_PROMPT_HEADER: &str = r#"
Analyze the following application logs.

1. Group similar errors into clusters.
2. For each cluster, provide:
   - pattern: short name summarizing the issue
   - count: how many log lines fall into this cluster (integer)
   - explanation: what is going wrong
   - suggestedFix: concrete, practical fix

3. Also provide an overallSummary.

Return ONLY valid JSON in exactly this structure:

{
  "clusters": [
    {
      "pattern": "string",
      "count": 3,
      "explanation": "string",
      "suggestedFix": "string"
    }
  ],
  "overallSummary": "string"
}

Logs:
"#;

/// Newline-joined log lines in input order
pub fn build_transcript(logs: &[LogEntry]) -> String {
    logs.iter().map(LogEntry::prompt_line).collect::<Vec<_>>().join("\n")
}

pub fn build_user_prompt(logs: &[LogEntry]) -> String {
    format!("{}{}\n", USER_PROMPT_HEADER, build_transcript(logs))
}
