//! Parsing and validation of the generation oracle's raw reply.

use crate::error::AnalysisError;
use crate::models::{Analysis, AnalysisMetadata, AnalysisResult};
use chrono::Utc;
use serde_json::Value;

/// Top-level fields without which a reply is not an analysis.
pub const REQUIRED_FIELDS: [&str; 2] = ["simplified", "riskAssessment"];

const FENCE: &str = "```";

/// Remove a Markdown code fence around the payload, if there is one.
///
/// Handles ```` ```json ```` and bare ```` ``` ```` openers and tolerates
/// chatter before the opening fence. Unfenced input is returned trimmed.
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();

    let Some(open) = trimmed.find(FENCE) else {
        return trimmed;
    };

    // A fence that only appears inside a JSON string is not a wrapper
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return trimmed;
    }

    let after_open = &trimmed[open + FENCE.len()..];
    let body = match after_open.split_once('\n') {
        Some((_lang, rest)) => rest,
        None => after_open.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
    };

    // The payload itself may contain backticks; the wrapper closes last
    let body = match body.rfind(FENCE) {
        Some(close) => &body[..close],
        None => body,
    };

    body.trim()
}

/// Parse the oracle's reply into an [`Analysis`].
pub fn parse_analysis(raw: &str) -> Result<Analysis, AnalysisError> {
    let body = strip_code_fences(raw);

    let value: Value = serde_json::from_str(body).map_err(|e| {
        AnalysisError::Parse(format!("Analysis response is not valid JSON: {}", e))
    })?;

    let object = value.as_object().ok_or_else(|| {
        AnalysisError::Schema("Analysis response must be a JSON object".to_string())
    })?;

    let missing: Vec<&str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| object.get(*field).map_or(true, Value::is_null))
        .collect();

    if !missing.is_empty() {
        return Err(AnalysisError::Schema(format!(
            "Analysis response is missing required fields: {}",
            missing.join(", ")
        )));
    }

    serde_json::from_value(value).map_err(|e| {
        AnalysisError::Schema(format!("Analysis response has an invalid structure: {}", e))
    })
}

/// Where the analyzed text came from, for the response metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextSource {
    Literal,
    Upload { file_name: String, file_size: u64 },
}

/// Attach response-time metadata to a parsed analysis.
pub fn compose_result(
    analysis: Analysis,
    text_length: usize,
    has_query: bool,
    source: TextSource,
) -> AnalysisResult {
    let (file_name, file_size) = match source {
        TextSource::Literal => (None, None),
        TextSource::Upload {
            file_name,
            file_size,
        } => (Some(file_name), Some(file_size)),
    };

    AnalysisResult {
        analysis,
        metadata: AnalysisMetadata {
            timestamp: Utc::now(),
            text_length,
            file_name,
            file_size,
            has_query: Some(has_query),
        },
    }
}
