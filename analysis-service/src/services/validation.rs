//! Input validation for both request paths.

use crate::config::LimitsConfig;
use crate::dtos::AnalyzeRequest;
use crate::error::AnalysisError;
use validator::{Validate, ValidationErrors};

/// Media types accepted on the upload path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Pdf,
    PlainText,
}

impl MediaType {
    pub fn as_mime(&self) -> &'static str {
        match self {
            MediaType::Pdf => "application/pdf",
            MediaType::PlainText => "text/plain",
        }
    }

    /// Parse a declared `Content-Type`, ignoring parameters such as `charset`.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            "application/pdf" => Some(MediaType::Pdf),
            "text/plain" => Some(MediaType::PlainText),
            _ => None,
        }
    }
}

/// Check a literal-text request: not blank and within the character limit.
pub fn validate_text_request(
    request: &AnalyzeRequest,
    limits: &LimitsConfig,
) -> Result<(), AnalysisError> {
    request
        .validate()
        .map_err(|e| AnalysisError::Validation(first_message(&e)))?;

    if request.text.trim().is_empty() {
        return Err(AnalysisError::Validation("Text is required".to_string()));
    }

    let length = request.text.chars().count();
    if length > limits.max_text_chars {
        return Err(AnalysisError::Validation(format!(
            "Text exceeds maximum length of {} characters (got {})",
            limits.max_text_chars, length
        )));
    }

    Ok(())
}

/// Check the declared type of an uploaded part.
pub fn validate_media_type(content_type: Option<&str>) -> Result<MediaType, AnalysisError> {
    content_type
        .and_then(MediaType::from_content_type)
        .ok_or_else(|| {
            AnalysisError::Validation(format!(
                "Invalid file type{}. Only PDF and text files are allowed",
                content_type
                    .map(|ct| format!(" '{}'", ct))
                    .unwrap_or_default()
            ))
        })
}

/// Check an upload's size against the configured limit.
pub fn validate_upload_size(size: usize, limits: &LimitsConfig) -> Result<(), AnalysisError> {
    if size > limits.max_upload_bytes {
        return Err(AnalysisError::Validation(format!(
            "File too large (max {} bytes)",
            limits.max_upload_bytes
        )));
    }
    Ok(())
}

/// Blank queries are treated as absent.
pub fn normalize_query(query: Option<String>) -> Option<String> {
    query
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
}

fn first_message(errors: &ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| errors.to_string())
}
