//! Request-level error taxonomy.
//!
//! Every failure inside a handler ends up as one of these variants and is
//! rendered as `{ "error": kind, "message": text }` with a 4xx status for
//! caller-fixable input and 5xx for everything on the service side.

use crate::services::providers::ProviderError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use service_core::error::ErrorBody;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Missing or out-of-bounds input.
    #[error("{0}")]
    Validation(String),

    /// Upload could not be turned into usable text.
    #[error("{0}")]
    Extraction(String),

    /// Oracle output was not valid JSON.
    #[error("{0}")]
    Parse(String),

    /// Oracle output was JSON but not an analysis.
    #[error("{0}")]
    Schema(String),

    /// The generation oracle failed.
    #[error("{0}")]
    Oracle(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl AnalysisError {
    /// Machine-readable kind sent in the `error` field.
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::Validation(_) => "ValidationError",
            AnalysisError::Extraction(_) => "ExtractionError",
            AnalysisError::Parse(_) => "ParseError",
            AnalysisError::Schema(_) => "SchemaError",
            AnalysisError::Oracle(_) => "OracleError",
            AnalysisError::NotFound(_) => "Not Found",
            AnalysisError::Internal(_) => "InternalError",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AnalysisError::Validation(_) | AnalysisError::Extraction(_) => {
                StatusCode::BAD_REQUEST
            }
            AnalysisError::NotFound(_) => StatusCode::NOT_FOUND,
            AnalysisError::Parse(_)
            | AnalysisError::Schema(_)
            | AnalysisError::Oracle(_)
            | AnalysisError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Human-readable text safe to show to the caller.
    pub fn public_message(&self) -> String {
        match self {
            AnalysisError::Internal(_) => "An unexpected error occurred".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<ProviderError> for AnalysisError {
    fn from(err: ProviderError) -> Self {
        AnalysisError::Oracle(format!("Analysis provider failed: {}", err))
    }
}

impl From<std::io::Error> for AnalysisError {
    fn from(err: std::io::Error) -> Self {
        AnalysisError::Internal(err.to_string())
    }
}

impl IntoResponse for AnalysisError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(kind = self.kind(), error = %self, "Request failed");
        } else {
            tracing::warn!(kind = self.kind(), error = %self, "Request rejected");
        }

        ErrorBody::new(self.kind(), self.public_message()).into_response_with(status)
    }
}
