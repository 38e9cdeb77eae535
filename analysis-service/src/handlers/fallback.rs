use crate::error::AnalysisError;
use axum::{
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};

/// Path prefixes whose unknown routes answer with a JSON error body.
const API_PREFIXES: [&str; 3] = ["/api", "/analyze", "/upload"];

pub async fn not_found(uri: Uri) -> Response {
    let path = uri.path();

    if API_PREFIXES.iter().any(|prefix| path.starts_with(prefix)) {
        AnalysisError::NotFound(format!("Route {} not found", path)).into_response()
    } else {
        (StatusCode::NOT_FOUND, "Not Found").into_response()
    }
}
