use crate::startup::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use serde_json::json;

pub const SERVICE_NAME: &str = "analysis-service";

pub async fn root() -> impl IntoResponse {
    Json(json!({
        "message": "Document analysis service is running"
    }))
}

/// Liveness probe.
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now(),
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Readiness probe: the analysis provider must answer its health check.
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let provider = state.analyzer.provider();
    match provider.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ready",
                "provider": provider.name()
            })),
        ),
        Err(e) => {
            tracing::warn!(provider = provider.name(), error = %e, "Provider health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unavailable",
                    "provider": provider.name(),
                    "error": e.to_string()
                })),
            )
        }
    }
}
