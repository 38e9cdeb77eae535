use crate::dtos::AnalyzeRequest;
use crate::error::AnalysisError;
use crate::models::AnalysisResult;
use crate::services::record_analysis;
use crate::startup::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

/// `POST /analyze`: analyze literal text.
pub async fn analyze_text(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalysisResult>, AnalysisError> {
    let outcome = match payload {
        Ok(Json(request)) => state.analyzer.analyze_text(request).await,
        Err(rejection) => Err(AnalysisError::Validation(format!(
            "Invalid request body: {}",
            rejection.body_text()
        ))),
    };

    record_outcome("text", &outcome);
    outcome.map(Json)
}

pub(crate) fn record_outcome(
    source: &'static str,
    outcome: &Result<AnalysisResult, AnalysisError>,
) {
    match outcome {
        Ok(_) => record_analysis(source, "success"),
        Err(e) => record_analysis(source, e.kind()),
    }
}
