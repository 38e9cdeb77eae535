//! Server-rendered pages under `/app`.
//!
//! These mirror the JSON routes but answer with HTML; failures are shown in
//! the result page's error panel with the matching status code.

use super::analyze::record_outcome;
use super::upload::read_upload_form;
use crate::dtos::{AnalyzeForm, AnalyzeRequest, PageParams};
use crate::error::AnalysisError;
use crate::models::AnalysisResult;
use crate::render::{render_index, render_outcome, RenderSettings, Theme};
use crate::startup::AppState;
use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::FormRejection,
        Multipart, Query, State,
    },
    http::StatusCode,
    response::Html,
    Form,
};

pub async fn index_page(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Html<String>, AnalysisError> {
    let limits = &state.config.limits;
    let html = render_index(
        &RenderSettings::new(params.theme),
        limits.max_text_chars,
        limits.max_upload_bytes,
    )?;
    Ok(Html(html))
}

pub async fn analyze_page(
    State(state): State<AppState>,
    form: Result<Form<AnalyzeForm>, FormRejection>,
) -> Result<(StatusCode, Html<String>), AnalysisError> {
    let (theme, outcome) = match form {
        Ok(Form(form)) => {
            let theme = form.theme;
            let request = AnalyzeRequest::from(form);
            (theme, state.analyzer.analyze_text(request).await)
        }
        Err(rejection) => (
            None,
            Err(AnalysisError::Validation(format!(
                "Invalid form submission: {}",
                rejection.body_text()
            ))),
        ),
    };

    record_outcome("text", &outcome);
    result_page(theme, outcome)
}

pub async fn upload_page(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Html<String>), AnalysisError> {
    let (theme, outcome) = match read_upload_form(&state, multipart).await {
        Ok(form) => (
            form.theme,
            state.analyzer.analyze_upload(form.upload, form.query).await,
        ),
        Err(e) => (None, Err(e)),
    };

    record_outcome("upload", &outcome);
    result_page(theme, outcome)
}

fn result_page(
    theme: Option<Theme>,
    outcome: Result<AnalysisResult, AnalysisError>,
) -> Result<(StatusCode, Html<String>), AnalysisError> {
    let status = match &outcome {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(kind = e.kind(), error = %e, "Analysis failed");
            e.status()
        }
    };

    let html = render_outcome(&outcome, &RenderSettings::new(theme))?;
    Ok((status, Html(html)))
}
