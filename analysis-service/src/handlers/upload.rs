use super::analyze::record_outcome;
use crate::error::AnalysisError;
use crate::models::AnalysisResult;
use crate::render::Theme;
use crate::services::uploads::TempUpload;
use crate::services::validation::validate_media_type;
use crate::startup::AppState;
use axum::{
    extract::{
        multipart::{Field, MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    Json,
};

/// Parsed multipart body shared by the JSON and HTML upload routes.
pub struct UploadForm {
    pub upload: TempUpload,
    pub query: Option<String>,
    pub theme: Option<Theme>,
}

/// `POST /upload`: analyze an uploaded PDF or text file.
pub async fn upload_document(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalysisResult>, AnalysisError> {
    let outcome = match read_upload_form(&state, multipart).await {
        Ok(form) => state.analyzer.analyze_upload(form.upload, form.query).await,
        Err(e) => Err(e),
    };

    record_outcome("upload", &outcome);
    outcome.map(Json)
}

/// Stream the `document` part to a temporary file and collect the optional
/// `query` and `theme` parts.
///
/// Only the first `document` part is used. On error the partially written
/// file is dropped, which deletes it.
pub async fn read_upload_form(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<UploadForm, AnalysisError> {
    let mut multipart = multipart.map_err(|rejection| {
        AnalysisError::Validation(format!(
            "Expected a multipart/form-data body: {}",
            rejection.body_text()
        ))
    })?;

    let mut upload: Option<TempUpload> = None;
    let mut query = None;
    let mut theme = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(state, e))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("document") if upload.is_none() => {
                upload = Some(stream_document(state, field).await?);
            }
            Some("query") => {
                query = Some(field.text().await.map_err(|e| multipart_error(state, e))?);
            }
            Some("theme") => {
                let value = field.text().await.map_err(|e| multipart_error(state, e))?;
                theme = parse_theme(&value);
            }
            _ => {}
        }
    }

    let upload =
        upload.ok_or_else(|| AnalysisError::Validation("No file uploaded".to_string()))?;

    Ok(UploadForm {
        upload,
        query,
        theme,
    })
}

async fn stream_document(
    state: &AppState,
    mut field: Field<'_>,
) -> Result<TempUpload, AnalysisError> {
    let media_type = validate_media_type(field.content_type())?;
    let file_name = field
        .file_name()
        .map(base_name)
        .filter(|name| !name.is_empty())
        .unwrap_or("document")
        .to_string();

    let mut upload = TempUpload::create(
        &state.config.uploads.temp_dir,
        file_name,
        media_type,
        &state.config.limits,
    )
    .await?;

    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| multipart_error(state, e))?
    {
        upload.write_chunk(&chunk).await?;
    }

    Ok(upload)
}

/// Strip any client-side directory components from a file name.
fn base_name(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name).trim()
}

fn parse_theme(value: &str) -> Option<Theme> {
    match value.trim().to_lowercase().as_str() {
        "light" => Some(Theme::Light),
        "dark" => Some(Theme::Dark),
        _ => None,
    }
}

fn multipart_error(state: &AppState, err: MultipartError) -> AnalysisError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AnalysisError::Validation(format!(
            "File too large (max {} bytes)",
            state.config.limits.max_upload_bytes
        ))
    } else {
        AnalysisError::Validation(format!(
            "Failed to read multipart data: {}",
            err.body_text()
        ))
    }
}
