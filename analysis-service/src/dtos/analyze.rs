use crate::render::Theme;
use serde::Deserialize;
use validator::Validate;

/// JSON body of `POST /analyze`.
///
/// A missing `text` deserializes as empty so it is reported through the same
/// validation path as an empty string.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AnalyzeRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Text is required"))]
    pub text: String,
    #[serde(default)]
    pub query: Option<String>,
}

/// Form body of `POST /app/analyze`.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeForm {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub theme: Option<Theme>,
}

impl From<AnalyzeForm> for AnalyzeRequest {
    fn from(form: AnalyzeForm) -> Self {
        Self {
            text: form.text,
            query: form.query,
        }
    }
}

/// Query string of the HTML pages.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    #[serde(default)]
    pub theme: Option<Theme>,
}
