use secrecy::Secret;
use service_core::config::{self as core_config, get_env, get_env_parsed};
use service_core::error::AppError;
use std::path::PathBuf;
use std::time::Duration;

/// Maximum characters of analyzable text (literal input or extracted).
pub const DEFAULT_MAX_TEXT_CHARS: usize = 10_000;

/// Maximum upload size: 10 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub common: core_config::Config,
    pub provider: ProviderConfig,
    pub limits: LimitsConfig,
    pub uploads: UploadConfig,
    pub extraction: ExtractionConfig,
    /// CORS origins for the JSON API; `*` allows any origin.
    pub allowed_origins: Vec<String>,
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Gemini,
    Mock,
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" => Ok(ProviderKind::Gemini),
            "mock" => Ok(ProviderKind::Mock),
            _ => Err(format!("Invalid GenAI provider: {}", s)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub api_key: Secret<String>,
    /// Model used for analysis (e.g., gemini-2.0-flash)
    pub model: String,
    pub api_base: String,
    pub timeout_secs: u64,
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone)]
pub struct LimitsConfig {
    pub max_text_chars: usize,
    pub max_upload_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_text_chars: DEFAULT_MAX_TEXT_CHARS,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Directory holding temporary upload files while a request runs.
    pub temp_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    pub pdftotext_bin: String,
    pub timeout_secs: u64,
}

impl ExtractionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl AnalysisConfig {
    pub fn load() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;
        let is_prod = common.is_production();

        let kind: ProviderKind = get_env("GENAI_PROVIDER", Some("gemini"), is_prod)?
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;

        // The mock provider never talks to Google, so it needs no key.
        let api_key = match kind {
            ProviderKind::Gemini => get_env("GOOGLE_API_KEY", None, is_prod)?,
            ProviderKind::Mock => std::env::var("GOOGLE_API_KEY").unwrap_or_default(),
        };

        let default_temp_dir = std::env::temp_dir().join("analysis-uploads");

        Ok(AnalysisConfig {
            provider: ProviderConfig {
                kind,
                api_key: Secret::new(api_key),
                model: get_env("GENAI_TEXT_MODEL", Some("gemini-2.0-flash"), is_prod)?,
                api_base: get_env(
                    "GENAI_API_BASE",
                    Some("https://generativelanguage.googleapis.com/v1beta"),
                    is_prod,
                )?,
                timeout_secs: get_env_parsed("GENAI_TIMEOUT_SECS", 60, is_prod)?,
            },
            limits: LimitsConfig {
                max_text_chars: get_env_parsed(
                    "ANALYSIS_MAX_TEXT_CHARS",
                    DEFAULT_MAX_TEXT_CHARS,
                    is_prod,
                )?,
                max_upload_bytes: get_env_parsed(
                    "ANALYSIS_MAX_UPLOAD_BYTES",
                    DEFAULT_MAX_UPLOAD_BYTES,
                    is_prod,
                )?,
            },
            uploads: UploadConfig {
                temp_dir: PathBuf::from(get_env(
                    "UPLOAD_TEMP_DIR",
                    Some(&default_temp_dir.to_string_lossy()),
                    is_prod,
                )?),
            },
            extraction: ExtractionConfig {
                pdftotext_bin: get_env("PDFTOTEXT_BIN", Some("pdftotext"), is_prod)?,
                timeout_secs: get_env_parsed("EXTRACTION_TIMEOUT_SECS", 30, is_prod)?,
            },
            allowed_origins: parse_origins(&get_env("ALLOWED_ORIGINS", Some("*"), is_prod)?),
            otlp_endpoint: std::env::var("OTLP_ENDPOINT")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            common,
        })
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|o| o.trim().to_string())
        .filter(|o| !o.is_empty())
        .collect()
}
