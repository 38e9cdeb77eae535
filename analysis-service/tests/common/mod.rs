#![allow(dead_code)]

use analysis_service::config::{
    AnalysisConfig, ExtractionConfig, LimitsConfig, ProviderConfig, ProviderKind, UploadConfig,
};
use analysis_service::services::providers::mock::MockTextProvider;
use analysis_service::startup::Application;
use secrecy::Secret;
use service_core::config::Config as CoreConfig;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

pub const RENEWAL_CLAUSE: &str =
    "This agreement renews automatically unless cancelled 90 days in advance.";

/// Oracle reply for [`RENEWAL_CLAUSE`]: one high risk factor, wrapped in a fence.
pub const RENEWAL_REPLY: &str = r#"```json
{
  "simplified": "The contract renews by itself unless you cancel at least 90 days before it ends.",
  "riskAssessment": {
    "overallRisk": "high",
    "riskFactors": [
      {
        "clause": "Automatic renewal",
        "risk": "high",
        "explanation": "Missing the 90-day window commits you to another term.",
        "impact": "Another full term of payments"
      }
    ]
  },
  "keyTerms": [],
  "actionItems": [],
  "warnings": []
}
```"#;

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub provider: Arc<MockTextProvider>,
    pub upload_dir: TempDir,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(MockTextProvider::new(), LimitsConfig::default()).await
    }

    pub async fn spawn_with_reply(reply: &str) -> Self {
        Self::spawn_with(MockTextProvider::with_response(reply), LimitsConfig::default()).await
    }

    pub async fn spawn_with(provider: MockTextProvider, limits: LimitsConfig) -> Self {
        let upload_dir = tempfile::tempdir().expect("Failed to create upload dir");

        let config = test_config(upload_dir.path(), limits);

        let provider = Arc::new(provider);
        let app = Application::build_with_provider(config, provider.clone())
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to be ready by polling the health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            provider,
            upload_dir,
            client,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn post_analyze(&self, body: serde_json::Value) -> reqwest::Response {
        self.client
            .post(self.url("/analyze"))
            .json(&body)
            .send()
            .await
            .expect("Failed to send request")
    }

    pub async fn post_upload(&self, form: reqwest::multipart::Form) -> reqwest::Response {
        self.client
            .post(self.url("/upload"))
            .multipart(form)
            .send()
            .await
            .expect("Failed to send request")
    }

    /// Number of files left in the upload directory.
    pub fn leftover_uploads(&self) -> usize {
        std::fs::read_dir(self.upload_dir.path())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

/// Configuration for a test instance: random port, mock provider, uploads in `upload_dir`.
pub fn test_config(upload_dir: &Path, limits: LimitsConfig) -> AnalysisConfig {
    AnalysisConfig {
        common: CoreConfig {
            port: 0, // Random port
            log_level: "info".to_string(),
            environment: "test".to_string(),
        },
        provider: ProviderConfig {
            kind: ProviderKind::Mock,
            api_key: Secret::new(String::new()),
            model: "gemini-2.0-flash".to_string(),
            api_base: "http://localhost".to_string(),
            timeout_secs: 5,
        },
        limits,
        uploads: UploadConfig {
            temp_dir: upload_dir.to_path_buf(),
        },
        extraction: ExtractionConfig {
            pdftotext_bin: "pdftotext".to_string(),
            timeout_secs: 5,
        },
        allowed_origins: vec!["*".to_string()],
        otlp_endpoint: None,
    }
}

/// A multipart form carrying `content` as the `document` part.
pub fn document_form(file_name: &str, mime: &str, content: Vec<u8>) -> reqwest::multipart::Form {
    let part = reqwest::multipart::Part::bytes(content)
        .file_name(file_name.to_string())
        .mime_str(mime)
        .expect("Invalid mime type");
    reqwest::multipart::Form::new().part("document", part)
}
