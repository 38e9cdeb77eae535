//! Mock provider implementation for local runs and testing.

use super::{FinishReason, GenerationParams, ProviderError, ProviderResponse, TextProvider};
use async_trait::async_trait;
use std::sync::Mutex;

/// Canned analysis returned when no response is configured.
pub const DEFAULT_MOCK_ANALYSIS: &str = r#"{
  "simplified": "This is a mock analysis. Configure GENAI_PROVIDER=gemini for real results.",
  "riskAssessment": {
    "overallRisk": "low",
    "riskFactors": []
  },
  "keyTerms": [],
  "actionItems": [],
  "warnings": []
}"#;

enum MockBehavior {
    Respond(String),
    Fail(String),
}

/// Mock text provider for testing.
pub struct MockTextProvider {
    behavior: MockBehavior,
    last_prompt: Mutex<Option<String>>,
}

impl MockTextProvider {
    pub fn new() -> Self {
        Self::with_response(DEFAULT_MOCK_ANALYSIS)
    }

    /// Always answer with `text`.
    pub fn with_response(text: impl Into<String>) -> Self {
        Self {
            behavior: MockBehavior::Respond(text.into()),
            last_prompt: Mutex::new(None),
        }
    }

    /// Always fail as if the upstream API returned an error.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            behavior: MockBehavior::Fail(message.into()),
            last_prompt: Mutex::new(None),
        }
    }

    /// Prompt received by the most recent `generate` call.
    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().ok().and_then(|guard| guard.clone())
    }
}

impl Default for MockTextProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextProvider for MockTextProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn generate(
        &self,
        prompt: &str,
        _params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError> {
        if let Ok(mut guard) = self.last_prompt.lock() {
            *guard = Some(prompt.to_string());
        }

        match &self.behavior {
            MockBehavior::Respond(text) => Ok(ProviderResponse {
                text: text.clone(),
                input_tokens: prompt.len() as i32 / 4,
                output_tokens: text.len() as i32 / 4,
                finish_reason: FinishReason::Complete,
            }),
            MockBehavior::Fail(message) => Err(ProviderError::ApiError(message.clone())),
        }
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}
