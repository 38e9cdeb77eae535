//! The analysis pipeline: text in, validated [`AnalysisResult`] out.

use crate::config::LimitsConfig;
use crate::dtos::AnalyzeRequest;
use crate::error::AnalysisError;
use crate::models::{Analysis, AnalysisResult};
use crate::services::extractor::TextExtractor;
use crate::services::parser::{compose_result, parse_analysis, TextSource};
use crate::services::prompt::build_prompt;
use crate::services::providers::{GenerationParams, TextProvider};
use crate::services::uploads::TempUpload;
use crate::services::validation::{normalize_query, validate_text_request};
use std::sync::Arc;

#[derive(Clone)]
pub struct Analyzer {
    provider: Arc<dyn TextProvider>,
    extractor: Arc<TextExtractor>,
    limits: LimitsConfig,
}

impl Analyzer {
    pub fn new(
        provider: Arc<dyn TextProvider>,
        extractor: TextExtractor,
        limits: LimitsConfig,
    ) -> Self {
        Self {
            provider,
            extractor: Arc::new(extractor),
            limits,
        }
    }

    pub fn provider(&self) -> &Arc<dyn TextProvider> {
        &self.provider
    }

    pub fn limits(&self) -> &LimitsConfig {
        &self.limits
    }

    /// Analyze literal text supplied by the caller.
    pub async fn analyze_text(
        &self,
        request: AnalyzeRequest,
    ) -> Result<AnalysisResult, AnalysisError> {
        validate_text_request(&request, &self.limits)?;

        let query = normalize_query(request.query);
        let text_length = request.text.chars().count();
        let analysis = self.run(&request.text, query.as_deref()).await?;

        Ok(compose_result(
            analysis,
            text_length,
            query.is_some(),
            TextSource::Literal,
        ))
    }

    /// Analyze an uploaded document. The temporary file is removed before
    /// this returns, whatever the outcome.
    pub async fn analyze_upload(
        &self,
        mut upload: TempUpload,
        query: Option<String>,
    ) -> Result<AnalysisResult, AnalysisError> {
        let outcome = self.run_upload(&mut upload, normalize_query(query)).await;
        upload.close();
        outcome
    }

    async fn run_upload(
        &self,
        upload: &mut TempUpload,
        query: Option<String>,
    ) -> Result<AnalysisResult, AnalysisError> {
        upload.finish().await?;

        tracing::info!(
            file_name = %upload.file_name(),
            file_size = upload.size(),
            media_type = upload.media_type().as_mime(),
            "Analyzing uploaded document"
        );

        let extracted = self
            .extractor
            .extract(upload.path(), upload.media_type())
            .await?;
        let text_length = extracted.char_len();
        let analysis = self.run(&extracted.text, query.as_deref()).await?;

        Ok(compose_result(
            analysis,
            text_length,
            query.is_some(),
            TextSource::Upload {
                file_name: upload.file_name().to_string(),
                file_size: upload.size(),
            },
        ))
    }

    async fn run(&self, text: &str, query: Option<&str>) -> Result<Analysis, AnalysisError> {
        let prompt = build_prompt(text, query);

        let response = self
            .provider
            .generate(&prompt, &GenerationParams::analysis())
            .await?;

        tracing::info!(
            provider = self.provider.name(),
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            "Analysis generated"
        );

        parse_analysis(&response.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractionConfig;
    use crate::models::RiskLevel;
    use crate::services::providers::mock::MockTextProvider;
    use crate::services::validation::MediaType;

    const RENEWAL: &str = "This agreement renews automatically unless cancelled 90 days in advance.";

    const REPLY: &str = r#"```json
{"simplified": "It renews unless you cancel early.",
 "riskAssessment": {"overallRisk": "high", "riskFactors": [
   {"clause": "Automatic renewal", "risk": "high", "explanation": "Easy to miss", "impact": "Another term"}]}}
```"#;

    fn analyzer(provider: Arc<MockTextProvider>) -> Analyzer {
        let limits = LimitsConfig::default();
        let extraction = ExtractionConfig {
            pdftotext_bin: "pdftotext".to_string(),
            timeout_secs: 5,
        };
        Analyzer::new(provider, TextExtractor::new(&extraction, &limits), limits)
    }

    fn request(text: &str, query: Option<&str>) -> AnalyzeRequest {
        AnalyzeRequest {
            text: text.to_string(),
            query: query.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn literal_text_reaches_the_prompt() {
        let provider = Arc::new(MockTextProvider::with_response(REPLY));
        let result = analyzer(provider.clone())
            .analyze_text(request(RENEWAL, None))
            .await
            .unwrap();

        assert!(provider.last_prompt().unwrap().contains(RENEWAL));
        assert_eq!(result.metadata.text_length, RENEWAL.chars().count());
        assert_eq!(result.metadata.has_query, Some(false));
        assert_eq!(result.metadata.file_name, None);
        assert_eq!(
            result.analysis.risk_assessment.overall_risk,
            RiskLevel::High
        );
        assert_eq!(result.analysis.risk_counts().as_array(), [1, 0, 0]);
    }

    #[tokio::test]
    async fn query_is_forwarded_and_flagged() {
        let provider = Arc::new(MockTextProvider::with_response(REPLY));
        let result = analyzer(provider.clone())
            .analyze_text(request(RENEWAL, Some("Can I cancel early?")))
            .await
            .unwrap();

        assert!(provider.last_prompt().unwrap().contains("Can I cancel early?"));
        assert_eq!(result.metadata.has_query, Some(true));
    }

    #[tokio::test]
    async fn invalid_text_never_reaches_the_provider() {
        let provider = Arc::new(MockTextProvider::new());
        let err = analyzer(provider.clone())
            .analyze_text(request("", None))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "ValidationError");
        assert!(provider.last_prompt().is_none());
    }

    #[tokio::test]
    async fn provider_failures_are_oracle_errors() {
        let provider = Arc::new(MockTextProvider::failing("quota exceeded"));
        let err = analyzer(provider)
            .analyze_text(request(RENEWAL, None))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "OracleError");
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[tokio::test]
    async fn malformed_replies_surface_parser_errors() {
        let provider = Arc::new(MockTextProvider::with_response("not json at all"));
        let err = analyzer(provider)
            .analyze_text(request(RENEWAL, None))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "ParseError");

        let provider = Arc::new(MockTextProvider::with_response(r#"{"simplified": "x"}"#));
        let err = analyzer(provider)
            .analyze_text(request(RENEWAL, None))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "SchemaError");
    }

    #[tokio::test]
    async fn uploads_are_analyzed_and_removed() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(MockTextProvider::with_response(REPLY));
        let analyzer = analyzer(provider.clone());

        let mut upload = TempUpload::create(
            dir.path(),
            "lease.txt",
            MediaType::PlainText,
            analyzer.limits(),
        )
        .await
        .unwrap();
        upload.write_chunk(RENEWAL.as_bytes()).await.unwrap();

        let result = analyzer
            .analyze_upload(upload, Some("  ".to_string()))
            .await
            .unwrap();

        assert_eq!(result.metadata.file_name.as_deref(), Some("lease.txt"));
        assert_eq!(result.metadata.file_size, Some(RENEWAL.len() as u64));
        assert_eq!(result.metadata.has_query, Some(false));
        assert!(provider.last_prompt().unwrap().contains(RENEWAL));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn failed_uploads_are_removed_too() {
        let dir = tempfile::tempdir().unwrap();
        let analyzer = analyzer(Arc::new(MockTextProvider::new()));

        let mut upload = TempUpload::create(
            dir.path(),
            "blank.txt",
            MediaType::PlainText,
            analyzer.limits(),
        )
        .await
        .unwrap();
        upload.write_chunk(b"   \n\t ").await.unwrap();

        let err = analyzer.analyze_upload(upload, None).await.unwrap_err();

        assert_eq!(err.kind(), "ExtractionError");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
