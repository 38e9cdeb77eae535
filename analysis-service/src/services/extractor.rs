//! Turns an uploaded file into analyzable text.
//!
//! Plain text is decoded as UTF-8; PDFs are handed to `pdftotext` (poppler).
//! Either way the result must contain something other than whitespace and is
//! capped at the configured character limit.

use crate::config::{ExtractionConfig, LimitsConfig};
use crate::error::AnalysisError;
use crate::services::executor::CommandExecutor;
use crate::services::validation::MediaType;
use std::path::Path;

/// Appended to extracted text that was cut at the character limit.
pub const TRUNCATION_MARKER: &str = "\n\n[Document truncated due to length]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    pub text: String,
    pub truncated: bool,
}

impl ExtractedText {
    /// Characters that will be sent for analysis, marker included.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

#[derive(Debug, Clone)]
pub struct TextExtractor {
    executor: CommandExecutor,
    pdftotext_bin: String,
    max_chars: usize,
}

impl TextExtractor {
    pub fn new(config: &ExtractionConfig, limits: &LimitsConfig) -> Self {
        Self {
            executor: CommandExecutor::new(config.timeout()),
            pdftotext_bin: config.pdftotext_bin.clone(),
            max_chars: limits.max_text_chars,
        }
    }

    pub async fn extract(
        &self,
        path: &Path,
        media_type: MediaType,
    ) -> Result<ExtractedText, AnalysisError> {
        let raw = match media_type {
            MediaType::PlainText => read_plain_text(path).await?,
            MediaType::Pdf => self.extract_pdf(path).await?,
        };

        let extracted = finalize(raw, self.max_chars)?;

        tracing::info!(
            media_type = media_type.as_mime(),
            text_length = extracted.char_len(),
            truncated = extracted.truncated,
            "Text extracted from upload"
        );

        Ok(extracted)
    }

    async fn extract_pdf(&self, path: &Path) -> Result<String, AnalysisError> {
        let path_str = path.to_str().ok_or_else(|| {
            AnalysisError::Internal(format!("Upload path is not valid UTF-8: {}", path.display()))
        })?;

        let output = self
            .executor
            .execute(&self.pdftotext_bin, &["-enc", "UTF-8", path_str, "-"])
            .await
            .map_err(|e| {
                AnalysisError::Extraction(format!("Failed to read PDF document: {}", e))
            })?;

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

async fn read_plain_text(path: &Path) -> Result<String, AnalysisError> {
    let bytes = tokio::fs::read(path).await?;
    String::from_utf8(bytes).map_err(|_| {
        AnalysisError::Extraction("Text file is not valid UTF-8".to_string())
    })
}

/// Reject blank output and cap the text at `max_chars` characters.
pub fn finalize(raw: String, max_chars: usize) -> Result<ExtractedText, AnalysisError> {
    if raw.trim().is_empty() {
        return Err(AnalysisError::Extraction(
            "Could not extract text from the uploaded file".to_string(),
        ));
    }

    match raw.char_indices().nth(max_chars) {
        Some((cut, _)) => {
            let mut text = String::with_capacity(cut + TRUNCATION_MARKER.len());
            text.push_str(&raw[..cut]);
            text.push_str(TRUNCATION_MARKER);
            Ok(ExtractedText {
                text,
                truncated: true,
            })
        }
        None => Ok(ExtractedText {
            text: raw,
            truncated: false,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn extractor() -> TextExtractor {
        TextExtractor::new(
            &ExtractionConfig {
                pdftotext_bin: "definitely-not-pdftotext-9c1e".to_string(),
                timeout_secs: 5,
            },
            &LimitsConfig::default(),
        )
    }

    fn temp_file(content: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file
    }

    #[test]
    fn short_text_is_kept_verbatim() {
        let extracted = finalize("  Clause 1.\n".to_string(), 10_000).unwrap();
        assert_eq!(extracted.text, "  Clause 1.\n");
        assert!(!extracted.truncated);
    }

    #[test]
    fn whitespace_only_text_is_an_extraction_error() {
        let err = finalize(" \n\t ".to_string(), 10_000).unwrap_err();
        assert_eq!(err.kind(), "ExtractionError");
        assert!(finalize(String::new(), 10_000).is_err());
    }

    #[test]
    fn long_text_is_cut_at_the_limit_and_marked() {
        let extracted = finalize("x".repeat(12_345), 10_000).unwrap();
        assert!(extracted.truncated);
        assert!(extracted.text.ends_with(TRUNCATION_MARKER));
        assert_eq!(
            extracted.text.strip_suffix(TRUNCATION_MARKER).unwrap().chars().count(),
            10_000
        );
        assert_eq!(
            extracted.char_len(),
            10_000 + TRUNCATION_MARKER.chars().count()
        );
    }

    #[test]
    fn text_exactly_at_the_limit_is_not_truncated() {
        let extracted = finalize("y".repeat(10_000), 10_000).unwrap();
        assert!(!extracted.truncated);
        assert_eq!(extracted.char_len(), 10_000);
    }

    #[test]
    fn truncation_respects_multibyte_characters() {
        let extracted = finalize("ü".repeat(20), 5).unwrap();
        assert_eq!(extracted.text, format!("üüüüü{}", TRUNCATION_MARKER));
    }

    #[tokio::test]
    async fn plain_text_files_are_decoded() {
        let file = temp_file("Tenant pays rent monthly.".as_bytes());
        let extracted = extractor()
            .extract(file.path(), MediaType::PlainText)
            .await
            .unwrap();
        assert_eq!(extracted.text, "Tenant pays rent monthly.");
    }

    #[tokio::test]
    async fn invalid_utf8_is_an_extraction_error() {
        let file = temp_file(&[0xff, 0xfe, 0x00, 0x41]);
        let err = extractor()
            .extract(file.path(), MediaType::PlainText)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "ExtractionError");
    }

    #[tokio::test]
    async fn pdf_tool_failure_is_an_extraction_error() {
        let file = temp_file(b"%PDF-1.4 not really");
        let err = extractor().extract(file.path(), MediaType::Pdf).await.unwrap_err();
        assert_eq!(err.kind(), "ExtractionError");
    }

    /// Writes an executable stand-in for pdftotext that runs `body`.
    #[cfg(unix)]
    fn fake_pdftotext(dir: &tempfile::TempDir, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.path().join("pdftotext");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_str().unwrap().to_string()
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn pdf_text_comes_from_the_tool_output() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = TextExtractor::new(
            &ExtractionConfig {
                pdftotext_bin: fake_pdftotext(&dir, "printf 'Lease term is 12 months.'"),
                timeout_secs: 5,
            },
            &LimitsConfig::default(),
        );
        let file = temp_file(b"%PDF-1.4");

        let extracted = extractor.extract(file.path(), MediaType::Pdf).await.unwrap();

        assert_eq!(extracted.text, "Lease term is 12 months.");
        assert!(!extracted.truncated);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn long_pdf_output_is_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = TextExtractor::new(
            &ExtractionConfig {
                pdftotext_bin: fake_pdftotext(&dir, "printf 'abcdefghijklmnopqrstuvwxyz'"),
                timeout_secs: 5,
            },
            &LimitsConfig {
                max_text_chars: 10,
                ..LimitsConfig::default()
            },
        );
        let file = temp_file(b"%PDF-1.4");

        let extracted = extractor.extract(file.path(), MediaType::Pdf).await.unwrap();

        assert!(extracted.truncated);
        assert_eq!(extracted.text, format!("abcdefghij{}", TRUNCATION_MARKER));
    }
}
