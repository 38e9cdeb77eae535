//! Temporary on-disk storage for an upload while its request is in flight.
//!
//! The backing file is a [`NamedTempFile`], so it is removed when the
//! [`TempUpload`] is dropped: on early returns, on `?` propagation and while
//! unwinding. [`TempUpload::close`] is the explicit success-path variant that
//! reports a failed deletion instead of swallowing it.

use crate::config::LimitsConfig;
use crate::error::AnalysisError;
use crate::services::validation::{validate_upload_size, MediaType};
use std::path::Path;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;

pub struct TempUpload {
    file: NamedTempFile,
    writer: tokio::fs::File,
    file_name: String,
    media_type: MediaType,
    size: usize,
    limits: LimitsConfig,
}

impl TempUpload {
    pub async fn create(
        dir: &Path,
        file_name: impl Into<String>,
        media_type: MediaType,
        limits: &LimitsConfig,
    ) -> Result<Self, AnalysisError> {
        tokio::fs::create_dir_all(dir).await.map_err(|e| {
            AnalysisError::Internal(format!(
                "Failed to create upload directory {}: {}",
                dir.display(),
                e
            ))
        })?;

        let suffix = match media_type {
            MediaType::Pdf => ".pdf",
            MediaType::PlainText => ".txt",
        };

        let file = tempfile::Builder::new()
            .prefix("upload-")
            .suffix(suffix)
            .tempfile_in(dir)?;
        let writer = tokio::fs::File::from_std(file.as_file().try_clone()?);

        tracing::debug!(path = ?file.path(), "Created temporary upload file");

        Ok(Self {
            file,
            writer,
            file_name: file_name.into(),
            media_type,
            size: 0,
            limits: limits.clone(),
        })
    }

    /// Append a chunk, rejecting the upload as soon as it exceeds the limit.
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), AnalysisError> {
        let new_size = self.size + chunk.len();
        validate_upload_size(new_size, &self.limits)?;

        self.writer.write_all(chunk).await?;
        self.size = new_size;
        Ok(())
    }

    pub async fn finish(&mut self) -> Result<(), AnalysisError> {
        self.writer.flush().await?;
        self.writer.sync_all().await?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn media_type(&self) -> MediaType {
        self.media_type
    }

    pub fn size(&self) -> u64 {
        self.size as u64
    }

    /// Delete the backing file now, logging if the filesystem refuses.
    pub fn close(self) {
        let path = self.file.path().to_path_buf();
        drop(self.writer);
        if let Err(e) = self.file.close() {
            tracing::warn!(path = ?path, error = %e, "Failed to delete temporary upload file");
        }
    }
}
