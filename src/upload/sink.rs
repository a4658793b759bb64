//! External upload sink.
//!
//! The upload control hands every accepted file to an [`UploadSink`] and never
//! looks at the result. The outcome is logged and dropped. Nothing in the UI
//! depends on whether the remote endpoint accepted the file.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use thiserror::Error;
use url::Url;

use super::file::CandidateFile;

/// Path of the PDF endpoint on the sink host.
pub const UPLOAD_PATH: &str = "upload/pdf";

/// What the sink reported back. Only ever logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkOutcome {
    /// The request completed with this HTTP status.
    Delivered { status: u16 },
    /// No request was made.
    Skipped,
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("upload request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid sink url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Opaque `submitFile(file) -> outcome` collaborator.
#[async_trait]
pub trait UploadSink: Send + Sync + fmt::Debug {
    async fn submit_file(&self, file: CandidateFile) -> Result<SinkOutcome, SinkError>;
}

/// Posts files as `multipart/form-data` to `{base}/upload/pdf`.
#[derive(Debug, Clone)]
pub struct HttpUploadSink {
    client: reqwest::Client,
    endpoint: Url,
    field_name: String,
}

impl HttpUploadSink {
    pub fn new(
        base_url: &str,
        field_name: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, SinkError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: upload_endpoint(base_url)?,
            field_name: field_name.into(),
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl UploadSink for HttpUploadSink {
    async fn submit_file(&self, file: CandidateFile) -> Result<SinkOutcome, SinkError> {
        let (descriptor, bytes) = file.into_parts();
        let length = bytes.len() as u64;

        let mut part = Part::stream_with_length(reqwest::Body::from(bytes), length)
            .file_name(descriptor.name().to_string());
        if !descriptor.mime_type().is_empty() {
            part = part.mime_str(descriptor.mime_type())?;
        }
        let form = Form::new().part(self.field_name.clone(), part);

        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await?;

        Ok(SinkOutcome::Delivered {
            status: response.status().as_u16(),
        })
    }
}

/// Sink used when uploads are switched off in configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledSink;

#[async_trait]
impl UploadSink for DisabledSink {
    async fn submit_file(&self, _file: CandidateFile) -> Result<SinkOutcome, SinkError> {
        Ok(SinkOutcome::Skipped)
    }
}

/// Submit `file` without waiting for it. The outcome is logged and discarded.
pub fn fire_and_forget(sink: &Arc<dyn UploadSink>, file: CandidateFile) {
    let sink = Arc::clone(sink);
    let name = file.descriptor().name().to_string();
    tokio::spawn(async move {
        match sink.submit_file(file).await {
            Ok(outcome) => {
                tracing::debug!(name: "upload.sink.outcome", file = %name, outcome = ?outcome, "Upload sink responded");
            }
            Err(e) => {
                tracing::debug!(name: "upload.sink.outcome", file = %name, error = %e, "Upload sink failed");
            }
        }
    });
}

fn upload_endpoint(base_url: &str) -> Result<Url, url::ParseError> {
    let mut base = Url::parse(base_url)?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(UPLOAD_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_endpoint() {
        assert_eq!(
            upload_endpoint("http://localhost:8000").unwrap().as_str(),
            "http://localhost:8000/upload/pdf"
        );
        assert_eq!(
            upload_endpoint("https://sink.example/api").unwrap().as_str(),
            "https://sink.example/api/upload/pdf"
        );
        assert_eq!(
            upload_endpoint("https://sink.example/api/").unwrap().as_str(),
            "https://sink.example/api/upload/pdf"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(HttpUploadSink::new("not a url", "pdf", Duration::from_secs(1)).is_err());
    }
}
