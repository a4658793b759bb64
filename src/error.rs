//! HTTP-facing errors.
//!
//! Only infrastructure failures end up here. Blank submissions, non-PDF files
//! and sink failures are outcomes, never errors.

use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("page session not found: {0}")]
    SessionNotFound(String),

    #[error("failed to read multipart body: {0}")]
    Multipart(#[from] MultipartError),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("file {name} exceeds the {limit} byte limit")]
    FileTooLarge { name: String, limit: usize },

    #[error("request timed out")]
    Timeout,
}

/// JSON error body: `{ "error": ..., "code": ... }`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: &'static str,
}

impl AppError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::SessionNotFound(_) => StatusCode::NOT_FOUND,
            Self::Multipart(e) => e.status(),
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Timeout => StatusCode::REQUEST_TIMEOUT,
        }
    }

    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::SessionNotFound(_) => "SESSION_NOT_FOUND",
            Self::Multipart(_) => "MULTIPART_ERROR",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::FileTooLarge { .. } => "FILE_TOO_LARGE",
            Self::Timeout => "REQUEST_TIMEOUT",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, code = self.code(), "Request failed");
        } else {
            tracing::debug!(error = %self, code = self.code(), "Request rejected");
        }
        let body = ErrorBody {
            error: self.to_string(),
            code: self.code(),
        };
        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_and_code() {
        let err = AppError::SessionNotFound("abc".to_string());
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.code(), "SESSION_NOT_FOUND");
        assert_eq!(err.to_string(), "page session not found: abc");

        let err = AppError::BadRequest("missing file".to_string());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = AppError::FileTooLarge {
            name: "big.pdf".to_string(),
            limit: 4096,
        };
        assert_eq!(err.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(err.code(), "FILE_TOO_LARGE");
        assert_eq!(err.to_string(), "file big.pdf exceeds the 4096 byte limit");
    }

    #[tokio::test]
    async fn test_into_response_body() {
        let response = AppError::SessionNotFound("abc".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["code"], "SESSION_NOT_FOUND");
        assert_eq!(json["error"], "page session not found: abc");
    }
}
