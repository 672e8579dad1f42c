//! HTTP boundary error type.
//!
//! Domain modules return typed errors ([`StoreError`], [`AskError`]); the
//! server converts them into [`AppError`], which renders as
//! `{"error": "<message>"}` with the matching status code. Internal
//! details are logged, never sent to the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::ask::AskError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or invalid client input.
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    /// Request body over `server.max_upload_bytes`.
    #[error("{0}")]
    PayloadTooLarge(String),

    /// The LLM provider failed.
    #[error("{0}")]
    Upstream(String),

    /// Disk or other server-side failure.
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Upstream(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

impl From<AskError> for AppError {
    fn from(err: AskError) -> Self {
        match err {
            AskError::EmptyQuestion | AskError::NoDocuments | AskError::NoneSelected => {
                AppError::BadRequest(err.to_string())
            }
            AskError::Upstream(e) => {
                tracing::error!(error = %format!("{:#}", e), "ask failed");
                AppError::Upstream("Failed to process question".to_string())
            }
        }
    }
}

impl AppError {
    /// Maps a store failure, using `context` as the client-facing message
    /// for IO errors (e.g. "Failed to delete document").
    pub fn from_store(err: StoreError, context: &str) -> Self {
        match err {
            StoreError::NotFound(_) => AppError::NotFound("Document not found".to_string()),
            StoreError::Io(e) => {
                tracing::error!(error = %e, "{}", context);
                AppError::Internal(context.to_string())
            }
            StoreError::Serialize(e) => {
                tracing::error!(error = %e, "{}", context);
                AppError::Internal(context.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ask_errors_map_to_statuses() {
        assert_eq!(
            AppError::from(AskError::EmptyQuestion).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(AskError::NoneSelected).status(),
            StatusCode::BAD_REQUEST
        );

        let upstream = AppError::from(AskError::Upstream(anyhow::anyhow!("boom: secret detail")));
        assert_eq!(upstream.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(upstream.to_string(), "Failed to process question");
    }

    #[test]
    fn test_store_errors_map_to_statuses() {
        let nf = AppError::from_store(StoreError::NotFound("x".into()), "Failed to delete document");
        assert_eq!(nf.status(), StatusCode::NOT_FOUND);
        assert_eq!(nf.to_string(), "Document not found");

        let io = AppError::from_store(
            StoreError::Io(std::io::Error::other("disk full")),
            "Failed to delete document",
        );
        assert_eq!(io.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(io.to_string(), "Failed to delete document");
    }

    #[test]
    fn test_payload_too_large_status() {
        let err = AppError::PayloadTooLarge("File too large".into());
        assert_eq!(err.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
