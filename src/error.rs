use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use openssl::error::ErrorStack;
use serde::Serialize;

use crate::models::ErrorResponse;

/// Failures of the key pair provider and the four crypto operations.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("message too long: {len} bytes (max: {max} bytes)")]
    MessageTooLong { len: usize, max: usize },
    #[error("encryption failed: {0}")]
    EncryptionFailed(String),
    #[error("decryption failed: {0}")]
    DecryptionFailed(String),
    #[error("key pair generation failed: {0}")]
    KeyGeneration(ErrorStack),
    #[error("internal error: {0}")]
    Internal(String),
}

/// Stable discriminator reported next to the human-readable message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    MessageTooLong,
    EncryptionFailed,
    DecryptionFailed,
    FatalInitializationFailure,
    Internal,
}

impl CryptoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CryptoError::InvalidInput(_) => ErrorKind::InvalidInput,
            CryptoError::MessageTooLong { .. } => ErrorKind::MessageTooLong,
            CryptoError::EncryptionFailed(_) => ErrorKind::EncryptionFailed,
            CryptoError::DecryptionFailed(_) => ErrorKind::DecryptionFailed,
            CryptoError::KeyGeneration(_) => ErrorKind::FatalInitializationFailure,
            CryptoError::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::InvalidInput | ErrorKind::DecryptionFailed => StatusCode::BAD_REQUEST,
            ErrorKind::MessageTooLong => StatusCode::PAYLOAD_TOO_LARGE,
            ErrorKind::EncryptionFailed
            | ErrorKind::FatalInitializationFailure
            | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for CryptoError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "operation failed");
        } else {
            tracing::warn!(error = %self, "rejected request");
        }

        let body = ErrorResponse {
            error: self.to_string(),
            kind: self.kind(),
        };

        (status, Json(body)).into_response()
    }
}
