//! # API Error Types
//!
//! [`AppError`] implements `axum::response::IntoResponse` and maps every
//! failure the service can produce to an HTTP status and the JSON envelope
//! `{"errors": {"msg": "<detail>"}}`. Internal details of 5xx failures are
//! logged, never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use sumd_core::ValidationError;
use sumd_record_client::RecordStoreError;
use thiserror::Error;

use crate::cache::TokenCacheError;

/// JSON error envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub errors: ErrorMsg,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorMsg {
    pub msg: String,
}

/// Application-level error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or malformed request input (400).
    #[error("{0}")]
    Validation(String),

    /// The claimed release has no local artifact (400).
    #[error("{0}")]
    ArtifactNotFound(String),

    /// Unknown record, metadata entry, token, or vanished file (404).
    #[error("{0}")]
    NotFound(String),

    /// The record store's reply could not be authenticated (502).
    #[error("remote record authentication failed: {0}")]
    Authentication(String),

    /// The record store could not be reached or answered unusably (503).
    #[error("record store unavailable: {0}")]
    RemoteUnavailable(String),

    /// Download token could not be generated (500).
    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    /// Any other server-side failure (500).
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::ArtifactNotFound(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Authentication(_) => StatusCode::BAD_GATEWAY,
            Self::RemoteUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::KeyGeneration(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message returned to the caller.
    fn public_message(&self) -> String {
        match self {
            Self::KeyGeneration(_) | Self::Internal(_) => "an internal error occurred".to_string(),
            Self::RemoteUnavailable(_) => "record store unavailable".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            Self::KeyGeneration(_) | Self::Internal(_) => {
                tracing::error!(error = %self, "internal server error")
            }
            Self::Authentication(_) => tracing::warn!(error = %self, "rejected record store reply"),
            Self::RemoteUnavailable(_) => tracing::warn!(error = %self, "record store unavailable"),
            _ => tracing::debug!(error = %self, "request failed"),
        }

        let body = ErrorBody {
            errors: ErrorMsg {
                msg: self.public_message(),
            },
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<RecordStoreError> for AppError {
    fn from(err: RecordStoreError) -> Self {
        if let Some(reason) = err.authentication_failure() {
            return Self::Authentication(reason.into());
        }
        if err.is_transient() {
            return Self::RemoteUnavailable(err.to_string());
        }
        match err {
            RecordStoreError::RecordNotFound { token } => {
                Self::NotFound(format!("no record found for token {token}"))
            }
            err @ RecordStoreError::Crypto(_) => Self::KeyGeneration(err.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<TokenCacheError> for AppError {
    fn from(err: TokenCacheError) -> Self {
        match err {
            TokenCacheError::InvalidTtl(_) => Self::Internal(err.to_string()),
            TokenCacheError::RandomSource(_) | TokenCacheError::Collision => {
                Self::KeyGeneration(err.to_string())
            }
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(err.to_string())
    }
}
