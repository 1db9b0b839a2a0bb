//! # Error Types
//!
//! Structured errors for the foundational layer. All errors use `thiserror`
//! for derive-based `Display` and `Error` implementations.

use std::path::PathBuf;

use thiserror::Error;

/// A caller-supplied value failed validation.
///
/// Always locally recoverable: the request carrying the value is rejected
/// and never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was empty.
    #[error("required '{0}' param not found")]
    EmptyField(&'static str),

    /// A field is not usable as a single path segment.
    #[error("'{field}' is not a valid path segment: {value:?}")]
    InvalidSegment {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: String,
    },

    /// A digest string is not 64 hexadecimal characters.
    #[error("invalid digest: {0}")]
    InvalidDigest(String),
}

/// Failure while digesting a release artifact.
#[derive(Error, Debug)]
pub enum DigestError {
    /// No file exists at the resolved artifact path.
    #[error("release file not found: {}", path.display())]
    ArtifactNotFound {
        /// The path that was probed.
        path: PathBuf,
    },

    /// The artifact exists but could not be read to the end.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// The path being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values have no single canonical rendering and are refused.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}
