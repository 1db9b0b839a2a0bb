//! Record store client error types.

use sumd_crypto::CryptoError;

/// Errors from record store calls.
#[derive(Debug, thiserror::Error)]
pub enum RecordStoreError {
    /// Transport failure, including timeouts.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: &'static str,
        source: reqwest::Error,
    },

    /// The store answered with a non-2xx status other than 404.
    #[error("record store {endpoint} returned {status}: {body}")]
    ApiError {
        endpoint: &'static str,
        status: u16,
        body: String,
    },

    /// The store has no record under the requested token.
    #[error("no record found for token {token}")]
    RecordNotFound { token: String },

    /// The reply could not be decoded into the expected shape.
    #[error("malformed reply from {endpoint}: {reason}")]
    MalformedReply {
        endpoint: &'static str,
        reason: String,
    },

    /// The record signature did not verify under the store's key.
    #[error("signature invalid: {0}")]
    SignatureInvalid(String),

    /// The signed challenge response did not match the challenge sent.
    #[error("challenge mismatch: {0}")]
    ChallengeMismatch(String),

    /// A validly signed record was returned for a different token.
    #[error("record mismatch: requested {requested}, received {received}")]
    RecordMismatch { requested: String, received: String },

    /// Local cryptographic failure (e.g. the random source for a challenge).
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    ClientInit(reqwest::Error),
}

impl RecordStoreError {
    /// Short reason when the reply was received but could not be trusted;
    /// `None` for every other failure.
    pub fn authentication_failure(&self) -> Option<&'static str> {
        match self {
            Self::SignatureInvalid(_) => Some("signature invalid"),
            Self::ChallengeMismatch(_) => Some("challenge mismatch"),
            Self::RecordMismatch { .. } => Some("record mismatch"),
            _ => None,
        }
    }

    /// The store could not be reached or answered unusably; retrying later
    /// may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Http { .. } | Self::ApiError { .. } | Self::MalformedReply { .. }
        )
    }
}
