//! # Cryptographic Error Types

use std::path::PathBuf;

use thiserror::Error;

/// Errors from key handling, signing and verification.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// A signature did not verify under the expected key.
    #[error("Ed25519 verification failed: {0}")]
    VerificationFailed(String),

    /// A signed challenge response did not match the challenge sent.
    #[error("challenge mismatch: {0}")]
    ChallengeMismatch(String),

    /// Malformed public key.
    #[error("invalid Ed25519 public key: {0}")]
    InvalidPublicKey(String),

    /// Malformed signature encoding.
    #[error("invalid Ed25519 signature: {0}")]
    InvalidSignature(String),

    /// Malformed or inconsistent secret key material.
    #[error("invalid secret key: {0}")]
    InvalidSecretKey(String),

    /// The operating system random source failed.
    #[error("random source unavailable: {0}")]
    RandomSource(String),

    /// Identity file could not be read or written.
    #[error("identity file {}: {source}", path.display())]
    IdentityIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Identity file is not valid JSON of the expected shape.
    #[error("identity file {}: {source}", path.display())]
    IdentityFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_failed_display() {
        let err = CryptoError::VerificationFailed("bad sig".to_string());
        assert!(err.to_string().contains("bad sig"));
    }

    #[test]
    fn challenge_mismatch_display() {
        let err = CryptoError::ChallengeMismatch("wrong key".to_string());
        assert_eq!(err.to_string(), "challenge mismatch: wrong key");
    }

    #[test]
    fn identity_io_shows_path() {
        let err = CryptoError::IdentityIo {
            path: PathBuf::from("identity.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        let msg = err.to_string();
        assert!(msg.contains("identity.json"));
        assert!(msg.contains("gone"));
    }
}
