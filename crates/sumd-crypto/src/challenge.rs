//! # Challenge Exchanges
//!
//! Every call to the remote record store carries a fresh challenge that the
//! authority must sign and echo back. A correct echo proves the reply was
//! produced for *this* request, so a captured reply cannot be replayed.
//!
//! A challenge is `SHA-256(domain || requester public key || nonce)` where
//! the nonce is 32 bytes from the OS random source. Binding the requester's
//! key means a response collected for one client is useless to another.
//!
//! [`ChallengeExchange::verify_response`] consumes the exchange, so the
//! same challenge cannot be checked twice.

use rand_core::{OsRng, RngCore};
use sha2::{Digest, Sha256};

use crate::ed25519::{sealed, verify, Ed25519PublicKey, Ed25519Signature, SignedMessage};
use crate::error::CryptoError;

const CHALLENGE_DOMAIN: &[u8] = b"sumd/challenge/v1";

/// Random bytes mixed into every challenge.
pub const NONCE_LEN: usize = 32;

/// A 32-byte challenge value, hex-encoded on the wire.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Challenge([u8; 32]);

impl Challenge {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse a challenge from 64 hex characters.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let mut arr = [0u8; 32];
        hex::decode_to_slice(s.trim(), &mut arr)
            .map_err(|e| CryptoError::ChallengeMismatch(format!("malformed challenge: {e}")))?;
        Ok(Self(arr))
    }

    /// Derive a challenge bound to `requester` from a fresh nonce.
    fn derive(requester: &Ed25519PublicKey, nonce: &[u8; NONCE_LEN]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(CHALLENGE_DOMAIN);
        hasher.update(requester.as_bytes());
        hasher.update(nonce);
        Self(hasher.finalize().into())
    }
}

impl sealed::Sealed for Challenge {}

impl SignedMessage for Challenge {
    fn message_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for Challenge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Challenge({})", self.to_hex())
    }
}

/// One challenge/response round with the remote authority.
///
/// Lives for exactly one remote call and is consumed by
/// [`verify_response`](Self::verify_response).
#[derive(Debug)]
pub struct ChallengeExchange {
    challenge: Challenge,
}

impl ChallengeExchange {
    /// Start a new exchange for `requester`.
    ///
    /// Fails with [`CryptoError::RandomSource`] if the OS random source
    /// cannot supply a nonce.
    pub fn new(requester: &Ed25519PublicKey) -> Result<Self, CryptoError> {
        let mut nonce = [0u8; NONCE_LEN];
        OsRng
            .try_fill_bytes(&mut nonce)
            .map_err(|e| CryptoError::RandomSource(e.to_string()))?;
        Ok(Self {
            challenge: Challenge::derive(requester, &nonce),
        })
    }

    /// The challenge to send.
    pub fn challenge(&self) -> &Challenge {
        &self.challenge
    }

    /// Check that `response_hex` is `authority`'s signature over the
    /// challenge this exchange issued.
    pub fn verify_response(
        self,
        response_hex: &str,
        authority: &Ed25519PublicKey,
    ) -> Result<(), CryptoError> {
        let sig = Ed25519Signature::from_hex(response_hex)
            .map_err(|e| CryptoError::ChallengeMismatch(e.to_string()))?;
        verify(&self.challenge, &sig, authority)
            .map_err(|e| CryptoError::ChallengeMismatch(e.to_string()))
    }
}
