//! # Ed25519 Signing and Verification
//!
//! Key and signature newtypes used by the record-store handshake.
//!
//! ## Security Invariant
//!
//! - Only [`SignedMessage`] types can be signed or verified. The trait is
//!   sealed and implemented for [`CanonicalBytes`] (signed records) and
//!   [`Challenge`](crate::Challenge) (challenge responses), so a signature
//!   over one kind of message can never be checked as the other by
//!   accident of a shared byte slice API.
//! - Private keys are never serialized or logged. `Ed25519KeyPair` does not
//!   implement `Serialize`; its `Debug` output is redacted.
//! - Verification uses `verify_strict`, rejecting small-order keys and
//!   non-canonical signature encodings.
//!
//! ## Serde
//!
//! Public keys and signatures serialize as lowercase hex strings.

use ed25519_dalek::Signer;
use rand_core::OsRng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sumd_core::CanonicalBytes;
use zeroize::Zeroizing;

use crate::error::CryptoError;

pub(crate) mod sealed {
    pub trait Sealed {}
}

/// A message type that may be signed and verified.
pub trait SignedMessage: sealed::Sealed {
    /// The exact bytes covered by the signature.
    fn message_bytes(&self) -> &[u8];
}

impl sealed::Sealed for CanonicalBytes {}

impl SignedMessage for CanonicalBytes {
    fn message_bytes(&self) -> &[u8] {
        self.as_bytes()
    }
}

/// An Ed25519 public key (32 bytes).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ed25519PublicKey([u8; 32]);

/// An Ed25519 signature (64 bytes).
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Ed25519Signature([u8; 64]);

/// An Ed25519 key pair. The secret half is zeroized on drop.
pub struct Ed25519KeyPair {
    signing_key: ed25519_dalek::SigningKey,
}

// ---------------------------------------------------------------------------
// Ed25519PublicKey
// ---------------------------------------------------------------------------

impl Ed25519PublicKey {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse a public key from 64 hex characters.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let s = s.trim();
        if s.len() != 64 {
            return Err(CryptoError::InvalidPublicKey(format!(
                "public key hex must be 64 chars, got {}",
                s.len()
            )));
        }
        let mut arr = [0u8; 32];
        hex::decode_to_slice(s, &mut arr)
            .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))?;
        Ok(Self(arr))
    }

    fn to_verifying_key(&self) -> Result<ed25519_dalek::VerifyingKey, CryptoError> {
        ed25519_dalek::VerifyingKey::from_bytes(&self.0)
            .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))
    }
}

impl Serialize for Ed25519PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Ed25519PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519PublicKey({}...)", hex::encode(&self.0[..4]))
    }
}

impl std::fmt::Display for Ed25519PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// ---------------------------------------------------------------------------
// Ed25519Signature
// ---------------------------------------------------------------------------

impl Ed25519Signature {
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse a signature from 128 hex characters.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let s = s.trim();
        if s.len() != 128 {
            return Err(CryptoError::InvalidSignature(format!(
                "signature hex must be 128 chars, got {}",
                s.len()
            )));
        }
        let mut arr = [0u8; 64];
        hex::decode_to_slice(s, &mut arr)
            .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;
        Ok(Self(arr))
    }
}

impl Serialize for Ed25519Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Ed25519Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for Ed25519Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519Signature({}...)", hex::encode(&self.0[..4]))
    }
}

impl std::fmt::Display for Ed25519Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// ---------------------------------------------------------------------------
// Ed25519KeyPair
// ---------------------------------------------------------------------------

impl Ed25519KeyPair {
    /// Generate a new key pair from the OS random source.
    pub fn generate() -> Self {
        Self {
            signing_key: ed25519_dalek::SigningKey::generate(&mut OsRng),
        }
    }

    /// Rebuild a key pair from its 32-byte secret seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: ed25519_dalek::SigningKey::from_bytes(seed),
        }
    }

    /// Rebuild a key pair from a hex-encoded 32-byte secret seed.
    pub fn from_secret_hex(s: &str) -> Result<Self, CryptoError> {
        let s = s.trim();
        if s.len() != 64 {
            return Err(CryptoError::InvalidSecretKey(format!(
                "secret key hex must be 64 chars, got {}",
                s.len()
            )));
        }
        let mut seed = Zeroizing::new([0u8; 32]);
        hex::decode_to_slice(s, &mut seed[..])
            .map_err(|e| CryptoError::InvalidSecretKey(e.to_string()))?;
        Ok(Self::from_seed(&seed))
    }

    /// Hex-encoded secret seed, for writing identity files only.
    pub fn secret_hex(&self) -> Zeroizing<String> {
        let seed = Zeroizing::new(self.signing_key.to_bytes());
        Zeroizing::new(hex::encode(&seed[..]))
    }

    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    pub fn sign(&self, message: &impl SignedMessage) -> Ed25519Signature {
        Ed25519Signature(self.signing_key.sign(message.message_bytes()).to_bytes())
    }
}

impl std::fmt::Debug for Ed25519KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519KeyPair(<private>)")
    }
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// Verify `signature` over `message` under `public_key`.
pub fn verify(
    message: &impl SignedMessage,
    signature: &Ed25519Signature,
    public_key: &Ed25519PublicKey,
) -> Result<(), CryptoError> {
    let vk = public_key.to_verifying_key()?;
    let sig = ed25519_dalek::Signature::from_bytes(&signature.0);
    vk.verify_strict(message.message_bytes(), &sig)
        .map_err(|e| CryptoError::VerificationFailed(e.to_string()))
}
