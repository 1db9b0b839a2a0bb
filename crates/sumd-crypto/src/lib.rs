//! # sumd-crypto — Identity & Signatures
//!
//! The cryptographic building blocks behind the record-store handshake:
//!
//! - **Ed25519** keys and signatures ([`Ed25519KeyPair`],
//!   [`Ed25519PublicKey`], [`Ed25519Signature`]).
//! - **Identity files** ([`FullIdentity`]) holding the service's own key
//!   pair, loaded once at startup.
//! - **Challenge exchanges** ([`ChallengeExchange`]) — fresh, single-use
//!   nonces the remote authority must sign to prove a reply is live.
//!
//! ## Crate Policy
//!
//! - Depends only on `sumd-core` internally.
//! - Only [`SignedMessage`] types can be signed or verified: canonical JSON
//!   and challenges. Raw byte slices are not accepted.
//! - No mocking of cryptographic operations in tests.

pub mod challenge;
pub mod ed25519;
pub mod error;
pub mod identity;

pub use challenge::{Challenge, ChallengeExchange};
pub use ed25519::{verify, Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature, SignedMessage};
pub use error::CryptoError;
pub use identity::FullIdentity;
