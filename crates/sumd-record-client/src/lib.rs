//! # sumd-record-client — Remote Record Store Client
//!
//! Typed client for the trust-anchored record store that publishes release
//! checksums. This crate implements only the client half of the store's
//! authentication handshake; the store itself is an external service.
//!
//! ## Protocol
//!
//! | Method | Path | Purpose |
//! |--------|------|---------|
//! | POST | `/v1/identity` | Fetch the store's public key (startup, when not pinned) |
//! | POST | `/v1/record/vetted` | Fetch a signed record by token |
//!
//! Every request carries a fresh challenge. A reply is trusted only when
//! (1) its record signature verifies under the store's key and (2) its
//! `response` is the store's signature over that challenge. See
//! [`IdentityVerifier`].
//!
//! ## Failure Semantics
//!
//! All calls are bounded by the configured timeout and are never retried
//! here; [`RecordStoreError::is_transient`] tells callers which failures are
//! safe to retry, and [`RecordStoreError::authentication_failure`] names the
//! check an untrusted reply failed.

pub mod config;
pub mod error;
pub mod types;
pub mod verifier;

pub use config::RecordStoreConfig;
pub use error::RecordStoreError;
pub use types::{MetadataStream, RemoteRecord};
pub use verifier::IdentityVerifier;
