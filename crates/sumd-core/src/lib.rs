//! # sumd-core — Foundational Types
//!
//! Leaf crate of the sumd workspace. Defines the vocabulary every other
//! crate speaks:
//!
//! - [`ReleaseDescriptor`] — the `(product, version, file)` triple naming a
//!   release artifact, with path-segment validation so a descriptor can
//!   never resolve outside the release root.
//! - [`ChecksumMetadata`] — the reference digest published for a release in
//!   an authenticated remote record.
//! - [`CanonicalBytes`] — RFC 8785 (JCS) canonical JSON, the only byte form
//!   that signatures over structured data are computed on.
//! - [`ReleaseDigest`] and the streaming digest engine
//!   ([`digest_reader`], [`digest_file`]).
//!
//! ## Crate Policy
//!
//! - No dependencies on other `sumd-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod release;

pub use canonical::CanonicalBytes;
pub use digest::{digest_file, digest_reader, ReleaseDigest};
pub use error::{CanonicalizationError, DigestError, ValidationError};
pub use release::{ChecksumMetadata, ReleaseDescriptor};
