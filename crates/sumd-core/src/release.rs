//! # Release Descriptors
//!
//! A release artifact is addressed by its product, version and file name,
//! and lives on disk at `root/product/version/file`.
//!
//! ## Security Invariant
//!
//! Every component of a [`ReleaseDescriptor`] is a single normal path
//! segment. Separators, `.`/`..` and control characters are rejected at
//! construction, so [`ReleaseDescriptor::resolve`] can only ever produce a
//! path strictly beneath the release root.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Identifies one release artifact. Immutable once constructed.
///
/// Serializes as `{"product", "version", "file"}`. There is no
/// `Deserialize` impl: the only way in is [`ReleaseDescriptor::new`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ReleaseDescriptor {
    product: String,
    version: String,
    file: String,
}

impl ReleaseDescriptor {
    /// Build a descriptor, validating each component as a path segment.
    pub fn new(
        product: impl Into<String>,
        version: impl Into<String>,
        file: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let product = product.into();
        let version = version.into();
        let file = file.into();
        validate_segment("product", &product)?;
        validate_segment("version", &version)?;
        validate_segment("file", &file)?;
        Ok(Self {
            product,
            version,
            file,
        })
    }

    pub fn product(&self) -> &str {
        &self.product
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    /// Resolve the on-disk location of this artifact beneath `root`.
    pub fn resolve(&self, root: &Path) -> PathBuf {
        root.join(&self.product).join(&self.version).join(&self.file)
    }
}

impl std::fmt::Display for ReleaseDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.product, self.version, self.file)
    }
}

fn validate_segment(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    let bad = value == "."
        || value == ".."
        || value
            .chars()
            .any(|c| c == '/' || c == '\\' || c.is_control());
    if bad {
        return Err(ValidationError::InvalidSegment {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Reference checksum published for a release inside a remote record's
/// metadata stream.
///
/// Wire form: `{"checksum": "<hex>", "product", "version", "file"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecksumMetadata {
    /// Hex-encoded SHA-256 of the release artifact.
    pub checksum: String,
    pub product: String,
    pub version: String,
    pub file: String,
}

impl ChecksumMetadata {
    /// Whether this entry describes the given release.
    pub fn describes(&self, release: &ReleaseDescriptor) -> bool {
        self.product == release.product
            && self.version == release.version
            && self.file == release.file
    }
}
