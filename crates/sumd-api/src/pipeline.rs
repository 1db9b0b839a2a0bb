//! # Release Verification Pipeline
//!
//! Turns a [`VerificationClaim`] into a [`VerificationResult`]:
//!
//! ```text
//! validate claim
//!   → fetch + authenticate remote record      (no file I/O before this)
//!   → select checksum entry for the release
//!   → digest local artifact
//!   → compare
//!   → mint download token (match only)
//! ```
//!
//! A digest mismatch is an ordinary result (`verified: false`), not an
//! error, and never mints a token.

use serde::{Deserialize, Serialize};
use sumd_core::{digest_file, DigestError, ReleaseDescriptor, ReleaseDigest, ValidationError};
use url::Url;

use crate::error::AppError;
use crate::state::AppState;

/// Message reported when the local digest differs from the reference.
pub const INTEGRITY_FAILURE: &str = "integrity check failed";

/// Inbound verification request.
///
/// Missing fields deserialize as empty so that they are reported by name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerificationClaim {
    /// Remote record identifier.
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub product: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub file: String,
}

impl VerificationClaim {
    /// Check required fields and build the release descriptor.
    pub fn validate(&self) -> Result<ReleaseDescriptor, ValidationError> {
        if self.token.trim().is_empty() {
            return Err(ValidationError::EmptyField("token"));
        }
        ReleaseDescriptor::new(&*self.product, &*self.version, &*self.file)
    }
}

/// Outcome of a verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationResult {
    /// Digest of the local artifact.
    pub releasechecksum: String,
    /// Reference digest published in the authenticated record.
    pub distributionchecksum: String,
    pub verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VerificationResult {
    fn verified(local: &ReleaseDigest, reference: &ReleaseDigest, download: Url) -> Self {
        Self {
            releasechecksum: local.to_hex(),
            distributionchecksum: reference.to_hex(),
            verified: true,
            download: Some(download.into()),
            error: None,
        }
    }

    fn mismatch(local: &ReleaseDigest, reference: &ReleaseDigest) -> Self {
        Self {
            releasechecksum: local.to_hex(),
            distributionchecksum: reference.to_hex(),
            verified: false,
            download: None,
            error: Some(INTEGRITY_FAILURE.to_string()),
        }
    }
}

/// Run the full verification for `claim`.
pub async fn verify(state: &AppState, claim: &VerificationClaim) -> Result<VerificationResult, AppError> {
    let release = claim.validate()?;

    let record = state
        .verifier
        .fetch_authenticated_record(&claim.token)
        .await?;

    let entry = record
        .checksum_for(&release)
        .ok_or_else(|| AppError::NotFound(format!("no checksum published for {release}")))?;
    let reference = ReleaseDigest::parse(&entry.checksum).map_err(|e| {
        AppError::Internal(format!(
            "record {} carries a malformed checksum for {release}: {e}",
            record.token
        ))
    })?;

    let path = release.resolve(&state.config.release_root);
    let local = digest_file(&path).await.map_err(|e| match e {
        DigestError::ArtifactNotFound { .. } => {
            AppError::ArtifactNotFound(format!("release file not found: {release}"))
        }
        other => AppError::Internal(other.to_string()),
    })?;

    if local != reference {
        tracing::warn!(
            release = %release,
            expected = %reference,
            actual = %local,
            "release digest mismatch"
        );
        return Ok(VerificationResult::mismatch(&local, &reference));
    }

    let key = state.tokens.mint(release.clone(), state.config.token_ttl)?;
    let download = download_url(&state.config.base_url, &key, release.file())?;
    tracing::info!(release = %release, "release verified; download issued");
    Ok(VerificationResult::verified(&local, &reference, download))
}

/// `{base}/download/{key}/{file}`, each segment percent-encoded.
pub fn download_url(base: &Url, key: &str, file: &str) -> Result<Url, AppError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| AppError::Internal(format!("base URL {base} cannot carry a path")))?
        .pop_if_empty()
        .extend(["download", key, file]);
    Ok(url)
}
