//! # Release Digests
//!
//! Streaming SHA-256 over release artifacts. Input is read in fixed-size
//! chunks and fed to the hasher incrementally, so memory use is independent
//! of artifact size.

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::{DigestError, ValidationError};

/// Read buffer size for streaming digests.
const CHUNK_SIZE: usize = 64 * 1024;

/// A 256-bit SHA-256 digest of a release artifact.
///
/// Renders and serializes as 64 lowercase hex characters.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReleaseDigest([u8; 32]);

impl ReleaseDigest {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse a hex digest. Surrounding whitespace is ignored and either
    /// case is accepted.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let s = s.trim();
        if s.len() != 64 {
            return Err(ValidationError::InvalidDigest(format!(
                "expected 64 hex chars, got {}",
                s.len()
            )));
        }
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes)
            .map_err(|e| ValidationError::InvalidDigest(e.to_string()))?;
        Ok(Self(bytes))
    }
}

impl std::fmt::Display for ReleaseDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::fmt::Debug for ReleaseDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReleaseDigest({})", self.to_hex())
    }
}

impl Serialize for ReleaseDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ReleaseDigest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Digest everything `reader` yields until EOF.
///
/// Consumes the reader; callers that need the bytes again must reopen or
/// rewind the source.
pub async fn digest_reader<R>(mut reader: R) -> std::io::Result<ReleaseDigest>
where
    R: AsyncRead + Unpin,
{
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];
    loop {
        let n = reader.read(&mut buffer).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }
    Ok(ReleaseDigest(hasher.finalize().into()))
}

/// Open and digest the file at `path`.
///
/// A missing file is reported as [`DigestError::ArtifactNotFound`]; every
/// other failure is [`DigestError::Io`].
pub async fn digest_file(path: &Path) -> Result<ReleaseDigest, DigestError> {
    let file = tokio::fs::File::open(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            DigestError::ArtifactNotFound {
                path: path.to_path_buf(),
            }
        } else {
            DigestError::Io {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;
    digest_reader(file).await.map_err(|e| DigestError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}
