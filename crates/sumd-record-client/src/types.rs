//! Wire types for the record store protocol.
//!
//! Hex-encoded keys, challenges and signatures are carried as plain strings
//! on the reply side so that a malformed value surfaces as an authentication
//! failure rather than as a decoding error.

use serde::{Deserialize, Serialize};
use sumd_core::{ChecksumMetadata, ReleaseDescriptor};
use sumd_crypto::{Ed25519PublicKey, Ed25519Signature};

/// Body of `POST /v1/record/vetted`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VettedRecordRequest {
    /// Hex challenge the store must sign.
    pub challenge: String,
    /// Record identifier to look up.
    pub token: String,
    /// Requesting service's public key.
    pub publickey: Ed25519PublicKey,
    /// Requesting service's signature over the challenge bytes.
    pub signature: Ed25519Signature,
}

/// Reply to `POST /v1/record/vetted`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VettedRecordReply {
    /// Store's signature over the challenge, hex.
    pub response: String,
    /// The record, kept as raw JSON until its signature has been checked.
    pub record: serde_json::Value,
    /// Store's signature over the canonical bytes of `record`, hex.
    pub signature: String,
}

/// Body of `POST /v1/identity`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityRequest {
    pub challenge: String,
}

/// Reply to `POST /v1/identity`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityReply {
    pub publickey: String,
    pub response: String,
}

/// One entry of a record's metadata stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataStream {
    pub id: u64,
    /// JSON text; checksum entries decode as [`ChecksumMetadata`].
    pub payload: String,
}

/// An authenticated record from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRecord {
    pub token: String,
    /// Publication status code assigned by the store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u32>,
    #[serde(default)]
    pub metadata: Vec<MetadataStream>,
}

impl RemoteRecord {
    /// Checksum entries carried by this record, in stream order. Payloads
    /// that are not checksum metadata are skipped.
    pub fn checksum_entries(&self) -> impl Iterator<Item = ChecksumMetadata> + '_ {
        self.metadata.iter().filter_map(|stream| {
            match serde_json::from_str::<ChecksumMetadata>(&stream.payload) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::debug!(stream_id = stream.id, error = %e, "skipping non-checksum metadata");
                    None
                }
            }
        })
    }

    /// The first checksum entry describing `release`, if any.
    pub fn checksum_for(&self, release: &ReleaseDescriptor) -> Option<ChecksumMetadata> {
        self.checksum_entries().find(|entry| entry.describes(release))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(product: &str, version: &str, file: &str, checksum: &str) -> String {
        json!({"checksum": checksum, "product": product, "version": version, "file": file})
            .to_string()
    }

    fn record() -> RemoteRecord {
        RemoteRecord {
            token: "rec-1".into(),
            status: None,
            metadata: vec![
                MetadataStream { id: 1, payload: "not json".into() },
                MetadataStream { id: 2, payload: json!({"note": "changelog"}).to_string() },
                MetadataStream { id: 3, payload: payload("foo", "1.0", "foo.tgz", "aa") },
                MetadataStream { id: 4, payload: payload("foo", "1.1", "foo.tgz", "bb") },
            ],
        }
    }

    #[test]
    fn checksum_entries_skip_foreign_payloads() {
        let entries: Vec<_> = record().checksum_entries().collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].checksum, "aa");
    }

    #[test]
    fn checksum_for_selects_matching_release() {
        let rec = record();
        let wanted = ReleaseDescriptor::new("foo", "1.1", "foo.tgz").unwrap();
        assert_eq!(rec.checksum_for(&wanted).unwrap().checksum, "bb");

        let absent = ReleaseDescriptor::new("foo", "2.0", "foo.tgz").unwrap();
        assert!(rec.checksum_for(&absent).is_none());
    }

    #[test]
    fn record_tolerates_missing_optional_fields() {
        let rec: RemoteRecord = serde_json::from_value(json!({"token": "t"})).unwrap();
        assert!(rec.metadata.is_empty());
        assert!(rec.status.is_none());

        let rec: RemoteRecord =
            serde_json::from_value(json!({"token": "t", "status": 4, "version": "2"})).unwrap();
        assert_eq!(rec.status, Some(4));
    }
}
