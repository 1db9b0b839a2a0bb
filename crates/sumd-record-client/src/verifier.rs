//! Identity verifier: fetches records from the store and authenticates them.
//!
//! ## Trust Checks
//!
//! For every record fetch, in this order:
//!
//! 1. The reply's `signature` must verify over the JCS-canonical bytes of
//!    `record` under the store's key.
//! 2. The reply's `response` must be the store's signature over the
//!    challenge this call sent.
//! 3. The record's `token` must be the one requested.
//!
//! Nothing in the record is read before all three pass.

use std::sync::Arc;

use sumd_core::CanonicalBytes;
use sumd_crypto::{
    verify, ChallengeExchange, Ed25519PublicKey, Ed25519Signature, FullIdentity,
};

use crate::config::RecordStoreConfig;
use crate::error::RecordStoreError;
use crate::types::{
    IdentityReply, IdentityRequest, RemoteRecord, VettedRecordReply, VettedRecordRequest,
};

const IDENTITY_PATH: &str = "/v1/identity";
const VETTED_RECORD_PATH: &str = "/v1/record/vetted";

/// Authenticating client for the record store.
///
/// Immutable after construction; clone or wrap in `Arc` to share.
#[derive(Debug, Clone)]
pub struct IdentityVerifier {
    http: reqwest::Client,
    config: RecordStoreConfig,
    identity: Arc<FullIdentity>,
    authority: Ed25519PublicKey,
}

impl IdentityVerifier {
    /// Build a verifier, resolving the store's key.
    ///
    /// A pinned key in `config` is used as-is. Otherwise the key is fetched
    /// once through the identity handshake.
    pub async fn connect(
        config: RecordStoreConfig,
        identity: Arc<FullIdentity>,
    ) -> Result<Self, RecordStoreError> {
        let http = build_http(&config)?;
        let authority = match config.pinned_key {
            Some(key) => {
                tracing::info!(authority = %key, "using pinned record store key");
                key
            }
            None => {
                let key = fetch_remote_identity(&http, &config, &identity).await?;
                tracing::warn!(
                    authority = %key,
                    endpoint = %config.endpoint,
                    "trusting record store key on first use; pin it to skip this handshake"
                );
                key
            }
        };
        Ok(Self {
            http,
            config,
            identity,
            authority,
        })
    }

    /// Build a verifier with a known store key. No network traffic.
    pub fn with_authority(
        config: RecordStoreConfig,
        identity: Arc<FullIdentity>,
        authority: Ed25519PublicKey,
    ) -> Result<Self, RecordStoreError> {
        Ok(Self {
            http: build_http(&config)?,
            config,
            identity,
            authority,
        })
    }

    /// The store key replies are checked against.
    pub fn authority(&self) -> &Ed25519PublicKey {
        &self.authority
    }

    /// This service's public key, as presented to the store.
    pub fn public_key(&self) -> Ed25519PublicKey {
        self.identity.public_key()
    }

    /// Fetch the record stored under `record_token` and authenticate it.
    ///
    /// Calls `POST {endpoint}/v1/record/vetted`.
    pub async fn fetch_authenticated_record(
        &self,
        record_token: &str,
    ) -> Result<RemoteRecord, RecordStoreError> {
        let endpoint = "POST /v1/record/vetted";
        let url = self.config.url_for(VETTED_RECORD_PATH);

        let exchange = ChallengeExchange::new(&self.identity.public_key())?;
        let req = VettedRecordRequest {
            challenge: exchange.challenge().to_hex(),
            token: record_token.to_string(),
            publickey: self.identity.public_key(),
            signature: self.identity.sign(exchange.challenge()),
        };

        tracing::debug!(record_token, "requesting vetted record");
        let resp = self
            .http
            .post(&url)
            .json(&req)
            .send()
            .await
            .map_err(|e| RecordStoreError::Http {
                endpoint,
                source: e,
            })?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(RecordStoreError::RecordNotFound {
                token: record_token.to_string(),
            });
        }

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(RecordStoreError::ApiError {
                endpoint,
                status,
                body,
            });
        }

        let reply: VettedRecordReply =
            resp.json().await.map_err(|e| RecordStoreError::MalformedReply {
                endpoint,
                reason: e.to_string(),
            })?;

        self.check_record_signature(&reply)?;
        exchange
            .verify_response(&reply.response, &self.authority)
            .map_err(|e| RecordStoreError::ChallengeMismatch(e.to_string()))?;

        let record: RemoteRecord =
            serde_json::from_value(reply.record).map_err(|e| RecordStoreError::MalformedReply {
                endpoint,
                reason: e.to_string(),
            })?;

        if record.token != record_token {
            return Err(RecordStoreError::RecordMismatch {
                requested: record_token.to_string(),
                received: record.token,
            });
        }

        tracing::debug!(
            record_token,
            streams = record.metadata.len(),
            "record authenticated"
        );
        Ok(record)
    }

    fn check_record_signature(&self, reply: &VettedRecordReply) -> Result<(), RecordStoreError> {
        let canonical = CanonicalBytes::new(&reply.record)
            .map_err(|e| RecordStoreError::SignatureInvalid(e.to_string()))?;
        let signature = Ed25519Signature::from_hex(&reply.signature)
            .map_err(|e| RecordStoreError::SignatureInvalid(e.to_string()))?;
        verify(&canonical, &signature, &self.authority)
            .map_err(|e| RecordStoreError::SignatureInvalid(e.to_string()))
    }
}

/// Ask the store for its public key and check it can sign our challenge.
///
/// Calls `POST {endpoint}/v1/identity`.
async fn fetch_remote_identity(
    http: &reqwest::Client,
    config: &RecordStoreConfig,
    identity: &FullIdentity,
) -> Result<Ed25519PublicKey, RecordStoreError> {
    let endpoint = "POST /v1/identity";
    let url = config.url_for(IDENTITY_PATH);

    let exchange = ChallengeExchange::new(&identity.public_key())?;
    let req = IdentityRequest {
        challenge: exchange.challenge().to_hex(),
    };

    let resp = http
        .post(&url)
        .json(&req)
        .send()
        .await
        .map_err(|e| RecordStoreError::Http {
            endpoint,
            source: e,
        })?;

    if !resp.status().is_success() {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        return Err(RecordStoreError::ApiError {
            endpoint,
            status,
            body,
        });
    }

    let reply: IdentityReply = resp.json().await.map_err(|e| RecordStoreError::MalformedReply {
        endpoint,
        reason: e.to_string(),
    })?;

    let key = Ed25519PublicKey::from_hex(&reply.publickey).map_err(|e| {
        RecordStoreError::MalformedReply {
            endpoint,
            reason: format!("publickey: {e}"),
        }
    })?;

    exchange
        .verify_response(&reply.response, &key)
        .map_err(|e| RecordStoreError::ChallengeMismatch(e.to_string()))?;

    Ok(key)
}

fn build_http(config: &RecordStoreConfig) -> Result<reqwest::Client, RecordStoreError> {
    reqwest::Client::builder()
        .timeout(config.timeout)
        .user_agent(concat!("sumd/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(RecordStoreError::ClientInit)
}
