//! Record store client configuration.

use std::time::Duration;

use sumd_crypto::Ed25519PublicKey;
use url::Url;

/// Default bound on every call to the record store.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Where the record store lives and how long to wait for it.
#[derive(Debug, Clone)]
pub struct RecordStoreConfig {
    /// Base URL of the record store, e.g. `https://records.example:59374`.
    pub endpoint: Url,
    /// Store public key. When set, the startup identity handshake is skipped.
    pub pinned_key: Option<Ed25519PublicKey>,
    /// Request timeout, covering connect through reading the body.
    pub timeout: Duration,
}

impl RecordStoreConfig {
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            pinned_key: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_pinned_key(mut self, key: Ed25519PublicKey) -> Self {
        self.pinned_key = Some(key);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Absolute URL for `path` (which must start with `/`) under the endpoint.
    pub(crate) fn url_for(&self, path: &str) -> String {
        format!("{}{path}", self.endpoint.as_str().trim_end_matches('/'))
    }
}
