//! # Application State
//!
//! Shared state handed to every route handler through the `State`
//! extractor. Configuration and the identity verifier are read-only after
//! startup; the token cache is the only mutable shared state.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use sumd_record_client::IdentityVerifier;
use url::Url;

use crate::cache::TokenCache;

/// Default download token lifetime.
pub const DEFAULT_TOKEN_TTL: TimeDelta = TimeDelta::hours(24);

/// Default interval between sweeps of the token cache.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(120);

/// Runtime configuration of the HTTP service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Root directory holding `product/version/file` artifacts.
    pub release_root: PathBuf,
    /// Public base URL that download links are built under.
    pub base_url: Url,
    /// Lifetime of minted download tokens.
    pub token_ttl: TimeDelta,
    /// How often expired tokens are swept.
    pub sweep_interval: Duration,
}

impl AppConfig {
    pub fn new(release_root: impl Into<PathBuf>, base_url: Url) -> Self {
        Self {
            release_root: release_root.into(),
            base_url,
            token_ttl: DEFAULT_TOKEN_TTL,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tokens: TokenCache,
    pub verifier: Arc<IdentityVerifier>,
}

impl AppState {
    pub fn new(config: AppConfig, verifier: IdentityVerifier) -> Self {
        Self {
            config: Arc::new(config),
            tokens: TokenCache::new(),
            verifier: Arc::new(verifier),
        }
    }
}
