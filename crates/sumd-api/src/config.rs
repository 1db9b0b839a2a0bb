//! # Service Configuration
//!
//! Command-line flags for `sumd serve`, each with a `SUMD_*` environment
//! fallback, and their conversion into [`AppConfig`] and
//! [`RecordStoreConfig`].

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use chrono::TimeDelta;
use clap::{Args, ValueEnum};
use sumd_crypto::{CryptoError, Ed25519PublicKey};
use sumd_record_client::RecordStoreConfig;
use url::Url;

use crate::state::AppConfig;

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Configuration errors detected before the server starts.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("--token-ttl-secs must be a positive number of seconds, got {0}")]
    InvalidTokenTtl(i64),

    #[error("--sweep-interval-secs must be positive")]
    InvalidSweepInterval,

    #[error("--remote-timeout-secs must be positive")]
    InvalidRemoteTimeout,

    #[error("--baseurl {0} cannot carry a path")]
    OpaqueBaseUrl(Url),

    #[error("--record-store-key is not a valid public key: {0}")]
    PinnedKey(#[source] CryptoError),
}

/// Flags for `sumd serve`.
#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    /// Release root directory holding `product/version/file` artifacts.
    #[arg(long, env = "SUMD_RELDIR")]
    pub reldir: PathBuf,

    /// Public base URL download links are built under.
    #[arg(long, env = "SUMD_BASEURL")]
    pub baseurl: Url,

    /// Port to listen on.
    #[arg(long, env = "SUMD_PORT")]
    pub port: u16,

    /// Base URL of the remote record store.
    #[arg(long, env = "SUMD_RECORD_STORE")]
    pub record_store: Url,

    /// Path to this service's identity file (see `sumd keygen`).
    #[arg(long, env = "SUMD_IDENTITY", default_value = "identity.json")]
    pub identity: PathBuf,

    /// Hex public key of the record store. Skips the startup identity
    /// handshake when set.
    #[arg(long, env = "SUMD_RECORD_STORE_KEY")]
    pub record_store_key: Option<String>,

    /// Address to bind.
    #[arg(long, env = "SUMD_BIND", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub bind: IpAddr,

    /// Timeout for each record store call, in seconds.
    #[arg(long, env = "SUMD_REMOTE_TIMEOUT_SECS", default_value_t = 15)]
    pub remote_timeout_secs: u64,

    /// Lifetime of download tokens, in seconds.
    #[arg(long, env = "SUMD_TOKEN_TTL_SECS", default_value_t = 86_400, allow_negative_numbers = true)]
    pub token_ttl_secs: i64,

    /// Interval between expired-token sweeps, in seconds.
    #[arg(long, env = "SUMD_SWEEP_INTERVAL_SECS", default_value_t = 120)]
    pub sweep_interval_secs: u64,

    /// Log output format.
    #[arg(long, env = "SUMD_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl ServeArgs {
    /// Socket address to listen on.
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    /// Validated HTTP service configuration.
    pub fn app_config(&self) -> Result<AppConfig, ConfigError> {
        let token_ttl = TimeDelta::try_seconds(self.token_ttl_secs)
            .filter(|ttl| *ttl > TimeDelta::zero())
            .ok_or(ConfigError::InvalidTokenTtl(self.token_ttl_secs))?;
        if self.sweep_interval_secs == 0 {
            return Err(ConfigError::InvalidSweepInterval);
        }
        if self.baseurl.cannot_be_a_base() {
            return Err(ConfigError::OpaqueBaseUrl(self.baseurl.clone()));
        }
        Ok(AppConfig {
            release_root: self.reldir.clone(),
            base_url: self.baseurl.clone(),
            token_ttl,
            sweep_interval: Duration::from_secs(self.sweep_interval_secs),
        })
    }

    /// Validated record store client configuration.
    pub fn record_store_config(&self) -> Result<RecordStoreConfig, ConfigError> {
        if self.remote_timeout_secs == 0 {
            return Err(ConfigError::InvalidRemoteTimeout);
        }
        let mut config = RecordStoreConfig::new(self.record_store.clone())
            .with_timeout(Duration::from_secs(self.remote_timeout_secs));
        if let Some(hex) = &self.record_store_key {
            let key = Ed25519PublicKey::from_hex(hex.trim()).map_err(ConfigError::PinnedKey)?;
            config = config.with_pinned_key(key);
        }
        Ok(config)
    }
}
