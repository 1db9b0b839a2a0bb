//! # Download Token Cache
//!
//! In-memory map from download token to the release it unlocks. Tokens are
//! minted only after a successful verification and are valid until their
//! expiry; they may be redeemed any number of times before then.
//!
//! ## Expiry
//!
//! An entry is expired once `now >= expiry`. [`TokenCache::redeem`] applies
//! that check itself, so an expired token never redeems even if the sweeper
//! has not run yet. [`TokenCache::sweep`] evicts with the same predicate.
//!
//! ## Locking
//!
//! One `parking_lot::RwLock` guards the map. Mint and sweep take the write
//! lock; redeem and `len` take the read lock. No lock is held across an
//! `.await`.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::RwLock;
use rand_core::{OsRng, RngCore};
use sumd_core::ReleaseDescriptor;
use tokio::task::JoinHandle;

/// Random bytes per token; rendered as twice as many hex characters.
pub const TOKEN_BYTES: usize = 16;

/// Errors from minting a download token.
#[derive(Debug, thiserror::Error)]
pub enum TokenCacheError {
    #[error("token TTL must be positive, got {0}s")]
    InvalidTtl(i64),

    #[error("random source failure: {0}")]
    RandomSource(String),

    #[error("generated token collides with a live token")]
    Collision,
}

/// A minted download token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedToken {
    pub token: String,
    pub release: ReleaseDescriptor,
    pub expiry: DateTime<Utc>,
}

/// Thread-safe, cloneable token cache. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct TokenCache {
    entries: Arc<RwLock<HashMap<String, CachedToken>>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a token for `release`, valid for `ttl` from now.
    pub fn mint(&self, release: ReleaseDescriptor, ttl: TimeDelta) -> Result<String, TokenCacheError> {
        self.mint_at(release, ttl, Utc::now())
    }

    /// [`mint`](Self::mint) against an explicit clock reading.
    pub fn mint_at(
        &self,
        release: ReleaseDescriptor,
        ttl: TimeDelta,
        now: DateTime<Utc>,
    ) -> Result<String, TokenCacheError> {
        if ttl <= TimeDelta::zero() {
            return Err(TokenCacheError::InvalidTtl(ttl.num_seconds()));
        }
        let expiry = now
            .checked_add_signed(ttl)
            .ok_or(TokenCacheError::InvalidTtl(ttl.num_seconds()))?;

        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| TokenCacheError::RandomSource(e.to_string()))?;
        let token = hex::encode(bytes);

        match self.entries.write().entry(token.clone()) {
            Entry::Occupied(_) => return Err(TokenCacheError::Collision),
            Entry::Vacant(slot) => {
                tracing::debug!(release = %release, %expiry, "minted download token");
                slot.insert(CachedToken {
                    token: token.clone(),
                    release,
                    expiry,
                });
            }
        }
        Ok(token)
    }

    /// The release behind `token`, if the token exists and has not expired.
    pub fn redeem(&self, token: &str) -> Option<ReleaseDescriptor> {
        self.redeem_at(token, Utc::now())
    }

    /// [`redeem`](Self::redeem) against an explicit clock reading.
    pub fn redeem_at(&self, token: &str, now: DateTime<Utc>) -> Option<ReleaseDescriptor> {
        self.entries
            .read()
            .get(token)
            .filter(|entry| now < entry.expiry)
            .map(|entry| entry.release.clone())
    }

    /// Evict every expired entry. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        self.sweep_at(Utc::now())
    }

    /// [`sweep`](Self::sweep) against an explicit clock reading.
    pub fn sweep_at(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| entry.expiry > now);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run [`sweep`](Self::sweep) every `interval` on a background task.
    ///
    /// The task runs until the returned handle is aborted.
    pub fn spawn_sweeper(&self, interval: Duration) -> JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let evicted = cache.sweep();
                if evicted > 0 {
                    tracing::debug!(evicted, remaining = cache.len(), "swept expired download tokens");
                }
            }
        })
    }
}
