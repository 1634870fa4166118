// Copyright 2025 Palisade Contributors
// SPDX-License-Identifier: Apache-2.0

//! The session-cache contract and the backend factory.
//!
//! All operations are asynchronous: the Redis backend suspends on network
//! I/O, the local backend completes immediately. No operation retries; store
//! failures surface as [`palisade_core::Error::Store`] and retry policy (if
//! any) belongs to the backend client.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use palisade_core::settings::{CacheBackend, CacheSettings};
use palisade_core::{Principal, Result};

pub mod local;
pub mod redis;

pub use local::LocalSessionCache;
pub use redis::RedisSessionCache;

/// Storage abstraction holding tokens, token lists and principals with TTL.
///
/// Writes overwrite: a token key maps to at most one username at a time and
/// replacing never merges. `renew` composes a TTL read with a TTL write; it
/// is a single logical operation from the caller's point of view, and its
/// race-safety is whatever the chosen backend provides for that sequence.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait SessionCache: Send + Sync {
    /// Store `username` under a token key with expiry; overwrites.
    async fn put_token(&self, key: &str, username: &str, ttl: Duration) -> Result<bool>;

    /// Username for a token key; `None` when absent or expired.
    async fn get_token(&self, key: &str) -> Result<Option<String>>;

    /// The token list stored under a username key; empty when absent.
    async fn get_token_list(&self, key: &str) -> Result<Vec<String>>;

    /// Replace the stored token list.
    ///
    /// The distributed backend skips the write when `tokens` is empty so an
    /// empty list never occupies a key.
    async fn put_token_list(&self, key: &str, tokens: &[String], ttl: Duration) -> Result<bool>;

    /// Remaining TTL of a key. `Duration::ZERO` means "no such key" (or a
    /// key without expiry); the local backend returns a fixed nominal value
    /// for live keys instead of a tracked remainder.
    async fn get_expire(&self, key: &str) -> Result<Duration>;

    /// Store a serialized principal under a session key.
    async fn put_principal(&self, key: &str, principal: &Principal, ttl: Duration)
        -> Result<bool>;

    /// Principal for a session key; `None` when absent or expired.
    async fn get_principal(&self, key: &str) -> Result<Option<Principal>>;

    /// Store `username` under a refresh-token key; same semantics as
    /// [`SessionCache::put_token`] in the refresh-token namespace.
    async fn put_refresh_token(&self, key: &str, username: &str, ttl: Duration) -> Result<bool>;

    /// Remove a key, returning the number of entries removed (0 or 1).
    async fn delete(&self, key: &str) -> Result<u64>;

    /// Extend a key's TTL by `extend_by` on top of its current remainder.
    /// Returns `false` when the key does not exist.
    async fn renew(&self, token_key: &str, extend_by: Duration) -> Result<bool>;
}

/// Construct the configured cache backend at process startup.
///
/// This replaces any notion of a runtime container: the choice is made once,
/// from [`CacheSettings::backend`], and callers hold the trait object.
pub async fn build_cache(settings: &CacheSettings) -> Result<Arc<dyn SessionCache>> {
    match settings.backend {
        CacheBackend::Redis => {
            let cache = RedisSessionCache::connect(&settings.redis_url).await?;
            Ok(Arc::new(cache))
        }
        CacheBackend::Local => Ok(Arc::new(LocalSessionCache::new(
            settings.local_capacity,
            Duration::from_secs(settings.local_nominal_ttl_secs),
        ))),
    }
}
