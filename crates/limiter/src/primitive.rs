// Copyright 2025 Palisade Contributors
// SPDX-License-Identifier: Apache-2.0

//! The distributed rate primitive contract.
//!
//! An atomic fixed-window counter keyed by composed rate-limit key. The
//! guard drives it in a fixed sequence: configure the rate if this key has
//! never seen one, attempt to consume one permit, then push the key's
//! expiry out to the window length. Replenishment is wholesale - the key
//! expires at window end and the next call re-initializes it - and
//! exactly-at-boundary tie-breaks are owned by the implementation.

use std::time::Duration;

use async_trait::async_trait;

use palisade_core::Result;

use crate::rule::WindowUnit;

pub mod local;
pub mod redis;

pub use local::LocalRatePrimitive;
pub use redis::RedisRatePrimitive;

/// Atomic counting primitive shared by every instance enforcing a policy.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait RatePrimitive: Send + Sync {
    /// Configure `permits` per `window` for `key` unless already configured
    /// ("overall" scope: one budget for all callers of the key).
    ///
    /// Idempotent on repeat calls with the same configuration (`Ok(false)`).
    /// Re-configuring an existing key with a different window unit is the
    /// one documented failure, surfaced as
    /// [`palisade_core::Error::RateConfigConflict`].
    async fn try_set_rate(
        &self,
        key: &str,
        permits: u32,
        window: u64,
        unit: WindowUnit,
    ) -> Result<bool>;

    /// Consume `permits` units of quota; `false` means exhausted. A key
    /// with no configured rate admits nothing.
    async fn try_acquire(&self, key: &str, permits: u32) -> Result<bool>;

    /// Reset the key's expiry; `false` when the key does not exist.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool>;
}
