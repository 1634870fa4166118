// Copyright 2025 Palisade Contributors
// SPDX-License-Identifier: Apache-2.0

//! Redis-backed rate primitive.
//!
//! Window state lives in one hash per key (`permits`, `window`, `unit`,
//! `remaining`), mutated by server-side Lua scripts so configure-and-count
//! stays atomic across every instance sharing the store. The guard's
//! post-admission `expire` gives the key a TTL of one window; an idle key
//! evaporates and the next call starts a fresh window.

use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Script};

use palisade_core::{Error, Result};

use super::RatePrimitive;
use crate::rule::WindowUnit;

fn store_err(err: redis::RedisError) -> Error {
    Error::Store(err.to_string())
}

fn unit_tag(unit: WindowUnit) -> &'static str {
    match unit {
        WindowUnit::Seconds => "seconds",
        WindowUnit::Minutes => "minutes",
        WindowUnit::Hours => "hours",
        WindowUnit::Days => "days",
    }
}

// Returns 1 when the rate was configured, 0 when it already was, -1 when
// the existing configuration uses a different unit.
static SET_RATE: Lazy<Script> = Lazy::new(|| {
    Script::new(
        r#"
        local unit = redis.call('HGET', KEYS[1], 'unit')
        if unit then
            if unit ~= ARGV[3] then
                return -1
            end
            return 0
        end
        redis.call('HSET', KEYS[1],
            'permits', ARGV[1], 'window', ARGV[2], 'unit', ARGV[3],
            'remaining', ARGV[1])
        return 1
        "#,
    )
});

// Returns 1 when quota was consumed, 0 when exhausted, -1 when the key has
// no configured rate.
static ACQUIRE: Lazy<Script> = Lazy::new(|| {
    Script::new(
        r#"
        local remaining = redis.call('HGET', KEYS[1], 'remaining')
        if not remaining then
            return -1
        end
        remaining = tonumber(remaining)
        local wanted = tonumber(ARGV[1])
        if remaining >= wanted then
            redis.call('HINCRBY', KEYS[1], 'remaining', -wanted)
            return 1
        end
        return 0
        "#,
    )
});

/// Rate primitive over a shared Redis store.
#[derive(Clone)]
pub struct RedisRatePrimitive {
    conn: ConnectionManager,
}

impl RedisRatePrimitive {
    /// Connect to the store and start the managed connection.
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url).map_err(store_err)?;
        let conn = ConnectionManager::new(client).await.map_err(store_err)?;
        Ok(Self { conn })
    }

    /// Wrap an already-established managed connection (typically the one
    /// behind the distributed session cache).
    pub fn from_connection(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl RatePrimitive for RedisRatePrimitive {
    async fn try_set_rate(
        &self,
        key: &str,
        permits: u32,
        window: u64,
        unit: WindowUnit,
    ) -> Result<bool> {
        let mut conn = self.conn.clone();
        let outcome: i64 = SET_RATE
            .key(key)
            .arg(permits)
            .arg(window)
            .arg(unit_tag(unit))
            .invoke_async(&mut conn)
            .await
            .map_err(store_err)?;
        match outcome {
            -1 => Err(Error::RateConfigConflict(key.to_string())),
            0 => Ok(false),
            _ => Ok(true),
        }
    }

    async fn try_acquire(&self, key: &str, permits: u32) -> Result<bool> {
        let mut conn = self.conn.clone();
        let outcome: i64 = ACQUIRE
            .key(key)
            .arg(permits)
            .invoke_async(&mut conn)
            .await
            .map_err(store_err)?;
        Ok(outcome == 1)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool> {
        let mut conn = self.conn.clone();
        conn.expire(key, ttl.as_secs() as i64)
            .await
            .map_err(store_err)
    }
}
