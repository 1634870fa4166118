// Copyright 2025 Palisade Contributors
// SPDX-License-Identifier: Apache-2.0

//! Redis-backed session cache.
//!
//! Values are JSON-serialized and TTLs are enforced server-side, so every
//! instance sharing the store sees the same sessions and the same expiry.
//! Token lists are kept hash-map-like (one hash field per token) and
//! replaced wholesale on write.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use palisade_core::{Error, Principal, Result};

use super::SessionCache;

fn store_err(err: redis::RedisError) -> Error {
    Error::Store(err.to_string())
}

/// Session cache over a network-accessible shared Redis store.
#[derive(Clone)]
pub struct RedisSessionCache {
    conn: ConnectionManager,
}

impl RedisSessionCache {
    /// Connect to the store and start the managed connection.
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url).map_err(store_err)?;
        let conn = ConnectionManager::new(client).await.map_err(store_err)?;
        Ok(Self { conn })
    }

    /// Wrap an already-established managed connection.
    pub fn from_connection(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl SessionCache for RedisSessionCache {
    async fn put_token(&self, key: &str, username: &str, ttl: Duration) -> Result<bool> {
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(key, username, ttl.as_secs())
            .await
            .map_err(store_err)?;
        Ok(true)
    }

    async fn get_token(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        conn.get(key).await.map_err(store_err)
    }

    async fn get_token_list(&self, key: &str) -> Result<Vec<String>> {
        let mut conn = self.conn.clone();
        conn.hvals(key).await.map_err(store_err)
    }

    async fn put_token_list(&self, key: &str, tokens: &[String], ttl: Duration) -> Result<bool> {
        // An empty list never occupies a key in the shared store.
        if tokens.is_empty() {
            return Ok(false);
        }
        let pairs: Vec<(&str, &str)> = tokens
            .iter()
            .map(|t| (t.as_str(), t.as_str()))
            .collect();
        let mut conn = self.conn.clone();
        let mut pipe = redis::pipe();
        pipe.atomic()
            .del(key)
            .ignore()
            .hset_multiple(key, &pairs)
            .ignore()
            .expire(key, ttl.as_secs() as i64)
            .ignore();
        pipe.query_async::<()>(&mut conn).await.map_err(store_err)?;
        Ok(true)
    }

    async fn get_expire(&self, key: &str) -> Result<Duration> {
        let mut conn = self.conn.clone();
        let ttl: i64 = conn.ttl(key).await.map_err(store_err)?;
        // TTL is negative for missing keys (-2) and keys without expiry (-1);
        // both collapse to the zero-duration sentinel.
        if ttl <= 0 {
            Ok(Duration::ZERO)
        } else {
            Ok(Duration::from_secs(ttl as u64))
        }
    }

    async fn put_principal(
        &self,
        key: &str,
        principal: &Principal,
        ttl: Duration,
    ) -> Result<bool> {
        let body = serde_json::to_string(principal)?;
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(key, body, ttl.as_secs())
            .await
            .map_err(store_err)?;
        Ok(true)
    }

    async fn get_principal(&self, key: &str) -> Result<Option<Principal>> {
        let mut conn = self.conn.clone();
        let body: Option<String> = conn.get(key).await.map_err(store_err)?;
        match body {
            Some(body) => Ok(Some(serde_json::from_str(&body)?)),
            None => Ok(None),
        }
    }

    async fn put_refresh_token(&self, key: &str, username: &str, ttl: Duration) -> Result<bool> {
        self.put_token(key, username, ttl).await
    }

    async fn delete(&self, key: &str) -> Result<u64> {
        let mut conn = self.conn.clone();
        conn.del(key).await.map_err(store_err)
    }

    async fn renew(&self, token_key: &str, extend_by: Duration) -> Result<bool> {
        // Read-then-write: the sum of the current remainder and the
        // extension becomes the new TTL. Atomicity of the pair is the
        // store's property, not re-derived here.
        let remaining = self.get_expire(token_key).await?;
        if remaining.is_zero() {
            return Ok(false);
        }
        let total = remaining + extend_by;
        let mut conn = self.conn.clone();
        conn.expire(token_key, total.as_secs() as i64)
            .await
            .map_err(store_err)
    }
}
