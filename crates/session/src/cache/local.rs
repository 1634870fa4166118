// Copyright 2025 Palisade Contributors
// SPDX-License-Identifier: Apache-2.0

//! In-process session cache.
//!
//! A capacity-bounded map with write-time TTL eviction: every write first
//! drops expired entries, and when the map is still full the entry closest
//! to expiry makes room. State lives in this process only - acceptable for
//! single-instance deployments and test harnesses, nothing else.
//!
//! `get_expire` reports a fixed nominal TTL for live keys instead of a
//! tracked remainder; callers that need precise remainders need the Redis
//! backend.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

use palisade_core::{Principal, Result};

use super::SessionCache;

#[derive(Debug, Clone)]
enum Value {
    Text(String),
    List(Vec<String>),
    Principal(Box<Principal>),
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at: Instant,
}

impl Entry {
    fn live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// Session cache held entirely in process memory.
pub struct LocalSessionCache {
    entries: DashMap<String, Entry>,
    capacity: usize,
    nominal_ttl: Duration,
}

impl LocalSessionCache {
    /// Create a cache bounded to `capacity` entries that reports
    /// `nominal_ttl` as the remaining TTL of any live key.
    pub fn new(capacity: usize, nominal_ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            capacity,
            nominal_ttl,
        }
    }

    fn insert(&self, key: &str, value: Value, ttl: Duration) {
        let now = Instant::now();
        self.entries.retain(|_, entry| entry.live(now));
        if self.entries.len() >= self.capacity && !self.entries.contains_key(key) {
            // Still full after dropping expired entries: the entry closest
            // to expiry makes room.
            let victim = self
                .entries
                .iter()
                .min_by_key(|entry| entry.value().expires_at)
                .map(|entry| entry.key().clone());
            if let Some(victim) = victim {
                self.entries.remove(&victim);
            }
        }
        self.entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: now + ttl,
            },
        );
    }

    fn get_live(&self, key: &str) -> Option<Value> {
        let now = Instant::now();
        let live = match self.entries.get(key) {
            Some(entry) if entry.live(now) => Some(entry.value.clone()),
            Some(_) => None,
            None => return None,
        };
        if live.is_none() {
            // Read found a dead entry; drop it now rather than waiting for
            // the next write-time sweep.
            self.entries.remove(key);
        }
        live
    }
}

#[async_trait]
impl SessionCache for LocalSessionCache {
    async fn put_token(&self, key: &str, username: &str, ttl: Duration) -> Result<bool> {
        self.insert(key, Value::Text(username.to_string()), ttl);
        Ok(true)
    }

    async fn get_token(&self, key: &str) -> Result<Option<String>> {
        Ok(match self.get_live(key) {
            Some(Value::Text(username)) => Some(username),
            _ => None,
        })
    }

    async fn get_token_list(&self, key: &str) -> Result<Vec<String>> {
        Ok(match self.get_live(key) {
            Some(Value::List(tokens)) => tokens,
            _ => Vec::new(),
        })
    }

    async fn put_token_list(&self, key: &str, tokens: &[String], ttl: Duration) -> Result<bool> {
        self.insert(key, Value::List(tokens.to_vec()), ttl);
        Ok(true)
    }

    async fn get_expire(&self, key: &str) -> Result<Duration> {
        // Nominal value for live keys; zero-duration sentinel otherwise.
        Ok(if self.get_live(key).is_some() {
            self.nominal_ttl
        } else {
            Duration::ZERO
        })
    }

    async fn put_principal(
        &self,
        key: &str,
        principal: &Principal,
        ttl: Duration,
    ) -> Result<bool> {
        self.insert(key, Value::Principal(Box::new(principal.clone())), ttl);
        Ok(true)
    }

    async fn get_principal(&self, key: &str) -> Result<Option<Principal>> {
        Ok(match self.get_live(key) {
            Some(Value::Principal(principal)) => Some(*principal),
            _ => None,
        })
    }

    async fn put_refresh_token(&self, key: &str, username: &str, ttl: Duration) -> Result<bool> {
        self.put_token(key, username, ttl).await
    }

    async fn delete(&self, key: &str) -> Result<u64> {
        Ok(u64::from(self.entries.remove(key).is_some()))
    }

    async fn renew(&self, token_key: &str, extend_by: Duration) -> Result<bool> {
        let now = Instant::now();
        match self.entries.get_mut(token_key) {
            Some(mut entry) if entry.live(now) => {
                entry.expires_at += extend_by;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
