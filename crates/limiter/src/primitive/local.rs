// Copyright 2025 Palisade Contributors
// SPDX-License-Identifier: Apache-2.0

//! In-process rate primitive.
//!
//! Fixed-window counters in a process-local map: the window state expires
//! with the key and the next `try_set_rate` starts a fresh window with a
//! full budget. Single-instance deployments and test harnesses only -
//! admission is atomic per entry, but nothing here is visible to other
//! processes.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

use palisade_core::{Error, Result};

use super::RatePrimitive;
use crate::rule::WindowUnit;

#[derive(Debug, Clone, Copy)]
struct Window {
    permits: u32,
    window: u64,
    unit: WindowUnit,
    remaining: u32,
    expires_at: Instant,
}

/// Rate primitive held entirely in process memory.
#[derive(Default)]
pub struct LocalRatePrimitive {
    windows: DashMap<String, Window>,
}

impl LocalRatePrimitive {
    /// Empty primitive.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RatePrimitive for LocalRatePrimitive {
    async fn try_set_rate(
        &self,
        key: &str,
        permits: u32,
        window: u64,
        unit: WindowUnit,
    ) -> Result<bool> {
        let now = Instant::now();
        let mut conflict = false;
        let mut initialized = false;

        self.windows
            .entry(key.to_string())
            .and_modify(|state| {
                if state.expires_at <= now {
                    // Window rolled over; replenish wholesale.
                    *state = Window {
                        permits,
                        window,
                        unit,
                        remaining: permits,
                        expires_at: now + unit.to_duration(window),
                    };
                    initialized = true;
                } else if state.unit != unit {
                    conflict = true;
                }
            })
            .or_insert_with(|| {
                initialized = true;
                Window {
                    permits,
                    window,
                    unit,
                    remaining: permits,
                    expires_at: now + unit.to_duration(window),
                }
            });

        if conflict {
            return Err(Error::RateConfigConflict(key.to_string()));
        }
        Ok(initialized)
    }

    async fn try_acquire(&self, key: &str, permits: u32) -> Result<bool> {
        let now = Instant::now();
        match self.windows.get_mut(key) {
            Some(mut state) if state.expires_at > now => {
                if state.remaining >= permits {
                    state.remaining -= permits;
                    Ok(true)
                } else {
                    Ok(false)
                }
            }
            _ => Ok(false),
        }
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool> {
        match self.windows.get_mut(key) {
            Some(mut state) => {
                state.expires_at = Instant::now() + ttl;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
