// Copyright 2025 Palisade Contributors
// SPDX-License-Identifier: Apache-2.0

//! Token and session storage for Palisade.
//!
//! This crate provides the [`SessionCache`] abstraction over the shared
//! store, with two interchangeable backends:
//!
//! - [`cache::redis::RedisSessionCache`] - values JSON-serialized into a
//!   shared Redis store with server-side TTLs; required whenever more than
//!   one instance must see the same sessions.
//! - [`cache::local::LocalSessionCache`] - an in-process, capacity-bounded
//!   map with write-time TTL eviction; single-instance deployments and test
//!   harnesses only.
//!
//! On top of the cache sits the [`SessionManager`], which owns the
//! key-construction rules and the domain operations: issuing tokens at
//! login, logging out, refreshing a session and fire-and-forget background
//! renewal.

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod cache;
pub mod manager;

pub use cache::{build_cache, SessionCache};
pub use manager::SessionManager;

#[cfg(any(test, feature = "testing"))]
pub use cache::MockSessionCache;
