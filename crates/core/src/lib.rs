// Copyright 2025 Palisade Contributors
// SPDX-License-Identifier: Apache-2.0

//! Shared vocabulary for the Palisade middleware crates.
//!
//! This crate holds the types every other Palisade crate speaks in:
//!
//! - [`keys`] - the hierarchical cache key namespace
//! - [`principal`] - the authenticated caller ([`Principal`], [`TokenRecord`])
//! - [`context`] - the per-request [`RequestContext`] and principal accessors
//! - [`error`] - the shared error taxonomy
//! - [`settings`] - configuration loading and backend selection
//!
//! Nothing here performs I/O; storage and transport concerns live in the
//! `palisade-session`, `palisade-auth` and `palisade-limiter` crates.

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod context;
pub mod error;
pub mod keys;
pub mod principal;
pub mod settings;

pub use context::RequestContext;
pub use error::{Error, Result, StatusClass};
pub use principal::{Principal, TokenMeta, TokenRecord};
pub use settings::{AuthSettings, CacheBackend, CacheSettings, Settings};
