// Copyright 2025 Palisade Contributors
// SPDX-License-Identifier: Apache-2.0

//! User lookup collaborator.
//!
//! Palisade does not own user storage; the embedding application implements
//! [`UserDirectory`] over whatever holds its accounts (relational store,
//! LDAP, a fixture map in tests) and hands back the stored principal -
//! identity, credential hash, roles and account-state flags, no token.

use async_trait::async_trait;
use palisade_core::{Principal, Result};

/// Lookup of stored users by username.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// The stored principal for `username`, or `None` when unknown.
    async fn find_by_username(&self, username: &str) -> Result<Option<Principal>>;
}
