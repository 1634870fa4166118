// Copyright 2025 Palisade Contributors
// SPDX-License-Identifier: Apache-2.0

//! The grant-type strategy contract and its registry.
//!
//! Each strategy declares the grant-type string it serves; the registry
//! holds at most one strategy per type and dispatch of an unregistered type
//! is a hard "invalid grant type" error - never a silent fallback. The one
//! default that exists lives upstream: a login request that names no grant
//! type is treated as a `password` login before dispatch.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use palisade_core::{Error, Principal, Result};

/// The grant type applied when a login request names none.
pub const GRANT_PASSWORD: &str = "password";

/// A login attempt: who, with what secret, via which grant type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Login name.
    pub username: String,
    /// Password, one-time code or other grant-specific secret.
    pub secret: String,
    /// Declared grant type; empty or absent means `password`.
    #[serde(default)]
    pub grant_type: Option<String>,
}

impl LoginRequest {
    /// Convenience constructor for the default password grant.
    pub fn password(username: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            secret: secret.into(),
            grant_type: None,
        }
    }

    /// The effective grant type, with the upstream `password` default applied.
    pub fn effective_grant_type(&self) -> &str {
        match self.grant_type.as_deref() {
            None | Some("") => GRANT_PASSWORD,
            Some(ty) => ty,
        }
    }
}

/// Authentication result wrapper suitable for context propagation.
#[derive(Debug, Clone)]
pub struct AuthToken {
    /// The validated principal.
    pub principal: Principal,
    /// The grant type that produced it.
    pub grant_type: String,
}

/// One login method (password, SMS code, ...).
#[async_trait]
pub trait GrantStrategy: Send + Sync {
    /// The grant-type string this strategy serves.
    fn grant_type(&self) -> &str {
        GRANT_PASSWORD
    }

    /// Validate the request and wrap the principal for propagation.
    async fn authenticate(&self, request: &LoginRequest) -> Result<AuthToken> {
        let principal = self.user_details(request).await?;
        Ok(AuthToken {
            principal,
            grant_type: self.grant_type().to_string(),
        })
    }

    /// Look the user up and check the supplied secret, distinguishing
    /// "username not found" from "credential mismatch".
    async fn user_details(&self, request: &LoginRequest) -> Result<Principal>;
}

/// Registry mapping grant-type strings to their single strategy.
#[derive(Default)]
pub struct GrantRegistry {
    strategies: HashMap<String, Arc<dyn GrantStrategy>>,
}

impl GrantRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a strategy under its declared grant type, replacing any
    /// previous registration for that type.
    pub fn register(&mut self, strategy: Arc<dyn GrantStrategy>) -> &mut Self {
        let grant_type = strategy.grant_type().to_string();
        debug!(grant_type = %grant_type, "grant strategy registered");
        self.strategies.insert(grant_type, strategy);
        self
    }

    /// The strategy for `grant_type`.
    ///
    /// Fails with [`Error::InvalidGrantType`] when nothing is registered
    /// under that type.
    pub fn resolve(&self, grant_type: &str) -> Result<Arc<dyn GrantStrategy>> {
        self.strategies
            .get(grant_type)
            .cloned()
            .ok_or_else(|| Error::InvalidGrantType(grant_type.to_string()))
    }

    /// Registered grant types, for diagnostics.
    pub fn grant_types(&self) -> Vec<&str> {
        self.strategies.keys().map(String::as_str).collect()
    }
}
