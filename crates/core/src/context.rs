// Copyright 2025 Palisade Contributors
// SPDX-License-Identifier: Apache-2.0

//! Per-request context and the principal accessor.
//!
//! The surrounding server populates a [`RequestContext`] once per call and
//! threads it by reference through the async chain - execution may hop
//! worker threads, so ambient thread-local state is never used. Palisade
//! only reads this context; it never establishes it.

use std::collections::HashMap;
use std::net::IpAddr;

use crate::principal::Principal;
use crate::{Error, Result};

/// Read-only view of the ambient call state: the authenticated principal
/// (if any), the raw request headers and the transport peer address.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    principal: Option<Principal>,
    token: Option<String>,
    headers: HashMap<String, String>,
    peer_addr: Option<IpAddr>,
}

impl RequestContext {
    /// Create a new builder.
    pub fn builder() -> RequestContextBuilder {
        RequestContextBuilder::default()
    }

    /// The authenticated principal.
    ///
    /// Fails with [`Error::InvalidToken`] when the pipeline did not
    /// establish one - the caller presented no token or an unknown one.
    pub fn principal(&self) -> Result<&Principal> {
        self.principal.as_ref().ok_or(Error::InvalidToken)
    }

    /// The authenticated principal, or the anonymous placeholder.
    ///
    /// Never fails; used on paths that tolerate unauthenticated callers.
    pub fn principal_or_anonymous(&self) -> Principal {
        self.principal.clone().unwrap_or_else(Principal::anonymous)
    }

    /// The raw bearer token, or the empty string when absent.
    pub fn token(&self) -> &str {
        self.token.as_deref().unwrap_or("")
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The transport-level peer address, when known.
    pub fn peer_addr(&self) -> Option<IpAddr> {
        self.peer_addr
    }
}

/// Builder for [`RequestContext`] instances.
#[derive(Debug, Default)]
pub struct RequestContextBuilder {
    principal: Option<Principal>,
    token: Option<String>,
    headers: HashMap<String, String>,
    peer_addr: Option<IpAddr>,
}

impl RequestContextBuilder {
    /// Attach the authenticated principal.
    pub fn principal(mut self, principal: Principal) -> Self {
        self.principal = Some(principal);
        self
    }

    /// Attach the raw bearer token.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Add a request header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set the transport peer address.
    pub fn peer_addr(mut self, addr: IpAddr) -> Self {
        self.peer_addr = Some(addr);
        self
    }

    /// Build the context.
    pub fn build(self) -> RequestContext {
        RequestContext {
            principal: self.principal,
            token: self.token,
            headers: self.headers,
            peer_addr: self.peer_addr,
        }
    }
}
