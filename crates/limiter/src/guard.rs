// Copyright 2025 Palisade Contributors
// SPDX-License-Identifier: Apache-2.0

//! The rate-limit guard around protected operations.
//!
//! The guard is an explicit decorator: callers hand it the resolved
//! [`RateRule`], the ambient [`RequestContext`] and the call's argument
//! values, plus the protected operation as a closure. The admission check
//! runs first, always; a denied call fails fast with the rule's wait hint
//! and the operation is never invoked. Whatever the operation yields - a
//! single value, a stream handle, nothing - passes through unchanged.

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, warn};

use palisade_core::{Error, RequestContext, Result};

use crate::ip::client_ip;
use crate::key::{KeyResolver, PositionalKeyResolver};
use crate::primitive::RatePrimitive;
use crate::rule::RateRule;

/// Composes rate-limit keys and gates protected operations on the
/// [`RatePrimitive`].
pub struct RateGuard {
    primitive: Arc<dyn RatePrimitive>,
    resolver: Arc<dyn KeyResolver>,
}

impl RateGuard {
    /// Guard with the built-in positional key resolver.
    pub fn new(primitive: Arc<dyn RatePrimitive>) -> Self {
        Self::with_resolver(primitive, Arc::new(PositionalKeyResolver))
    }

    /// Guard with a custom key resolver.
    pub fn with_resolver(
        primitive: Arc<dyn RatePrimitive>,
        resolver: Arc<dyn KeyResolver>,
    ) -> Self {
        Self {
            primitive,
            resolver,
        }
    }

    /// Compose the quota key for one call: resolved base, then `#<ip>`,
    /// then `#<user-id>`, each appended only when the rule asks for it.
    /// Deterministic for identical inputs.
    pub fn compose_key(&self, rule: &RateRule, ctx: &RequestContext, args: &[String]) -> String {
        let mut key = self.resolver.resolve(&rule.key_expr, args);
        if rule.restrict_ip {
            key.push('#');
            key.push_str(&client_ip(ctx));
        }
        if rule.restrict_user {
            let principal = ctx.principal_or_anonymous();
            let user_id = if principal.user_id.is_empty() {
                "0"
            } else {
                principal.user_id.as_str()
            };
            key.push('#');
            key.push_str(user_id);
        }
        key
    }

    /// Gate `operation` behind the rule's quota.
    ///
    /// On admission the key's expiry is pushed out to one window and the
    /// operation runs; on exhaustion the call fails with
    /// [`Error::RateLimited`] before the operation is reached.
    pub async fn intercept<T, F, Fut>(
        &self,
        rule: &RateRule,
        ctx: &RequestContext,
        args: &[String],
        operation: F,
    ) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let key = self.compose_key(rule, ctx, args);

        self.primitive
            .try_set_rate(&key, rule.permits, rule.window, rule.unit)
            .await?;
        let admitted = self.primitive.try_acquire(&key, 1).await?;
        if !admitted {
            warn!(key = %key, permits = rule.permits, "rate limit exceeded");
            return Err(Error::RateLimited {
                message: rule.wait_hint(),
            });
        }
        self.primitive
            .expire(&key, rule.unit.to_duration(rule.window))
            .await?;

        debug!(key = %key, "admission granted");
        operation().await
    }
}
