// Copyright 2025 Palisade Contributors
// SPDX-License-Identifier: Apache-2.0

//! Context-aware rate limiting for Palisade.
//!
//! A [`RateRule`] names a key expression, a permit budget and a fixed
//! window. Per intercepted call, the [`RateGuard`]:
//!
//! 1. resolves the base key from the rule's expression and the call's
//!    arguments ([`key::PositionalKeyResolver`] by default),
//! 2. appends `#<ip>` when the rule restricts by caller IP, resolved
//!    through the trusted-proxy header chain ([`ip::client_ip`]),
//! 3. appends `#<user-id>` when the rule restricts by caller identity,
//! 4. consults the [`RatePrimitive`] - an atomic fixed-window counter,
//!    shared across instances in the Redis implementation - and either
//!    invokes the protected operation or fails fast with a 429-class error.
//!
//! The admission check always precedes the protected operation; a denied
//! call never reaches it.

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod guard;
pub mod ip;
pub mod key;
pub mod primitive;
pub mod rule;

pub use guard::RateGuard;
pub use key::{KeyResolver, PositionalKeyResolver};
pub use primitive::{LocalRatePrimitive, RatePrimitive, RedisRatePrimitive};
pub use rule::{RateRule, WindowUnit};

#[cfg(any(test, feature = "testing"))]
pub use primitive::MockRatePrimitive;
