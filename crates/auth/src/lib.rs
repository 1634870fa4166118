// Copyright 2025 Palisade Contributors
// SPDX-License-Identifier: Apache-2.0

//! Login-grant strategies and the authentication flows for Palisade.
//!
//! A login names a grant type (`password`, `sms_code`, ...) and the
//! [`GrantRegistry`] dispatches it to exactly one registered
//! [`GrantStrategy`]. Strategies look callers up through the
//! [`UserDirectory`] collaborator and check secrets through a pluggable
//! [`CredentialVerifier`] - the Argon2 password comparator by default, or a
//! strategy-specific matcher.
//!
//! The [`LoginFlow`] ties the registry to the session manager: a successful
//! grant issues an access token and a refresh token, persists the principal
//! and later resolves `Authorization: Bearer ...` values back into
//! principals, scheduling background TTL renewal as it does so.

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod directory;
pub mod flow;
pub mod grant;
pub mod strategy;
pub mod verifier;

pub use directory::UserDirectory;
pub use flow::{LoginFlow, LoginSession};
pub use grant::{AuthToken, GrantRegistry, GrantStrategy, LoginRequest, GRANT_PASSWORD};
pub use strategy::{PasswordGrant, SmsCodeGrant, GRANT_SMS_CODE};
pub use verifier::{Argon2Verifier, CredentialVerifier, ExactMatcher};

#[cfg(any(test, feature = "testing"))]
pub use directory::MockUserDirectory;
