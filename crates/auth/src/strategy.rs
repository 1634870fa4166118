// Copyright 2025 Palisade Contributors
// SPDX-License-Identifier: Apache-2.0

//! Built-in grant strategies.
//!
//! Both strategies follow the same outline: look the user up in the
//! [`UserDirectory`], check the supplied secret with a
//! [`CredentialVerifier`], then check the account-state flags. The errors
//! stay distinct internally ("username not found" vs "password mismatch");
//! collapsing them for the transport is [`palisade_core::Error`]'s job.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use palisade_core::{Error, Principal, Result};

use crate::directory::UserDirectory;
use crate::grant::{GrantStrategy, LoginRequest, GRANT_PASSWORD};
use crate::verifier::{Argon2Verifier, CredentialVerifier};

/// The `sms_code` grant type.
pub const GRANT_SMS_CODE: &str = "sms_code";

async fn lookup_and_verify(
    directory: &Arc<dyn UserDirectory>,
    verifier: &Arc<dyn CredentialVerifier>,
    request: &LoginRequest,
    stored_secret: impl Fn(&Principal) -> String,
) -> Result<Principal> {
    let principal = directory
        .find_by_username(&request.username)
        .await?
        .ok_or_else(|| Error::UsernameNotFound(request.username.clone()))?;

    if !verifier.verify(&stored_secret(&principal), &request.secret) {
        return Err(Error::CredentialMismatch(request.username.clone()));
    }
    if !principal.account_usable() {
        return Err(Error::AccountUnavailable(request.username.clone()));
    }
    debug!(username = %principal.username, "credentials accepted");
    Ok(principal)
}

/// Username/password login checked against the stored hash.
pub struct PasswordGrant {
    directory: Arc<dyn UserDirectory>,
    verifier: Arc<dyn CredentialVerifier>,
}

impl PasswordGrant {
    /// Password grant with the default Argon2 comparator.
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self::with_verifier(directory, Arc::new(Argon2Verifier))
    }

    /// Password grant with a custom comparator.
    pub fn with_verifier(
        directory: Arc<dyn UserDirectory>,
        verifier: Arc<dyn CredentialVerifier>,
    ) -> Self {
        Self {
            directory,
            verifier,
        }
    }
}

#[async_trait]
impl GrantStrategy for PasswordGrant {
    fn grant_type(&self) -> &str {
        GRANT_PASSWORD
    }

    async fn user_details(&self, request: &LoginRequest) -> Result<Principal> {
        lookup_and_verify(&self.directory, &self.verifier, request, |p| {
            p.password_hash.clone()
        })
        .await
    }
}

/// One-time-code login; the code source is the strategy's matcher.
///
/// The matcher receives the username as the "stored" side so it can consult
/// whatever issued the code (an SMS gateway's store, a fixture map in
/// tests).
pub struct SmsCodeGrant {
    directory: Arc<dyn UserDirectory>,
    matcher: Arc<dyn CredentialVerifier>,
}

impl SmsCodeGrant {
    /// SMS-code grant with a strategy-defined matcher.
    pub fn new(directory: Arc<dyn UserDirectory>, matcher: Arc<dyn CredentialVerifier>) -> Self {
        Self { directory, matcher }
    }
}

#[async_trait]
impl GrantStrategy for SmsCodeGrant {
    fn grant_type(&self) -> &str {
        GRANT_SMS_CODE
    }

    async fn user_details(&self, request: &LoginRequest) -> Result<Principal> {
        lookup_and_verify(&self.directory, &self.matcher, request, |p| {
            p.username.clone()
        })
        .await
    }
}
