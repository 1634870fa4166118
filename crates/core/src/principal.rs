// Copyright 2025 Palisade Contributors
// SPDX-License-Identifier: Apache-2.0

//! The authenticated caller and its token metadata.
//!
//! A [`Principal`] is constructed by a grant strategy at login time, stored
//! serialized in the session cache under a token-derived key, re-stamped on
//! renewal and deleted on logout. The password hash travels with the cached
//! document (the cache round-trip needs it) but is redacted from `Debug`
//! output so it can never reach a log line.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata of the access token embedded in a cached [`Principal`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMeta {
    /// The opaque bearer token string.
    pub value: String,
    /// When the token was issued.
    pub issued_at: DateTime<Utc>,
    /// When the token expires unless renewed.
    pub expires_at: DateTime<Utc>,
    /// Last time the session was touched; updated by refresh.
    pub last_activity: DateTime<Utc>,
}

/// Association between an opaque bearer token and a username, with expiry.
///
/// A token key maps to at most one username at a time; writing a record for
/// an existing key replaces the previous association.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    /// The bearer token string.
    pub token: String,
    /// The username the token authenticates.
    pub username: String,
    /// Issue time.
    pub issued_at: DateTime<Utc>,
    /// Expiry time.
    pub expires_at: DateTime<Utc>,
}

impl TokenRecord {
    /// Mint a fresh record with a random opaque token valid for `ttl_secs`.
    pub fn issue(username: impl Into<String>, ttl_secs: u64) -> Self {
        let now = Utc::now();
        Self {
            token: Uuid::new_v4().to_string(),
            username: username.into(),
            issued_at: now,
            expires_at: now + Duration::seconds(ttl_secs as i64),
        }
    }
}

/// The authenticated caller's identity and session metadata.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Stable user identifier.
    pub user_id: String,
    /// Login name.
    pub username: String,
    /// Stored credential hash; never logged.
    pub password_hash: String,
    /// Granted role names.
    pub roles: Vec<String>,
    /// Account may log in at all.
    pub enabled: bool,
    /// Account itself has not expired.
    pub account_non_expired: bool,
    /// Account is not administratively locked.
    pub account_non_locked: bool,
    /// Stored credentials have not expired.
    pub credentials_non_expired: bool,
    /// Access token metadata, present once a token has been issued.
    pub token: Option<TokenMeta>,
}

impl Principal {
    /// Create a new builder.
    pub fn builder() -> PrincipalBuilder {
        PrincipalBuilder::default()
    }

    /// Placeholder principal with an empty id, used where a caller may be
    /// unauthenticated and the operation must not fail.
    pub fn anonymous() -> Self {
        Self {
            user_id: String::new(),
            username: String::new(),
            password_hash: String::new(),
            roles: Vec::new(),
            enabled: true,
            account_non_expired: true,
            account_non_locked: true,
            credentials_non_expired: true,
            token: None,
        }
    }

    /// Whether every account-state flag permits a login.
    pub fn account_usable(&self) -> bool {
        self.enabled
            && self.account_non_expired
            && self.account_non_locked
            && self.credentials_non_expired
    }

    /// Attach freshly-issued token metadata.
    pub fn with_token(mut self, record: &TokenRecord) -> Self {
        self.token = Some(TokenMeta {
            value: record.token.clone(),
            issued_at: record.issued_at,
            expires_at: record.expires_at,
            last_activity: record.issued_at,
        });
        self
    }
}

impl std::fmt::Debug for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Principal")
            .field("user_id", &self.user_id)
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .field("roles", &self.roles)
            .field("enabled", &self.enabled)
            .field("account_non_expired", &self.account_non_expired)
            .field("account_non_locked", &self.account_non_locked)
            .field("credentials_non_expired", &self.credentials_non_expired)
            .field("token", &self.token)
            .finish()
    }
}

/// Builder for [`Principal`] instances.
#[derive(Default)]
pub struct PrincipalBuilder {
    user_id: Option<String>,
    username: Option<String>,
    password_hash: Option<String>,
    roles: Vec<String>,
    enabled: Option<bool>,
    account_non_expired: Option<bool>,
    account_non_locked: Option<bool>,
    credentials_non_expired: Option<bool>,
}

impl PrincipalBuilder {
    /// Set the stable user id (required).
    pub fn user_id(mut self, id: impl Into<String>) -> Self {
        self.user_id = Some(id.into());
        self
    }

    /// Set the login name (required).
    pub fn username(mut self, name: impl Into<String>) -> Self {
        self.username = Some(name.into());
        self
    }

    /// Set the stored credential hash.
    pub fn password_hash(mut self, hash: impl Into<String>) -> Self {
        self.password_hash = Some(hash.into());
        self
    }

    /// Add a role.
    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }

    /// Set the enabled flag (default: true).
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    /// Set the account-non-expired flag (default: true).
    pub fn account_non_expired(mut self, v: bool) -> Self {
        self.account_non_expired = Some(v);
        self
    }

    /// Set the account-non-locked flag (default: true).
    pub fn account_non_locked(mut self, v: bool) -> Self {
        self.account_non_locked = Some(v);
        self
    }

    /// Set the credentials-non-expired flag (default: true).
    pub fn credentials_non_expired(mut self, v: bool) -> Self {
        self.credentials_non_expired = Some(v);
        self
    }

    /// Build the [`Principal`]. Returns `Err` if required fields are missing.
    pub fn build(self) -> crate::Result<Principal> {
        let user_id = self
            .user_id
            .ok_or_else(|| crate::Error::Serialization("user_id is required".into()))?;
        let username = self
            .username
            .ok_or_else(|| crate::Error::Serialization("username is required".into()))?;
        Ok(Principal {
            user_id,
            username,
            password_hash: self.password_hash.unwrap_or_default(),
            roles: self.roles,
            enabled: self.enabled.unwrap_or(true),
            account_non_expired: self.account_non_expired.unwrap_or(true),
            account_non_locked: self.account_non_locked.unwrap_or(true),
            credentials_non_expired: self.credentials_non_expired.unwrap_or(true),
            token: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_principal() -> Principal {
        Principal::builder()
            .user_id("u-1")
            .username("alice")
            .password_hash("$argon2id$dummy")
            .role("user")
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_defaults_flags_to_true() {
        let p = make_principal();
        assert!(p.enabled);
        assert!(p.account_non_expired);
        assert!(p.account_non_locked);
        assert!(p.credentials_non_expired);
        assert!(p.account_usable());
    }

    #[test]
    fn test_builder_requires_user_id() {
        let result = Principal::builder().username("alice").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_requires_username() {
        let result = Principal::builder().user_id("u-1").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_account_usable_false_when_locked() {
        let p = Principal::builder()
            .user_id("u-1")
            .username("alice")
            .account_non_locked(false)
            .build()
            .unwrap();
        assert!(!p.account_usable());
    }

    #[test]
    fn test_debug_redacts_password_hash() {
        let p = make_principal();
        let rendered = format!("{p:?}");
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("argon2id"));
    }

    #[test]
    fn test_token_record_issue_sets_expiry() {
        let record = TokenRecord::issue("alice", 3600);
        assert_eq!(record.username, "alice");
        assert!(!record.token.is_empty());
        let ttl = record.expires_at - record.issued_at;
        assert_eq!(ttl.num_seconds(), 3600);
    }

    #[test]
    fn test_with_token_stamps_metadata() {
        let record = TokenRecord::issue("alice", 60);
        let p = make_principal().with_token(&record);
        let meta = p.token.unwrap();
        assert_eq!(meta.value, record.token);
        assert_eq!(meta.last_activity, record.issued_at);
    }

    #[test]
    fn test_principal_serialization_roundtrip() {
        let record = TokenRecord::issue("alice", 60);
        let p = make_principal().with_token(&record);
        let json = serde_json::to_string(&p).unwrap();
        let back: Principal = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn test_anonymous_has_empty_id() {
        let p = Principal::anonymous();
        assert!(p.user_id.is_empty());
        assert!(p.token.is_none());
    }
}
