// Copyright 2025 Palisade Contributors
// SPDX-License-Identifier: Apache-2.0

//! Session lifecycle on top of the cache.
//!
//! The manager owns the key-construction rules from
//! [`palisade_core::keys`] and exposes the domain operations: issuing
//! tokens at login, logging out (which also prunes the owner's token list),
//! refreshing a session's activity window, and fire-and-forget background
//! renewal that never delays or fails the originating request.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use palisade_core::{keys, Error, Principal, Result, TokenRecord};

use crate::cache::SessionCache;

/// Domain operations over the session cache.
#[derive(Clone)]
pub struct SessionManager {
    cache: Arc<dyn SessionCache>,
}

impl SessionManager {
    /// Wrap a cache backend.
    pub fn new(cache: Arc<dyn SessionCache>) -> Self {
        Self { cache }
    }

    /// The underlying cache, for collaborators that share it.
    pub fn cache(&self) -> &Arc<dyn SessionCache> {
        &self.cache
    }

    /// Mint a fresh access token for `username`, record the token -> user
    /// association (both the token and token-session entries) and append
    /// the token to the user's token list.
    pub async fn login_issue(&self, username: &str, ttl: Duration) -> Result<TokenRecord> {
        let record = TokenRecord::issue(username, ttl.as_secs());
        self.cache
            .put_token(&keys::token_key(&record.token), username, ttl)
            .await?;
        self.cache
            .put_token(&keys::token_session_key(&record.token), username, ttl)
            .await?;

        let user_key = keys::user_key(username);
        let mut tokens = self.cache.get_token_list(&user_key).await?;
        tokens.push(record.token.clone());
        self.cache.put_token_list(&user_key, &tokens, ttl).await?;

        info!(username = %username, "access token issued");
        Ok(record)
    }

    /// Mint a refresh token for `username` in the refresh-token namespace.
    pub async fn issue_refresh_token(
        &self,
        username: &str,
        ttl: Duration,
    ) -> Result<TokenRecord> {
        let record = TokenRecord::issue(username, ttl.as_secs());
        self.cache
            .put_refresh_token(&keys::refresh_token_key(&record.token), username, ttl)
            .await?;
        Ok(record)
    }

    /// Store the principal document under the session key of its token.
    pub async fn persist_principal(&self, principal: &Principal, ttl: Duration) -> Result<bool> {
        let meta = principal.token.as_ref().ok_or(Error::InvalidToken)?;
        self.cache
            .put_principal(&keys::session_key(&meta.value), principal, ttl)
            .await
    }

    /// Tear down every cache entry tied to `token`.
    ///
    /// Deletes the token, token-session and session entries, then removes
    /// every occurrence of the token from the owner's token list (an empty
    /// list is deleted outright).
    pub async fn logout(&self, token: &str) -> Result<()> {
        let username = self.cache.get_token(&keys::token_key(token)).await?;

        self.cache.delete(&keys::token_key(token)).await?;
        self.cache.delete(&keys::token_session_key(token)).await?;
        self.cache.delete(&keys::session_key(token)).await?;

        if let Some(username) = username {
            let user_key = keys::user_key(&username);
            let tokens = self.cache.get_token_list(&user_key).await?;
            let remaining: Vec<String> =
                tokens.into_iter().filter(|t| t != token).collect();
            if remaining.is_empty() {
                self.cache.delete(&user_key).await?;
            } else {
                let ttl = self.cache.get_expire(&user_key).await?;
                self.cache.put_token_list(&user_key, &remaining, ttl).await?;
            }
            info!(username = %username, "session logged out");
        }
        Ok(())
    }

    /// Validate the session behind `access_token`, stamp its last-activity
    /// time and persist the updated principal for the remaining TTL.
    pub async fn refresh(&self, access_token: &str) -> Result<Principal> {
        let session_key = keys::session_key(access_token);
        let mut principal = self
            .cache
            .get_principal(&session_key)
            .await?
            .ok_or(Error::InvalidToken)?;

        let now = Utc::now();
        let meta = principal.token.as_mut().ok_or(Error::InvalidToken)?;
        if meta.expires_at <= now {
            return Err(Error::InvalidToken);
        }
        let remaining = (meta.expires_at - now)
            .to_std()
            .unwrap_or(Duration::ZERO);
        meta.last_activity = now;

        self.cache
            .put_principal(&session_key, &principal, remaining)
            .await?;
        debug!(username = %principal.username, "session refreshed");
        Ok(principal)
    }

    /// Extend a token's TTL off the calling path.
    ///
    /// When more than `renew_threshold` remains the extension is the
    /// threshold itself; otherwise the full remainder is added (never a
    /// negative extension). Runs on a spawned task - failure or delay never
    /// reaches the caller; it is logged and dropped.
    pub fn schedule_renewal(
        &self,
        current_ttl: Duration,
        token_key: &str,
        renew_threshold: Duration,
    ) {
        let extend_by = if current_ttl > renew_threshold {
            renew_threshold
        } else {
            current_ttl
        };
        let cache = Arc::clone(&self.cache);
        let key = token_key.to_string();
        tokio::spawn(async move {
            match cache.renew(&key, extend_by).await {
                Ok(renewed) => {
                    debug!(key = %key, extend_secs = extend_by.as_secs(), renewed, "background renewal")
                }
                Err(err) => warn!(key = %key, error = %err, "background renewal failed"),
            }
        });
    }

    /// Every currently tracked token for `username` (multi-device view).
    pub async fn active_tokens(&self, username: &str) -> Result<Vec<String>> {
        self.cache.get_token_list(&keys::user_key(username)).await
    }

    /// Targeted revocation of one of `username`'s tokens.
    pub async fn revoke(&self, username: &str, token: &str) -> Result<()> {
        let owner = self.cache.get_token(&keys::token_key(token)).await?;
        if owner.as_deref() != Some(username) {
            return Err(Error::InvalidToken);
        }
        self.logout(token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{LocalSessionCache, MockSessionCache};
    use mockall::predicate::{always, eq};

    fn local_manager() -> SessionManager {
        SessionManager::new(Arc::new(LocalSessionCache::new(
            64,
            Duration::from_secs(1800),
        )))
    }

    fn make_principal(record: &TokenRecord) -> Principal {
        Principal::builder()
            .user_id("u-1")
            .username(record.username.as_str())
            .build()
            .unwrap()
            .with_token(record)
    }

    #[tokio::test]
    async fn test_login_issue_caches_token_and_list() {
        let manager = local_manager();
        let record = manager
            .login_issue("bob", Duration::from_secs(3600))
            .await
            .unwrap();

        let cached = manager
            .cache()
            .get_token(&keys::token_key(&record.token))
            .await
            .unwrap();
        assert_eq!(cached.as_deref(), Some("bob"));
        assert_eq!(
            manager.active_tokens("bob").await.unwrap(),
            vec![record.token.clone()]
        );
    }

    #[tokio::test]
    async fn test_login_issue_tracks_multiple_devices() {
        let manager = local_manager();
        let first = manager
            .login_issue("bob", Duration::from_secs(60))
            .await
            .unwrap();
        let second = manager
            .login_issue("bob", Duration::from_secs(60))
            .await
            .unwrap();

        let tokens = manager.active_tokens("bob").await.unwrap();
        assert_eq!(tokens, vec![first.token, second.token]);
    }

    #[tokio::test]
    async fn test_logout_removes_token_and_list_entry() {
        let manager = local_manager();
        let keep = manager
            .login_issue("bob", Duration::from_secs(60))
            .await
            .unwrap();
        let drop = manager
            .login_issue("bob", Duration::from_secs(60))
            .await
            .unwrap();

        manager.logout(&drop.token).await.unwrap();

        assert_eq!(
            manager
                .cache()
                .get_token(&keys::token_key(&drop.token))
                .await
                .unwrap(),
            None
        );
        assert_eq!(
            manager
                .cache()
                .get_token(&keys::token_session_key(&drop.token))
                .await
                .unwrap(),
            None
        );
        assert_eq!(manager.active_tokens("bob").await.unwrap(), vec![keep.token]);
    }

    #[tokio::test]
    async fn test_logout_of_last_token_drops_the_list() {
        let manager = local_manager();
        let record = manager
            .login_issue("bob", Duration::from_secs(60))
            .await
            .unwrap();
        manager.logout(&record.token).await.unwrap();
        assert!(manager.active_tokens("bob").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_stamps_last_activity() {
        let manager = local_manager();
        let record = manager
            .login_issue("bob", Duration::from_secs(3600))
            .await
            .unwrap();
        let principal = make_principal(&record);
        manager
            .persist_principal(&principal, Duration::from_secs(3600))
            .await
            .unwrap();

        let refreshed = manager.refresh(&record.token).await.unwrap();
        let meta = refreshed.token.unwrap();
        assert!(meta.last_activity >= record.issued_at);
    }

    #[tokio::test]
    async fn test_refresh_unknown_token_is_invalid() {
        let manager = local_manager();
        let err = manager.refresh("no-such-token").await.unwrap_err();
        assert!(matches!(err, Error::InvalidToken));
    }

    #[tokio::test]
    async fn test_refresh_expired_session_is_invalid() {
        let manager = local_manager();
        let mut record = TokenRecord::issue("bob", 60);
        record.expires_at = record.issued_at - chrono::Duration::seconds(1);
        let principal = make_principal(&record);
        manager
            .persist_principal(&principal, Duration::from_secs(60))
            .await
            .unwrap();

        let err = manager.refresh(&record.token).await.unwrap_err();
        assert!(matches!(err, Error::InvalidToken));
    }

    #[tokio::test]
    async fn test_schedule_renewal_extends_by_threshold() {
        let mut cache = MockSessionCache::new();
        cache
            .expect_renew()
            .with(eq("k"), eq(Duration::from_secs(30)))
            .times(1)
            .returning(|_, _| Ok(true));
        let manager = SessionManager::new(Arc::new(cache));

        manager.schedule_renewal(Duration::from_secs(100), "k", Duration::from_secs(30));
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    #[tokio::test]
    async fn test_schedule_renewal_extends_by_full_remainder() {
        let mut cache = MockSessionCache::new();
        cache
            .expect_renew()
            .with(eq("k"), eq(Duration::from_secs(10)))
            .times(1)
            .returning(|_, _| Ok(true));
        let manager = SessionManager::new(Arc::new(cache));

        manager.schedule_renewal(Duration::from_secs(10), "k", Duration::from_secs(30));
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    #[tokio::test]
    async fn test_schedule_renewal_swallows_failure() {
        let mut cache = MockSessionCache::new();
        cache
            .expect_renew()
            .with(always(), always())
            .returning(|_, _| Err(Error::Store("connection reset".into())));
        let manager = SessionManager::new(Arc::new(cache));

        // Must not panic or surface the store error anywhere.
        manager.schedule_renewal(Duration::from_secs(100), "k", Duration::from_secs(30));
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    #[tokio::test]
    async fn test_revoke_rejects_foreign_token() {
        let manager = local_manager();
        let record = manager
            .login_issue("bob", Duration::from_secs(60))
            .await
            .unwrap();
        let err = manager.revoke("mallory", &record.token).await.unwrap_err();
        assert!(matches!(err, Error::InvalidToken));
        // Bob's token is untouched.
        assert_eq!(manager.active_tokens("bob").await.unwrap().len(), 1);
    }
}
