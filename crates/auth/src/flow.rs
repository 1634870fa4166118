// Copyright 2025 Palisade Contributors
// SPDX-License-Identifier: Apache-2.0

//! Login and bearer-token flows.
//!
//! [`LoginFlow`] is the glue between grant dispatch and the session
//! manager: a successful grant issues the access and refresh tokens,
//! persists the principal under its session key, and
//! [`LoginFlow::resolve_bearer`] later turns an `Authorization` header
//! value back into the cached principal - scheduling the fire-and-forget
//! TTL renewal as a side effect, off the request path.

use std::time::Duration;

use tracing::info;

use palisade_core::settings::AuthSettings;
use palisade_core::{keys, Error, Principal, Result, TokenRecord};
use palisade_session::SessionManager;

use crate::grant::{GrantRegistry, LoginRequest};

/// Scheme prefix of the bearer authorization header value.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Outcome of a successful login.
#[derive(Debug, Clone)]
pub struct LoginSession {
    /// The principal, with access-token metadata attached.
    pub principal: Principal,
    /// The issued access token.
    pub access: TokenRecord,
    /// The issued refresh token.
    pub refresh: TokenRecord,
}

/// Grant dispatch wired to the session lifecycle.
pub struct LoginFlow {
    registry: GrantRegistry,
    manager: SessionManager,
    settings: AuthSettings,
}

impl LoginFlow {
    /// Wire a registry to a session manager.
    pub fn new(registry: GrantRegistry, manager: SessionManager, settings: AuthSettings) -> Self {
        Self {
            registry,
            manager,
            settings,
        }
    }

    /// Dispatch the login to its grant strategy; on success issue tokens
    /// and persist the session.
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginSession> {
        let strategy = self.registry.resolve(request.effective_grant_type())?;
        let token = strategy.authenticate(request).await?;

        let ttl = Duration::from_secs(self.settings.token_ttl_secs);
        let access = self.manager.login_issue(&token.principal.username, ttl).await?;
        let refresh = self
            .manager
            .issue_refresh_token(
                &token.principal.username,
                Duration::from_secs(self.settings.refresh_ttl_secs),
            )
            .await?;

        let principal = token.principal.with_token(&access);
        self.manager.persist_principal(&principal, ttl).await?;

        info!(
            username = %principal.username,
            grant_type = %token.grant_type,
            "login succeeded"
        );
        Ok(LoginSession {
            principal,
            access,
            refresh,
        })
    }

    /// Resolve an `Authorization` header value into the cached principal.
    ///
    /// Validates the `Bearer ` scheme, looks the token up in the session
    /// cache and schedules background renewal of its TTL. The renewal never
    /// delays this call.
    pub async fn resolve_bearer(&self, authorization: &str) -> Result<Principal> {
        if authorization.trim().is_empty() {
            return Err(Error::MissingToken);
        }
        let token = authorization
            .strip_prefix(BEARER_PREFIX)
            .ok_or_else(|| Error::MalformedToken(authorization.to_string()))?
            .trim();
        if token.is_empty() {
            return Err(Error::MissingToken);
        }

        let token_key = keys::token_key(token);
        let cache = self.manager.cache();
        cache
            .get_token(&token_key)
            .await?
            .ok_or(Error::InvalidToken)?;
        let principal = cache
            .get_principal(&keys::session_key(token))
            .await?
            .ok_or(Error::InvalidToken)?;

        let current_ttl = cache.get_expire(&token_key).await?;
        self.manager.schedule_renewal(
            current_ttl,
            &token_key,
            Duration::from_secs(self.settings.renew_threshold_secs),
        );
        Ok(principal)
    }

    /// Whether credential-failure details may reach transport messages.
    pub fn expose_credential_errors(&self) -> bool {
        self.settings.expose_credential_errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use palisade_session::cache::LocalSessionCache;

    use crate::directory::MockUserDirectory;
    use crate::strategy::PasswordGrant;
    use crate::verifier::Argon2Verifier;

    fn make_flow() -> LoginFlow {
        let hash = Argon2Verifier::hash("secret").unwrap();
        let mut directory = MockUserDirectory::new();
        directory.expect_find_by_username().returning(move |name| {
            if name == "bob" {
                Ok(Some(
                    Principal::builder()
                        .user_id("u-42")
                        .username("bob")
                        .password_hash(hash.clone())
                        .build()
                        .unwrap(),
                ))
            } else {
                Ok(None)
            }
        });

        let mut registry = GrantRegistry::new();
        registry.register(Arc::new(PasswordGrant::new(Arc::new(directory))));

        let cache = Arc::new(LocalSessionCache::new(64, Duration::from_secs(1800)));
        LoginFlow::new(
            registry,
            SessionManager::new(cache),
            AuthSettings::default(),
        )
    }

    #[tokio::test]
    async fn test_login_issues_cached_token() {
        let flow = make_flow();
        let session = flow
            .login(&LoginRequest::password("bob", "secret"))
            .await
            .unwrap();

        assert_eq!(session.principal.username, "bob");
        assert_ne!(session.access.token, session.refresh.token);

        let cached = flow
            .manager
            .cache()
            .get_token(&keys::token_key(&session.access.token))
            .await
            .unwrap();
        assert_eq!(cached.as_deref(), Some("bob"));
        // Issued with the default 3600s TTL.
        assert_eq!(
            (session.access.expires_at - session.access.issued_at).num_seconds(),
            3600
        );
    }

    #[tokio::test]
    async fn test_login_unknown_grant_type_fails() {
        let flow = make_flow();
        let request = LoginRequest {
            username: "bob".into(),
            secret: "secret".into(),
            grant_type: Some("oauth_xyz".into()),
        };
        let err = flow.login(&request).await.unwrap_err();
        assert!(matches!(err, Error::InvalidGrantType(_)));
    }

    #[tokio::test]
    async fn test_resolve_bearer_round_trip() {
        let flow = make_flow();
        let session = flow
            .login(&LoginRequest::password("bob", "secret"))
            .await
            .unwrap();

        let principal = flow
            .resolve_bearer(&format!("Bearer {}", session.access.token))
            .await
            .unwrap();
        assert_eq!(principal.user_id, "u-42");
    }

    #[tokio::test]
    async fn test_resolve_bearer_missing_value() {
        let flow = make_flow();
        let err = flow.resolve_bearer("").await.unwrap_err();
        assert!(matches!(err, Error::MissingToken));
    }

    #[tokio::test]
    async fn test_resolve_bearer_wrong_scheme() {
        let flow = make_flow();
        let err = flow.resolve_bearer("Basic dXNlcg==").await.unwrap_err();
        assert!(matches!(err, Error::MalformedToken(_)));
    }

    #[tokio::test]
    async fn test_resolve_bearer_unknown_token() {
        let flow = make_flow();
        let err = flow.resolve_bearer("Bearer nope").await.unwrap_err();
        assert!(matches!(err, Error::InvalidToken));
    }

    #[tokio::test]
    async fn test_logout_invalidates_bearer() {
        let flow = make_flow();
        let session = flow
            .login(&LoginRequest::password("bob", "secret"))
            .await
            .unwrap();

        flow.manager.logout(&session.access.token).await.unwrap();
        let err = flow
            .resolve_bearer(&format!("Bearer {}", session.access.token))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidToken));
    }
}
