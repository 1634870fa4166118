// Copyright 2025 Palisade Contributors
// SPDX-License-Identifier: Apache-2.0

//! Hierarchical cache key namespace.
//!
//! Every key persisted by Palisade follows the pattern
//! `<AUTH_HEADER>:login:<bucket>:<suffix>`, where the bucket names the kind
//! of entry (`token`, `user`, `token-session`, `refresh_token`, `session`)
//! and the suffix is the token string or username. The functions here are
//! pure string builders: same input, same output, no I/O, no failure.

/// Name of the header carrying the bearer token; doubles as the key prefix
/// so entries written by different deployments sharing a store stay apart.
pub const AUTH_HEADER: &str = "Authorization";

/// Cache type segment for all login/session entries.
const CACHE_LOGIN: &str = "login";

fn qualified(bucket: &str, suffix: &str) -> String {
    format!("{AUTH_HEADER}:{CACHE_LOGIN}:{bucket}:{suffix}")
}

/// Key of the token -> username association.
pub fn token_key(token: &str) -> String {
    qualified("token", token)
}

/// Key of the per-user token list (multi-device tracking).
pub fn user_key(username: &str) -> String {
    qualified("user", username)
}

/// Key of the token -> session association.
pub fn token_session_key(token: &str) -> String {
    qualified("token-session", token)
}

/// Key of the refresh-token -> username association.
pub fn refresh_token_key(token: &str) -> String {
    qualified("refresh_token", token)
}

/// Key of the serialized [`crate::Principal`] for a session.
pub fn session_key(token: &str) -> String {
    qualified("session", token)
}
