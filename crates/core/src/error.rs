// Copyright 2025 Palisade Contributors
// SPDX-License-Identifier: Apache-2.0

//! Shared error taxonomy for the Palisade crates.
//!
//! Errors fall into four classes, each mapping to a transport-level status:
//!
//! - token errors (unauthorized, 401): missing/malformed/expired bearer tokens
//! - authorization errors (forbidden, 403): grant dispatch and credential failures
//! - rate-limit errors (429): quota exhausted or conflicting rate configuration
//! - store errors (503): failures of the shared backing store
//!
//! Credential failures carry the precise cause internally ("username not
//! found" vs "password mismatch") but [`Error::public_message`] collapses
//! them to a neutral message unless the caller opts into exposing details.

use thiserror::Error;

/// Result type used across the Palisade crates.
pub type Result<T> = std::result::Result<T, Error>;

/// Transport-level status class an [`Error`] maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// 401 - missing, malformed or expired token.
    Unauthorized,
    /// 403 - authenticated but not permitted, or credentials rejected.
    Forbidden,
    /// 429 - quota exhausted.
    TooManyRequests,
    /// 503 - the shared store misbehaved.
    Unavailable,
}

impl StatusClass {
    /// Numeric HTTP-equivalent code.
    pub fn code(self) -> u16 {
        match self {
            StatusClass::Unauthorized => 401,
            StatusClass::Forbidden => 403,
            StatusClass::TooManyRequests => 429,
            StatusClass::Unavailable => 503,
        }
    }
}

/// Errors produced by the Palisade middleware crates.
#[derive(Debug, Error)]
pub enum Error {
    /// Bearer token absent or empty.
    #[error("bearer token is missing")]
    MissingToken,

    /// Bearer value present but not in the expected shape.
    #[error("malformed bearer token: {0}")]
    MalformedToken(String),

    /// Token unknown to the session cache, or its session expired.
    #[error("invalid or expired token")]
    InvalidToken,

    /// No strategy registered for the requested grant type.
    #[error("invalid grant type: {0}")]
    InvalidGrantType(String),

    /// Login referenced a username the directory does not know.
    #[error("username not found: {0}")]
    UsernameNotFound(String),

    /// Supplied secret did not match the stored credential.
    #[error("password mismatch for user: {0}")]
    CredentialMismatch(String),

    /// Account disabled, locked or expired.
    #[error("account unavailable: {0}")]
    AccountUnavailable(String),

    /// Quota exhausted for the composed rate key.
    #[error("{message}")]
    RateLimited {
        /// Human-readable wait-time hint, e.g. "please wait for 1 second(s) and try again".
        message: String,
    },

    /// A rate was already configured for the key with a different window unit.
    #[error("unsupported time unit for rate key {0}")]
    RateConfigConflict(String),

    /// The shared store failed; not retried here.
    #[error("store error: {0}")]
    Store(String),

    /// A cached value could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// The status class this error belongs to.
    pub fn status_class(&self) -> StatusClass {
        match self {
            Error::MissingToken | Error::MalformedToken(_) | Error::InvalidToken => {
                StatusClass::Unauthorized
            }
            Error::InvalidGrantType(_)
            | Error::UsernameNotFound(_)
            | Error::CredentialMismatch(_)
            | Error::AccountUnavailable(_) => StatusClass::Forbidden,
            Error::RateLimited { .. } | Error::RateConfigConflict(_) => {
                StatusClass::TooManyRequests
            }
            Error::Store(_) | Error::Serialization(_) => StatusClass::Unavailable,
        }
    }

    /// The message safe to hand to the transport layer.
    ///
    /// Which credential check failed is kept out of the message unless
    /// `expose_credential_errors` is set - callers must not learn whether a
    /// username exists from the login response.
    pub fn public_message(&self, expose_credential_errors: bool) -> String {
        match self {
            Error::UsernameNotFound(_) | Error::CredentialMismatch(_)
                if !expose_credential_errors =>
            {
                "invalid username or password".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
