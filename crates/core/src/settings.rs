// Copyright 2025 Palisade Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration settings for the Palisade crates.
//!
//! Settings are loaded once at process startup from an optional
//! `palisade.toml` file layered with `PALISADE_`-prefixed environment
//! variables (`PALISADE_CACHE__BACKEND=local` style). Backend selection is a
//! plain enum consumed by the session-cache factory; no runtime container is
//! involved.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Which session-cache backend to construct at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// Shared Redis store; required for multi-instance deployments.
    Redis,
    /// In-process cache; single-instance deployments and test harnesses only.
    Local,
}

/// Session-cache settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    /// Backend selector.
    #[serde(default = "default_backend")]
    pub backend: CacheBackend,
    /// Redis connection URL (redis backend).
    #[serde(default = "default_redis_url")]
    pub redis_url: String,
    /// Capacity bound of the local backend.
    #[serde(default = "default_local_capacity")]
    pub local_capacity: usize,
    /// Nominal TTL the local backend reports from `get_expire`.
    #[serde(default = "default_nominal_ttl")]
    pub local_nominal_ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            redis_url: default_redis_url(),
            local_capacity: default_local_capacity(),
            local_nominal_ttl_secs: default_nominal_ttl(),
        }
    }
}

/// Authentication and session-lifecycle settings.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    /// TTL of freshly issued access tokens, in seconds.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u64,
    /// TTL of refresh tokens, in seconds.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_secs: u64,
    /// Background-renewal extension threshold, in seconds.
    #[serde(default = "default_renew_threshold")]
    pub renew_threshold_secs: u64,
    /// Expose which credential check failed in transport-facing messages.
    #[serde(default)]
    pub expose_credential_errors: bool,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            token_ttl_secs: default_token_ttl(),
            refresh_ttl_secs: default_refresh_ttl(),
            renew_threshold_secs: default_renew_threshold(),
            expose_credential_errors: false,
        }
    }
}

/// Root settings document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    /// Session-cache settings.
    #[serde(default)]
    pub cache: CacheSettings,
    /// Authentication settings.
    #[serde(default)]
    pub auth: AuthSettings,
}

impl Settings {
    /// Load settings from `palisade.toml` (optional) and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("palisade").required(false))
            .add_source(Environment::with_prefix("PALISADE").separator("__"))
            .build()?
            .try_deserialize()
    }
}

fn default_backend() -> CacheBackend {
    CacheBackend::Redis
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

fn default_local_capacity() -> usize {
    10_000
}

fn default_nominal_ttl() -> u64 {
    1800
}

fn default_token_ttl() -> u64 {
    3600
}

fn default_refresh_ttl() -> u64 {
    86_400
}

fn default_renew_threshold() -> u64 {
    300
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.cache.backend, CacheBackend::Redis);
        assert_eq!(settings.auth.token_ttl_secs, 3600);
        assert_eq!(settings.auth.renew_threshold_secs, 300);
        assert!(!settings.auth.expose_credential_errors);
    }

    #[test]
    fn test_backend_deserializes_lowercase() {
        let settings: Settings =
            serde_json::from_str(r#"{"cache": {"backend": "local"}}"#).unwrap();
        assert_eq!(settings.cache.backend, CacheBackend::Local);
        // Unspecified fields fall back to defaults.
        assert_eq!(settings.cache.local_capacity, 10_000);
    }
}
