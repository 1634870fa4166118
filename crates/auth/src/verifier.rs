// Copyright 2025 Palisade Contributors
// SPDX-License-Identifier: Apache-2.0

//! Credential comparison.
//!
//! A [`CredentialVerifier`] compares a stored credential against the secret
//! supplied at login. The default is the Argon2 password-hash comparator;
//! strategies that authenticate something other than a password (an SMS
//! code, a pre-shared key) plug in their own matcher.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use uuid::Uuid;

use palisade_core::{Error, Result};

/// Strategy-pluggable comparison of stored vs supplied secrets.
pub trait CredentialVerifier: Send + Sync {
    /// Whether `supplied` matches the `stored` credential.
    fn verify(&self, stored: &str, supplied: &str) -> bool;
}

/// Argon2 password-hash comparator (the default for the password grant).
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2Verifier;

impl Argon2Verifier {
    /// Hash a plaintext password for storage.
    pub fn hash(password: &str) -> Result<String> {
        // 128-bit random salt.
        let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes())
            .map_err(|err| Error::Serialization(err.to_string()))?;
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| Error::Serialization(err.to_string()))
    }
}

impl CredentialVerifier for Argon2Verifier {
    fn verify(&self, stored: &str, supplied: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(stored) else {
            return false;
        };
        Argon2::default()
            .verify_password(supplied.as_bytes(), &parsed)
            .is_ok()
    }
}

/// Byte-for-byte matcher for one-time codes and similar short secrets.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExactMatcher;

impl CredentialVerifier for ExactMatcher {
    fn verify(&self, stored: &str, supplied: &str) -> bool {
        !stored.is_empty() && stored == supplied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argon2_verify_accepts_matching_password() {
        let hash = Argon2Verifier::hash("secret").unwrap();
        assert!(Argon2Verifier.verify(&hash, "secret"));
    }

    #[test]
    fn test_argon2_verify_rejects_wrong_password() {
        let hash = Argon2Verifier::hash("secret").unwrap();
        assert!(!Argon2Verifier.verify(&hash, "wrong"));
    }

    #[test]
    fn test_argon2_verify_rejects_garbage_stored_value() {
        assert!(!Argon2Verifier.verify("not-a-phc-string", "secret"));
    }

    #[test]
    fn test_exact_matcher() {
        assert!(ExactMatcher.verify("123456", "123456"));
        assert!(!ExactMatcher.verify("123456", "654321"));
        assert!(!ExactMatcher.verify("", ""));
    }
}
