//! API key verification for trusted server-to-server callers

use crate::{config::AppConfig, error::AppError};
use secrecy::ExposeSecret;
use sha2::{Digest, Sha256};

/// Holds the SHA-256 digest of the configured key, never the key itself
#[derive(Clone)]
pub struct ApiKeyVerifier {
    expected_hash: [u8; 32],
}

impl ApiKeyVerifier {
    pub fn new(key: &str) -> Result<Self, AppError> {
        if key.trim().is_empty() {
            return Err(AppError::Config("API key must not be empty".to_string()));
        }

        Ok(Self {
            expected_hash: Self::hash(key),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        Self::new(config.security.api_key.expose_secret())
    }

    /// Hash API key using SHA-256
    pub fn hash(key: &str) -> [u8; 32] {
        Sha256::digest(key.as_bytes()).into()
    }

    /// Check a presented key in constant time
    pub fn verify(&self, presented: &str) -> bool {
        constant_time_eq(&Self::hash(presented), &self.expected_hash)
    }
}

/// Constant-time byte comparison to prevent timing attacks.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_matching_key() {
        let verifier = ApiKeyVerifier::new("f271c81ff7084ee5b99a5091b42d486e").unwrap();
        assert!(verifier.verify("f271c81ff7084ee5b99a5091b42d486e"));
    }

    #[test]
    fn test_verify_rejects_other_keys() {
        let verifier = ApiKeyVerifier::new("f271c81ff7084ee5b99a5091b42d486e").unwrap();
        assert!(!verifier.verify("f271c81ff7084ee5b99a5091b42d486f"));
        assert!(!verifier.verify(""));
        assert!(!verifier.verify("F271C81FF7084EE5B99A5091B42D486E"));
    }

    #[test]
    fn test_empty_key_rejected() {
        assert!(matches!(ApiKeyVerifier::new("  "), Err(AppError::Config(_))));
    }

    #[test]
    fn test_hash_is_deterministic() {
        assert_eq!(ApiKeyVerifier::hash("key"), ApiKeyVerifier::hash("key"));
        assert_ne!(ApiKeyVerifier::hash("key1"), ApiKeyVerifier::hash("key2"));
    }

    #[test]
    fn constant_time_eq_works() {
        assert!(constant_time_eq(b"hello", b"hello"));
        assert!(!constant_time_eq(b"hello", b"world"));
        assert!(!constant_time_eq(b"short", b"longer"));
    }
}
