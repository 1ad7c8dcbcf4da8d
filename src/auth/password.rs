//! Password hashing and verification using Argon2id
//!
//! Digests are PHC strings, so the per-call random salt and the cost
//! parameters travel inside the digest. Verification compares in constant
//! time (handled by `password-hash`).

use crate::{
    config::SecurityConfig,
    error::{AppError, PasswordError},
};
use argon2::{
    password_hash::{
        rand_core::{OsRng, RngCore},
        PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};
use std::sync::OnceLock;

const SALT_BYTES: usize = 16;

// Hashed lazily and verified against when an account does not exist
const DECOY_PASSWORD: &str = "chirpy-decoy-password";

/// Password hasher with a fixed work-cost parameter set
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    decoy: OnceLock<String>,
}

impl PasswordHasher {
    /// Create hasher with default parameters (OWASP recommended)
    pub fn new() -> Self {
        // m=64MiB, t=3 iterations, p=4 lanes
        let params = Params::new(65536, 3, 4, None).expect("static Argon2 params are valid");

        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            decoy: OnceLock::new(),
        }
    }

    /// Create hasher with explicit cost parameters
    pub fn with_params(
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    ) -> Result<Self, PasswordError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| PasswordError::InvalidParams(e.to_string()))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            decoy: OnceLock::new(),
        })
    }

    pub fn from_config(config: &SecurityConfig) -> Result<Self, PasswordError> {
        Self::with_params(
            config.password_hash_memory_kib,
            config.password_hash_iterations,
            config.password_hash_parallelism,
        )
    }

    /// Hash a password
    pub fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        let mut bytes = [0u8; SALT_BYTES];
        OsRng.try_fill_bytes(&mut bytes).map_err(|e| {
            tracing::error!("Failed to generate password salt: {}", e);
            PasswordError::Hashing(e.to_string())
        })?;
        let salt = SaltString::encode_b64(&bytes)
            .map_err(|e| PasswordError::Hashing(e.to_string()))?;

        let digest = self
            .argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!("Failed to hash password: {:?}", e);
                PasswordError::Hashing(e.to_string())
            })?
            .to_string();

        Ok(digest)
    }

    /// Verify a plaintext password against a stored digest
    pub fn verify(&self, digest: &str, plaintext: &str) -> Result<(), PasswordError> {
        let parsed = PasswordHash::new(digest).map_err(|e| {
            tracing::warn!("Failed to parse password digest: {:?}", e);
            PasswordError::InvalidDigest(e.to_string())
        })?;

        match self.argon2.verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(()),
            Err(password_hash::Error::Password) => Err(PasswordError::Mismatch),
            Err(e) => {
                tracing::error!("Password verification failed: {:?}", e);
                Err(PasswordError::Hashing(e.to_string()))
            }
        }
    }
}

impl PasswordHasher {
    /// Spend one full verification on a digest nobody owns.
    ///
    /// Called on the unknown-account path so it costs the same as a wrong
    /// password. Returns whether a verification actually ran.
    pub fn verify_decoy(&self, plaintext: &str) -> bool {
        let digest = match self.decoy.get() {
            Some(digest) => digest,
            None => match self.hash(DECOY_PASSWORD) {
                Ok(digest) => self.decoy.get_or_init(|| digest),
                Err(e) => {
                    tracing::warn!(error = %e, "Decoy digest unavailable");
                    return false;
                }
            },
        };

        let _ = self.verify(digest, plaintext);
        true
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Rules a new password must satisfy
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub require_uppercase: bool,
    pub require_digit: bool,
    pub require_special: bool,
}

impl PasswordPolicy {
    pub fn from_config(config: &SecurityConfig) -> Self {
        Self {
            min_length: config.password_min_length,
            require_uppercase: config.password_require_uppercase,
            require_digit: config.password_require_digit,
            require_special: config.password_require_special,
        }
    }

    /// Validate password against policy
    pub fn validate(&self, password: &str) -> Result<(), AppError> {
        if password.chars().count() < self.min_length {
            return Err(AppError::Validation(format!(
                "Password must be at least {} characters",
                self.min_length
            )));
        }

        if self.require_uppercase && !password.chars().any(|c| c.is_uppercase()) {
            return Err(AppError::Validation(
                "Password must contain at least one uppercase letter".to_string(),
            ));
        }

        if self.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(AppError::Validation(
                "Password must contain at least one digit".to_string(),
            ));
        }

        if self.require_special && !password.chars().any(|c| !c.is_alphanumeric()) {
            return Err(AppError::Validation(
                "Password must contain at least one special character".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            require_uppercase: false,
            require_digit: false,
            require_special: false,
        }
    }
}
