//! Refresh token issuance, resolution and revocation
//!
//! Refresh tokens are opaque 256-bit random values rendered as 64 lowercase
//! hex characters. Records are never deleted here; revocation only sets
//! `revoked_at`, and expiry/revocation are evaluated lazily on resolve.

use crate::{
    clock::Clock,
    error::RefreshTokenError,
    models::{NewRefreshToken, RefreshToken},
    repository::RefreshTokenRepository,
};
use chrono::Duration;
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use uuid::Uuid;

/// Random bytes per token
pub const REFRESH_TOKEN_BYTES: usize = 32;

/// Encoded token length (hex)
pub const REFRESH_TOKEN_LEN: usize = REFRESH_TOKEN_BYTES * 2;

pub struct RefreshTokenStore {
    repo: Arc<dyn RefreshTokenRepository>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl RefreshTokenStore {
    pub fn new(repo: Arc<dyn RefreshTokenRepository>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self { repo, clock, ttl }
    }

    /// Generate a fresh token value from the OS CSPRNG
    pub fn generate() -> Result<String, RefreshTokenError> {
        let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
        OsRng.try_fill_bytes(&mut bytes).map_err(|e| {
            tracing::error!("Failed to read OS randomness: {}", e);
            RefreshTokenError::Generation(e.to_string())
        })?;

        Ok(hex::encode(bytes))
    }

    /// Issue and persist a new token for `owner_id`
    pub async fn issue(&self, owner_id: Uuid) -> Result<RefreshToken, RefreshTokenError> {
        let now = self.clock.now();
        let token = Self::generate()?;

        let record = self
            .repo
            .create(NewRefreshToken {
                token,
                owner_id,
                created_at: now,
                expires_at: now + self.ttl,
            })
            .await?;

        tracing::debug!(
            %owner_id,
            token = %fingerprint(&record.token),
            expires_at = %record.expires_at,
            "Refresh token issued"
        );

        Ok(record)
    }

    /// Fetch the stored record regardless of its state
    pub async fn lookup(&self, token: &str) -> Result<RefreshToken, RefreshTokenError> {
        if !is_well_formed(token) {
            return Err(RefreshTokenError::NotFound);
        }

        self.repo
            .get_by_token(token)
            .await?
            .ok_or(RefreshTokenError::NotFound)
    }

    /// Resolve a token to its owner if it is still usable
    pub async fn resolve(&self, token: &str) -> Result<Uuid, RefreshTokenError> {
        let record = self.lookup(token).await?;
        let now = self.clock.now();

        if record.is_expired_at(now) {
            return Err(RefreshTokenError::Expired);
        }

        if record.is_revoked() {
            return Err(RefreshTokenError::Revoked);
        }

        self.repo
            .get_owner_by_token(token)
            .await?
            .ok_or(RefreshTokenError::NotFound)
    }

    /// Revoke a token. Revoking an already revoked token succeeds.
    pub async fn revoke(&self, token: &str) -> Result<(), RefreshTokenError> {
        if !is_well_formed(token) {
            return Err(RefreshTokenError::NotFound);
        }

        let affected = self.repo.revoke(token, self.clock.now()).await?;
        if affected == 0 {
            return Err(RefreshTokenError::NotFound);
        }

        tracing::debug!(token = %fingerprint(token), "Refresh token revoked");
        Ok(())
    }
}

/// 64 lowercase hex characters
pub fn is_well_formed(token: &str) -> bool {
    token.len() == REFRESH_TOKEN_LEN
        && token
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

/// Short, non-reversible token identifier for logs
pub fn fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    hex::encode(&digest[..4])
}
